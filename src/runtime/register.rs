use crate::instructions::Instruction;
use crate::runtime::error::RegisterError;
use log::{debug, trace};
use num_complex::Complex64;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

/// Largest qubit count whose amplitude buffer still fits within `isize::MAX`
/// bytes, the limit on any single allocation.
pub const MAX_QUBITS: usize =
    (isize::MAX as usize / std::mem::size_of::<Complex64>()).ilog2() as usize;

// tolerance used by `validate` for the unitarity check
pub const NORM_EPSILON: f64 = 1e-9;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const PLUS_I: Complex64 = Complex64::new(0.0, 1.0);
const MINUS_I: Complex64 = Complex64::new(0.0, -1.0);

/// A dense state vector over `2^qubit_count` computational basis states.
///
/// Bit `j` of a basis-state index holds the value of qubit `j + 1`. Gates
/// never write into the buffer they read from: results are scattered into
/// `scratch`, which then becomes the active buffer.
#[derive(Debug, Clone, Serialize)]
pub struct Register {
    qubit_count: usize,
    amplitudes: Vec<Complex64>,
    #[serde(skip)]
    scratch: Vec<Complex64>,
}

impl Register {
    /// Allocates a register in the all-zeros state `|0...0>`.
    pub fn new(qubit_count: usize) -> Result<Self, RegisterError> {
        if qubit_count == 0 {
            return Err(RegisterError::EmptyRegister);
        }
        if qubit_count > MAX_QUBITS {
            return Err(RegisterError::TooManyQubits {
                requested: qubit_count,
                max: MAX_QUBITS,
            });
        }

        let size = 1usize << qubit_count;
        let mut amplitudes = zeroed_buffer(qubit_count, size)?;
        amplitudes[0] = ONE;
        let scratch = zeroed_buffer(qubit_count, size)?;

        debug!("allocated {}-qubit register ({} basis states)", qubit_count, size);

        Ok(Register {
            qubit_count,
            amplitudes,
            scratch,
        })
    }

    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Pauli-X on the 1-based `target` qubit.
    pub fn apply_x(&mut self, target: i64) -> Result<(), RegisterError> {
        let mask = self.target_mask(target)?;
        self.scatter(mask, true, |_| ONE);
        trace!("applied X to qubit {}", target);
        Ok(())
    }

    /// Pauli-Y on the 1-based `target` qubit: `|0> -> i|1>`, `|1> -> -i|0>`.
    pub fn apply_y(&mut self, target: i64) -> Result<(), RegisterError> {
        let mask = self.target_mask(target)?;
        self.scatter(mask, true, |dest| {
            if dest & mask != 0 {
                PLUS_I
            } else {
                MINUS_I
            }
        });
        trace!("applied Y to qubit {}", target);
        Ok(())
    }

    /// Pauli-Z on the 1-based `target` qubit. No basis state moves, only
    /// states with the target bit set change sign.
    pub fn apply_z(&mut self, target: i64) -> Result<(), RegisterError> {
        let mask = self.target_mask(target)?;
        self.scatter(mask, false, |dest| if dest & mask != 0 { -ONE } else { ONE });
        trace!("applied Z to qubit {}", target);
        Ok(())
    }

    pub fn apply(&mut self, instr: &Instruction) -> Result<(), RegisterError> {
        match *instr {
            Instruction::PauliX(q) => self.apply_x(q),
            Instruction::PauliY(q) => self.apply_y(q),
            Instruction::PauliZ(q) => self.apply_z(q),
        }
    }

    /// Probability of each qubit reading 1, index 0 being qubit 1. The
    /// register is not collapsed.
    pub fn measure_marginals(&self) -> Vec<f64> {
        let n = self.qubit_count;
        self.amplitudes
            .par_iter()
            .enumerate()
            .filter(|(_, amp)| **amp != ZERO)
            .fold(
                || vec![0.0; n],
                |mut acc, (state, amp)| {
                    let p = amp.norm_sqr();
                    for (j, slot) in acc.iter_mut().enumerate() {
                        if state & (1 << j) != 0 {
                            *slot += p;
                        }
                    }
                    acc
                },
            )
            .reduce(
                || vec![0.0; n],
                |mut lhs, rhs| {
                    lhs.iter_mut().zip(rhs).for_each(|(l, r)| *l += r);
                    lhs
                },
            )
    }

    /// Squared magnitude of every basis state, in index order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.par_iter().map(|a| a.norm_sqr()).collect()
    }

    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.par_iter().map(|a| a.norm_sqr()).sum()
    }

    /// Checks the unitarity invariant. Nothing here renormalizes.
    pub fn validate(&self) -> Result<(), RegisterError> {
        let non_finite = self
            .amplitudes
            .par_iter()
            .any(|a| !a.re.is_finite() || !a.im.is_finite());
        if non_finite {
            return Err(RegisterError::NonFinite);
        }

        let norm = self.norm_sqr();
        if (norm - 1.0).abs() > NORM_EPSILON {
            return Err(RegisterError::NotNormalized(norm));
        }
        Ok(())
    }

    /// Human-readable dump of both buffers, one line each.
    pub fn render(&self) -> String {
        let line = |buf: &[Complex64]| {
            buf.iter()
                .map(|a| format!("({})", a))
                .collect::<Vec<_>>()
                .join(" ")
        };
        format!(
            "Main:    {}\nScratch: {}\n",
            line(&self.amplitudes),
            line(&self.scratch)
        )
    }

    // validates a 1-based target and returns its single-bit mask
    fn target_mask(&self, target: i64) -> Result<usize, RegisterError> {
        match usize::try_from(target) {
            Ok(t) if (1..=self.qubit_count).contains(&t) => Ok(1 << (t - 1)),
            _ => Err(RegisterError::InvalidInput {
                target,
                qubit_count: self.qubit_count,
            }),
        }
    }

    // writes `phase(dest) * amplitudes[i]` into scratch at `dest`, where
    // `dest` is `i ^ mask` when `flip` is set and `i` otherwise, then commits
    fn scatter<F>(&mut self, mask: usize, flip: bool, phase: F)
    where
        F: Fn(usize) -> Complex64,
    {
        let Register {
            amplitudes,
            scratch,
            ..
        } = self;

        for (i, amp) in amplitudes.iter().enumerate() {
            if *amp == ZERO {
                continue;
            }
            let dest = if flip { i ^ mask } else { i };
            scratch[dest] = *amp * phase(dest);
        }

        self.commit();
    }

    // scratch becomes the active buffer; the old active buffer is zeroed and
    // kept as the next scratch
    fn commit(&mut self) {
        std::mem::swap(&mut self.amplitudes, &mut self.scratch);
        self.scratch.fill(ZERO);
    }
}

// allocation failure is reported instead of aborting the process
fn zeroed_buffer(qubit_count: usize, size: usize) -> Result<Vec<Complex64>, RegisterError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| RegisterError::AllocationFailed {
            qubit_count,
            bytes: size.saturating_mul(std::mem::size_of::<Complex64>()),
        })?;
    buf.resize(size, ZERO);
    Ok(buf)
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
