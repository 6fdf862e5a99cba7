use clap::{Parser, Subcommand};
use log::{info, warn};
use qstatevec::instructions::{parse_instruction, parse_program, Instruction};
use qstatevec::runtime::Register;
use serde::Serialize;
use serde_json::to_writer_pretty;
use std::fs;
use std::io;


const QSTATEVEC_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "qstatevec", version = QSTATEVEC_VERSION,
    about = "Dense state-vector simulator for Pauli gates on a multi-qubit register.",
    long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Builds a register, applies gates and prints per-qubit probabilities.
    Run {
        /// Number of qubits in the register.
        #[arg(long, short = 'n')]
        qubits: usize,
        /// Gate to apply, e.g. `X:1` or `Y:2`. May be repeated; applied in order.
        #[arg(long = "op", value_name = "GATE:QUBIT")]
        ops: Vec<String>,
        /// File with one gate per line, applied after any --op gates.
        #[arg(long)]
        program: Option<String>,
        /// Dump both amplitude buffers before and after the gates.
        #[arg(long)]
        show_state: bool,
        /// Print a JSON report instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Prints the qstatevec version.
    Version,
}

#[derive(Serialize)]
struct Report<'a> {
    qubits: usize,
    applied: usize,
    rejected: usize,
    marginals: Vec<f64>,
    register: &'a Register,
}

fn parse_op(op: &str) -> Result<Instruction, String> {
    parse_instruction(&op.replace(':', " "))
}

fn collect_instructions(ops: &[String], program: Option<&str>) -> Result<Vec<Instruction>, String> {
    let mut instrs = ops
        .iter()
        .map(|op| parse_op(op).map_err(|e| format!("--op '{}': {}", op, e)))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(path) = program {
        let source =
            fs::read_to_string(path).map_err(|e| format!("error reading {}: {}", path, e))?;
        instrs.extend(parse_program(&source).map_err(|e| format!("{}: {}", path, e))?);
    }
    Ok(instrs)
}

// applies every instruction; gate errors are reported and skipped
fn execute(register: &mut Register, instrs: &[Instruction]) -> (usize, usize) {
    let mut applied = 0;
    let mut rejected = 0;
    for instr in instrs {
        match register.apply(instr) {
            Ok(()) => applied += 1,
            Err(e) => {
                warn!("skipping {} {}: {}", instr.mnemonic(), instr.target(), e);
                rejected += 1;
            }
        }
    }
    (applied, rejected)
}

fn format_marginals(marginals: &[f64]) -> String {
    const PERCENT: f64 = 100.0;
    marginals
        .iter()
        .enumerate()
        .map(|(i, p)| format!("Qubit {}: {}%\n", i + 1, p * PERCENT))
        .collect()
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            qubits,
            ops,
            program,
            show_state,
            json,
        } => {
            let instrs = collect_instructions(&ops, program.as_deref())?;
            let mut register = Register::new(qubits).map_err(|e| e.to_string())?;

            if show_state && !json {
                println!("{}", register.render());
            }

            let (applied, rejected) = execute(&mut register, &instrs);
            info!("applied {} gates, rejected {}", applied, rejected);

            if let Err(e) = register.validate() {
                warn!("{}", e);
            }

            let marginals = register.measure_marginals();

            if json {
                let report = Report {
                    qubits,
                    applied,
                    rejected,
                    marginals,
                    register: &register,
                };
                to_writer_pretty(io::stdout(), &report).map_err(|e| e.to_string())?;
                println!();
            } else {
                if show_state {
                    println!("{}", register.render());
                }
                print!("{}", format_marginals(&marginals));
            }
        }
        Commands::Version => {
            println!("qstatevec version {}", QSTATEVEC_VERSION);
        }
    }

    Ok(())
}
