use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegisterError {
    // the only error a gate can return; buffers are untouched when it is raised
    #[error("Invalid Input: target qubit {target} outside 1..={qubit_count}")]
    InvalidInput { target: i64, qubit_count: usize },

    #[error("register must hold at least one qubit")]
    EmptyRegister,

    #[error("cannot allocate {requested} qubits, at most {max} are addressable")]
    TooManyQubits { requested: usize, max: usize },

    #[error("cannot allocate {bytes} bytes for a {qubit_count}-qubit register")]
    AllocationFailed { qubit_count: usize, bytes: usize },

    #[error("register is not normalized. norm squared: {0}")]
    NotNormalized(f64),

    #[error("register contains NaN or infinite amplitudes")]
    NonFinite,
}

impl RegisterError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RegisterError::InvalidInput { .. })
    }
}
