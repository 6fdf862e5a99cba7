pub mod instructions; // gate instruction enum and text parser
pub mod runtime; // register and gate engine

pub use instructions::Instruction;
pub use runtime::{Register, RegisterError};
