/*
	STATE-VECTOR RUNTIME: REGISTER AND ITS ERRORS
*/

pub mod error;
pub mod register;

pub use error::RegisterError;
pub use register::Register;
