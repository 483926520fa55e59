pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

pub use error::SimulcreditError;
pub use types::*;

/// Standard result type for all simulcredit operations
pub type SimulcreditResult<T> = Result<T, SimulcreditError>;
