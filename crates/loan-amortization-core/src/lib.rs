pub mod amortization;
pub mod display;
pub mod emi;
pub mod error;
pub mod types;

#[cfg(feature = "export")]
pub mod export;

pub use error::AmortizationError;
pub use types::*;

/// Standard result type for all amortization operations
pub type AmortizationResult<T> = Result<T, AmortizationError>;
