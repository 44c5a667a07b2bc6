pub mod error;
pub mod payoff;
pub mod types;

pub use error::DebtPayoffError;
pub use types::*;

/// Standard result type for all debt-payoff operations
pub type DebtPayoffResult<T> = Result<T, DebtPayoffError>;
