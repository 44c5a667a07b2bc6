use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DebtPayoffError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(
        "Payment too low: the monthly payment must exceed the monthly interest \
         of {minimum_payment} for the debt to ever be retired"
    )]
    PaymentTooLow { minimum_payment: Decimal },

    #[error("Numeric domain violation in {context}")]
    NumericDomain { context: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DebtPayoffError {
    fn from(e: serde_json::Error) -> Self {
        DebtPayoffError::Serialization(e.to_string())
    }
}
