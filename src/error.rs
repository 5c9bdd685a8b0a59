use thiserror::Error;

/// Crate-wide error type.
///
/// Variants map to how a failure is handled downstream: `Conflict` is
/// success-by-idempotency for the settlement and withdrawal writers,
/// `NotFound` degrades to a VOID record or a skipped item, `Upstream` is
/// retried by the queue's own delivery semantics, and `InsufficientFunds`
/// is a terminal withdrawal failure.
#[derive(Error, Debug)]
pub enum SettleError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("insufficient funds: no eligible payout wallet for {0}")]
    InsufficientFunds(rust_decimal::Decimal),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl SettleError {
    /// True when the error means another writer already settled this key.
    pub fn is_conflict(&self) -> bool {
        matches!(self, SettleError::Conflict(_))
    }
}

pub type Result<T> = std::result::Result<T, SettleError>;
