use crate::domain::variant::Variant;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Success,
    Fail,
}

/// Builds the composite idempotency key for a payout: one withdrawal per
/// originating win, ever.
pub fn source_id(variant: Variant, order_id: &str) -> String {
    format!("{}_{}", variant.group().key(), order_id)
}

/// A payout driven through the wallet pool.
///
/// The record is written PENDING before the transfer is attempted, so a
/// crash mid-transfer leaves an inspectable row rather than silent loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub source_id: String,
    pub user_id: String,
    pub payout: Decimal,
    pub destination: String,
    pub status: WithdrawalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl WithdrawalRecord {
    pub fn pending(
        source_id: impl Into<String>,
        user_id: impl Into<String>,
        payout: Decimal,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            user_id: user_id.into(),
            payout,
            destination: destination.into(),
            status: WithdrawalStatus::Pending,
            tx_hash: None,
            fee: None,
            wallet_address: None,
            created_at: Utc::now(),
            finalized_at: None,
        }
    }
}

/// Terminal state applied to a PENDING withdrawal.
#[derive(Debug, Clone, PartialEq)]
pub enum WithdrawalOutcome {
    Success {
        tx_hash: String,
        fee: Decimal,
        wallet_address: String,
    },
    Fail,
}
