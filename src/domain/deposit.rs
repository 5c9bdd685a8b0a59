use crate::domain::variant::Variant;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Lose,
    Void,
}

/// An external payment settled into a game outcome.
///
/// `order_id` is the idempotency key for the whole pipeline: the store
/// rejects a second insert for the same order, and a record is finalized
/// at most once. A record with `finalized_at == None` is a pending claim
/// left by a worker that crashed between insert and evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledPayment {
    pub order_id: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    /// Raw transaction identifier; its trailing digits are the outcome
    /// entropy source.
    pub tx_id: String,
    pub variant: Variant,
    pub result: GameResult,
    pub payout: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub settled_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl SettledPayment {
    /// A pending claim for an order: VOID with zero payout until finalized.
    pub fn pending(
        order_id: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        tx_id: impl Into<String>,
        variant: Variant,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            amount,
            currency: currency.into(),
            counterparty: None,
            tx_id: tx_id.into(),
            variant,
            result: GameResult::Void,
            payout: Decimal::ZERO,
            user_id: None,
            payer_handle: None,
            metadata: None,
            settled_at: Utc::now(),
            finalized_at: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized_at.is_some()
    }
}

/// Final values applied to a pending settlement exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementFinal {
    pub result: GameResult,
    pub payout: Decimal,
    pub metadata: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pending_is_void_and_unfinalized() {
        let payment =
            SettledPayment::pending("ord-1", dec!(10), "USDT", "tx999", Variant::Lucky);
        assert_eq!(payment.result, GameResult::Void);
        assert_eq!(payment.payout, Decimal::ZERO);
        assert!(!payment.is_finalized());
    }
}
