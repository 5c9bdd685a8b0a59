use crate::domain::deposit::GameResult;
use crate::domain::variant::Variant;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fire-and-forget domain events consumed by notification and chat
/// components outside this core. Emission must never block or fail the
/// operation that produced the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    ReferralContribution {
        child_user_id: String,
        parent_user_id: String,
        amount: Decimal,
        variant: Variant,
        result: GameResult,
        at: DateTime<Utc>,
    },
    SettlementRecorded {
        order_id: String,
        user_id: Option<String>,
        variant: Variant,
        result: GameResult,
        payout: Decimal,
        at: DateTime<Utc>,
    },
    PayoutSucceeded {
        user_id: String,
        source_id: String,
        amount: Decimal,
        tx_hash: String,
        at: DateTime<Utc>,
    },
}

/// One demoted account inside a proxy sweep report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyFailure {
    pub account_id: String,
    pub error: String,
}

/// Operator-facing report emitted once per sweep when any accounts were
/// demoted, batching all demotions into a single alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyFailureReport {
    pub demoted: Vec<ProxyFailure>,
    pub at: DateTime<Utc>,
}
