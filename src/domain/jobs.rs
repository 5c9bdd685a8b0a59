use crate::domain::gateway::GatewayTransaction;
use crate::domain::variant::Variant;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Queue payload for one unsettled gateway payment. Carries the raw
/// transaction and the account it arrived on; jobs are dropped from the
/// queue on completion or failure (no retention).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementJob {
    pub account_id: String,
    pub variant: Variant,
    pub tx: GatewayTransaction,
}

/// Queue payload for one payout. `source_id` is the withdrawal
/// idempotency key derived from the originating win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalJob {
    pub user_id: String,
    pub payout: Decimal,
    pub source_id: String,
}
