use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Calendar-week bucket for referral ledgers: `iso_year * 54 + iso_week`.
pub fn period_id(at: DateTime<Utc>) -> i64 {
    let week = at.iso_week();
    week.year() as i64 * 54 + week.week() as i64
}

/// Per-user, per-week referral ledger row.
///
/// Mutated additively on every qualifying settlement; never recomputed
/// from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralLedgerEntry {
    pub user_id: String,
    pub period_id: i64,
    pub earn_from_child: Decimal,
    pub contribute_to_parent: Decimal,
    pub withdrawn: bool,
}

impl ReferralLedgerEntry {
    pub fn new(user_id: impl Into<String>, period_id: i64) -> Self {
        Self {
            user_id: user_id.into(),
            period_id,
            earn_from_child: Decimal::ZERO,
            contribute_to_parent: Decimal::ZERO,
            withdrawn: false,
        }
    }
}
