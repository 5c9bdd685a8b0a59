use crate::domain::ports::{ReferralStoreRef, UserDirectoryRef};
use crate::domain::referral::period_id;
use crate::error::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

/// Maintains the weekly referral contribution/earning ledgers.
pub struct ReferralAccumulator {
    store: ReferralStoreRef,
    users: UserDirectoryRef,
}

impl ReferralAccumulator {
    pub fn new(store: ReferralStoreRef, users: UserDirectoryRef) -> Self {
        Self { store, users }
    }

    /// Adds one contribution to the child's and parent's ledgers for the
    /// week containing `at`. An unresolvable parent drops the parent-side
    /// accounting silently; the child side is still recorded.
    pub async fn accrue(
        &self,
        child_user_id: &str,
        parent_user_id: &str,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let period = period_id(at);
        self.store
            .add_contribution(child_user_id, period, amount)
            .await?;

        if self.users.get(parent_user_id).await?.is_some() {
            self.store
                .add_earning(parent_user_id, period, amount)
                .await?;
        } else {
            debug!(parent = %parent_user_id, "referral parent unresolved, dropping earning");
        }
        Ok(())
    }
}
