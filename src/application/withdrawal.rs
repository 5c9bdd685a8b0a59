use crate::application::wallet_pool::WalletPool;
use crate::domain::events::DomainEvent;
use crate::domain::jobs::WithdrawalJob;
use crate::domain::ports::{EventSinkRef, UserDirectoryRef, WithdrawalStoreRef};
use crate::domain::withdrawal::{WithdrawalOutcome, WithdrawalRecord};
use crate::error::{Result, SettleError};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Consumes withdrawal jobs and drives the wallet pool.
///
/// The PENDING record is written before the transfer is attempted: a
/// crash mid-transfer leaves an inspectable row, and the `source_id`
/// uniqueness constraint guarantees one payout per originating win.
pub struct WithdrawalWorker {
    withdrawals: WithdrawalStoreRef,
    users: UserDirectoryRef,
    pool: Arc<WalletPool>,
    events: EventSinkRef,
}

impl WithdrawalWorker {
    pub fn new(
        withdrawals: WithdrawalStoreRef,
        users: UserDirectoryRef,
        pool: Arc<WalletPool>,
        events: EventSinkRef,
    ) -> Self {
        Self {
            withdrawals,
            users,
            pool,
            events,
        }
    }

    pub async fn process(&self, job: WithdrawalJob) -> Result<()> {
        if self.withdrawals.get(&job.source_id).await?.is_some() {
            debug!(source_id = %job.source_id, "withdrawal already recorded, discarding");
            return Ok(());
        }

        let user = self.users.get(&job.user_id).await?;
        let Some(destination) = user.and_then(|u| u.payout_address) else {
            warn!(
                source_id = %job.source_id,
                user = %job.user_id,
                "no withdrawal destination on file, discarding"
            );
            return Ok(());
        };

        let record =
            WithdrawalRecord::pending(&job.source_id, &job.user_id, job.payout, &destination);
        if let Err(error) = self.withdrawals.insert_pending(record).await {
            if error.is_conflict() {
                debug!(source_id = %job.source_id, "lost insert race, already recorded");
                return Ok(());
            }
            return Err(error);
        }

        match self.pool.select_and_transfer(&destination, job.payout).await {
            Ok(receipt) => {
                self.withdrawals
                    .finalize(
                        &job.source_id,
                        WithdrawalOutcome::Success {
                            tx_hash: receipt.tx_hash.clone(),
                            fee: receipt.fee,
                            wallet_address: receipt.wallet_address,
                        },
                    )
                    .await?;
                info!(source_id = %job.source_id, tx_hash = %receipt.tx_hash, "withdrawal succeeded");
                self.events
                    .emit(DomainEvent::PayoutSucceeded {
                        user_id: job.user_id,
                        source_id: job.source_id,
                        amount: job.payout,
                        tx_hash: receipt.tx_hash,
                        at: Utc::now(),
                    })
                    .await;
            }
            Err(err) => {
                // Terminal FAIL, and deliberately no user notification:
                // never promise funds that did not move.
                self.withdrawals
                    .finalize(&job.source_id, WithdrawalOutcome::Fail)
                    .await?;
                match &err {
                    SettleError::InsufficientFunds(amount) => {
                        error!(source_id = %job.source_id, %amount, "withdrawal failed: no eligible wallet");
                    }
                    other => {
                        error!(source_id = %job.source_id, error = %other, "withdrawal transfer failed");
                    }
                }
            }
        }
        Ok(())
    }

    pub async fn run(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<WithdrawalJob>) {
        while let Some(job) = rx.recv().await {
            let source_id = job.source_id.clone();
            if let Err(error) = self.process(job).await {
                error!(%source_id, %error, "withdrawal job failed");
            }
        }
    }

    /// Processes everything currently queued, then returns.
    pub async fn drain(&self, rx: &mut mpsc::UnboundedReceiver<WithdrawalJob>) {
        while let Ok(job) = rx.try_recv() {
            let source_id = job.source_id.clone();
            if let Err(error) = self.process(job).await {
                error!(%source_id, %error, "withdrawal job failed");
            }
        }
    }
}
