use crate::domain::account::CollectionAccount;
use crate::domain::gateway::TransactionKind;
use crate::domain::jobs::SettlementJob;
use crate::domain::ports::{
    AccountStoreRef, DepositStoreRef, GatewayClientRef, JobQueueRef, LockServiceRef,
    SettingsStoreRef,
};
use crate::error::{Result, SettleError};
use chrono::Timelike;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// How many recent transactions to pull per account per tick.
    pub fetch_limit: usize,
    /// Upper bound on one gateway call; one unresponsive account must not
    /// stall a sweep.
    pub gateway_timeout: Duration,
    /// Per-account tick lock TTL; must exceed the expected tick duration.
    pub lock_ttl: Duration,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            fetch_limit: 20,
            gateway_timeout: Duration::from_secs(10),
            lock_ttl: Duration::from_secs(30),
        }
    }
}

/// Polls the gateway per collection account and feeds unseen orders into
/// the settlement queue.
///
/// The existence pre-check here is advisory: it keeps already-settled
/// orders out of the queue but the settlement worker and the store's
/// uniqueness constraint remain the actual idempotency guarantee.
pub struct IngestionService {
    accounts: AccountStoreRef,
    gateway: GatewayClientRef,
    deposits: DepositStoreRef,
    queue: JobQueueRef<SettlementJob>,
    settings: SettingsStoreRef,
    locks: LockServiceRef,
    config: IngestionConfig,
}

impl IngestionService {
    pub fn new(
        accounts: AccountStoreRef,
        gateway: GatewayClientRef,
        deposits: DepositStoreRef,
        queue: JobQueueRef<SettlementJob>,
        settings: SettingsStoreRef,
        locks: LockServiceRef,
        config: IngestionConfig,
    ) -> Self {
        Self {
            accounts,
            gateway,
            deposits,
            queue,
            settings,
            locks,
            config,
        }
    }

    /// Bulk sweep across all active accounts, concurrently, with
    /// per-account failures isolated and logged.
    pub async fn poll_and_enqueue(&self) -> Result<usize> {
        let active = self.accounts.list_active(None).await?;
        let mut tasks = JoinSet::new();
        for account in active {
            let this = self.clone_refs();
            tasks.spawn(async move {
                let id = account.id.clone();
                (id, this.ingest_account(&account).await)
            });
        }

        let mut enqueued = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(count))) => enqueued += count,
                Ok((account_id, Err(error))) => {
                    warn!(account = %account_id, %error, "ingestion failed for account");
                }
                Err(error) => warn!(%error, "ingestion task panicked"),
            }
        }
        Ok(enqueued)
    }

    /// One fine-grained tick for a single account, guarded by the
    /// per-account distributed lock. An overlapping tick skips rather
    /// than queueing behind the holder.
    pub async fn tick_account(&self, account: &CollectionAccount) -> Result<usize> {
        let key = format!("ingest:{}", account.id);
        if !self.locks.try_acquire(&key, self.config.lock_ttl).await {
            debug!(account = %account.id, "tick lock contended, skipping");
            return Ok(0);
        }
        let result = self.ingest_account(account).await;
        self.locks.release(&key).await;
        result
    }

    async fn ingest_account(&self, account: &CollectionAccount) -> Result<usize> {
        let fetched = tokio::time::timeout(
            self.config.gateway_timeout,
            self.gateway.fetch_recent(account, self.config.fetch_limit),
        )
        .await
        .map_err(|_| {
            SettleError::Upstream(format!(
                "gateway fetch for {} timed out after {:?}",
                account.id, self.config.gateway_timeout
            ))
        })??;

        let currency = self.settings.get("settlement.currency", "USDT").await;
        let mut enqueued = 0;
        for tx in fetched {
            if tx.kind != TransactionKind::PeerTransfer
                || tx.currency != currency
                || tx.amount < Decimal::ZERO
            {
                continue;
            }
            if self.deposits.exists(&tx.order_id).await? {
                continue;
            }
            debug!(order_id = %tx.order_id, account = %account.id, "enqueueing settlement job");
            self.queue
                .enqueue(SettlementJob {
                    account_id: account.id.clone(),
                    variant: account.variant,
                    tx,
                })
                .await?;
            enqueued += 1;
        }
        Ok(enqueued)
    }

    fn clone_refs(&self) -> Self {
        Self {
            accounts: self.accounts.clone(),
            gateway: self.gateway.clone(),
            deposits: self.deposits.clone(),
            queue: self.queue.clone(),
            settings: self.settings.clone(),
            locks: self.locks.clone(),
            config: self.config.clone(),
        }
    }

    /// Single scheduler loop replacing one dynamic schedule per account:
    /// each second it recomputes the active set and ticks the accounts
    /// whose offset inside the 60s window is due, spreading N accounts
    /// evenly to avoid burst load on the gateway.
    pub async fn run_scheduler(self: Arc<Self>) {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let active = match self.accounts.list_active(None).await {
                Ok(active) => active,
                Err(error) => {
                    warn!(%error, "scheduler could not list active accounts");
                    continue;
                }
            };
            if active.is_empty() {
                continue;
            }
            let second = chrono::Utc::now().second() as usize;
            let n = active.len();
            for (index, account) in active.into_iter().enumerate() {
                if index * 60 / n == second {
                    let this = self.clone();
                    tokio::spawn(async move {
                        if let Err(error) = this.tick_account(&account).await {
                            warn!(account = %account.id, %error, "scheduled tick failed");
                        }
                    });
                }
            }
        }
    }
}
