use crate::domain::account::{AccountStatus, CollectionAccount};
use crate::domain::ports::{AccountStoreRef, GatewayClientRef, LockServiceRef};
use crate::domain::variant::Variant;
use crate::error::Result;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Owns collection-account status, balance, and rotation.
///
/// The rotation cursor is process-local; cross-process exclusion for a
/// rotation comes from the per-variant lock, not from the cursor itself.
pub struct AccountPoolManager {
    store: AccountStoreRef,
    gateway: GatewayClientRef,
    locks: LockServiceRef,
    rotation_lock_ttl: Duration,
    cursors: RwLock<HashMap<Variant, usize>>,
}

impl AccountPoolManager {
    pub fn new(store: AccountStoreRef, gateway: GatewayClientRef, locks: LockServiceRef) -> Self {
        Self {
            store,
            gateway,
            locks,
            rotation_lock_ttl: Duration::from_secs(30),
            cursors: RwLock::new(HashMap::new()),
        }
    }

    pub async fn list_active(&self, variant: Option<Variant>) -> Result<Vec<CollectionAccount>> {
        self.store.list_active(variant).await
    }

    /// Uniform random pick among the active accounts of a variant, so
    /// collection-account exposure stays evenly spread.
    pub async fn pick_random_active(&self, variant: Variant) -> Result<Option<CollectionAccount>> {
        let active = self.store.list_active(Some(variant)).await?;
        Ok(active.choose(&mut rand::thread_rng()).cloned())
    }

    pub async fn set_status(&self, account_id: &str, status: AccountStatus) -> Result<()> {
        info!(account = %account_id, ?status, "account status change");
        self.store.set_status(account_id, status).await
    }

    /// Refreshes one account's cached balance from the gateway. A zero or
    /// failed read never overwrites a known-good balance.
    pub async fn sync_balance(&self, account: &CollectionAccount, symbol: &str) -> Result<()> {
        let balance = self.gateway.balance(account, symbol).await?;
        if balance > Decimal::ZERO {
            self.store.set_balance(&account.id, balance).await?;
            debug!(account = %account.id, %balance, "balance synced");
        } else {
            debug!(account = %account.id, "skipping non-positive balance read");
        }
        Ok(())
    }

    /// Syncs all active accounts concurrently. Per-account failures are
    /// logged and isolated; one account cannot abort the batch.
    pub async fn sync_all_balances(&self, symbol: &str) -> Result<()> {
        let active = self.store.list_active(None).await?;
        let mut tasks = JoinSet::new();
        for account in active {
            let store = self.store.clone();
            let gateway = self.gateway.clone();
            let symbol = symbol.to_string();
            tasks.spawn(async move {
                let result = async {
                    let balance = gateway.balance(&account, &symbol).await?;
                    if balance > Decimal::ZERO {
                        store.set_balance(&account.id, balance).await?;
                    }
                    Ok::<_, crate::error::SettleError>(())
                }
                .await;
                (account.id, result)
            });
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((account_id, Err(error))) => {
                    warn!(account = %account_id, %error, "balance sync failed");
                }
                Ok((account_id, Ok(()))) => {
                    debug!(account = %account_id, "balance sync ok");
                }
                Err(error) => warn!(%error, "balance sync task panicked"),
            }
        }
        Ok(())
    }

    /// Advances the rotation cursor for a variant and returns the account
    /// now at the head. Skips (returns `None`) when another rotation for
    /// the same variant holds the lock.
    pub async fn rotate(&self, variant: Variant) -> Result<Option<CollectionAccount>> {
        let key = format!("rotate:{variant}");
        if !self.locks.try_acquire(&key, self.rotation_lock_ttl).await {
            debug!(%variant, "rotation lock contended, skipping");
            return Ok(None);
        }

        let result = async {
            let active = self.store.list_active(Some(variant)).await?;
            if active.is_empty() {
                return Ok(None);
            }
            let mut cursors = self.cursors.write().await;
            let cursor = cursors.entry(variant).or_insert(0);
            *cursor = (*cursor + 1) % active.len();
            Ok(Some(active[*cursor].clone()))
        }
        .await;

        self.locks.release(&key).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::ProxyDescriptor;
    use crate::domain::ports::{AccountStore, LockService};
    use crate::infrastructure::in_memory::InMemoryAccountStore;
    use crate::infrastructure::lock::InMemoryLockService;
    use crate::infrastructure::sim::SimulatedGateway;
    use std::sync::Arc;

    fn account(id: &str, variant: Variant) -> CollectionAccount {
        CollectionAccount::new(id, "cred", variant, ProxyDescriptor::new("10.0.0.1", 1080))
    }

    async fn manager_with(accounts: Vec<CollectionAccount>) -> AccountPoolManager {
        let store = Arc::new(InMemoryAccountStore::new());
        for acc in accounts {
            store.upsert(acc).await.unwrap();
        }
        AccountPoolManager::new(
            store,
            Arc::new(SimulatedGateway::new(1, "USDT", vec![])),
            Arc::new(InMemoryLockService::new()),
        )
    }

    #[tokio::test]
    async fn test_pick_random_active_honors_variant() {
        let manager = manager_with(vec![
            account("acc-1", Variant::Odd),
            account("acc-2", Variant::Lucky),
        ])
        .await;

        let picked = manager.pick_random_active(Variant::Lucky).await.unwrap();
        assert_eq!(picked.unwrap().id, "acc-2");
        assert!(
            manager
                .pick_random_active(Variant::Over)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_rotate_round_robins_and_skips_on_contention() {
        let manager = manager_with(vec![
            account("acc-1", Variant::Odd),
            account("acc-2", Variant::Odd),
            account("acc-3", Variant::Odd),
        ])
        .await;

        let first = manager.rotate(Variant::Odd).await.unwrap().unwrap();
        let second = manager.rotate(Variant::Odd).await.unwrap().unwrap();
        assert_ne!(first.id, second.id);

        // A held lock makes the next rotation a no-op.
        manager
            .locks
            .try_acquire("rotate:odd", Duration::from_secs(30))
            .await;
        assert!(manager.rotate(Variant::Odd).await.unwrap().is_none());
    }
}
