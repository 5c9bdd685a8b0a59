use crate::domain::account::{AccountStatus, CollectionAccount, ProxyDescriptor};
use crate::domain::deposit::{SettledPayment, SettlementFinal};
use crate::domain::events::{DomainEvent, ProxyFailureReport};
use crate::domain::gateway::GatewayTransaction;
use crate::domain::referral::ReferralLedgerEntry;
use crate::domain::user::UserProfile;
use crate::domain::variant::Variant;
use crate::domain::wallet::{PayoutWallet, TransferReceipt};
use crate::domain::withdrawal::{WithdrawalOutcome, WithdrawalRecord};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn upsert(&self, account: CollectionAccount) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<CollectionAccount>>;
    async fn list_active(&self, variant: Option<Variant>) -> Result<Vec<CollectionAccount>>;
    async fn set_status(&self, id: &str, status: AccountStatus) -> Result<()>;
    async fn set_balance(&self, id: &str, balance: Decimal) -> Result<()>;
}

/// Store for settled payments. `insert` claims the `order_id` and MUST
/// reject a second insert with `SettleError::Conflict`; this constraint,
/// not the callers' pre-checks, is the at-most-once guarantee.
#[async_trait]
pub trait DepositStore: Send + Sync {
    async fn insert(&self, payment: SettledPayment) -> Result<()>;
    /// Applies the evaluated outcome to a pending record. Rejects with
    /// `Conflict` when the record was already finalized.
    async fn finalize(&self, order_id: &str, fin: SettlementFinal) -> Result<()>;
    async fn get(&self, order_id: &str) -> Result<Option<SettledPayment>>;
    async fn exists(&self, order_id: &str) -> Result<bool>;
    async fn all(&self) -> Result<Vec<SettledPayment>>;
}

/// Store for withdrawal records. `insert_pending` MUST reject a second
/// insert for the same `source_id` with `SettleError::Conflict`.
#[async_trait]
pub trait WithdrawalStore: Send + Sync {
    async fn insert_pending(&self, record: WithdrawalRecord) -> Result<()>;
    async fn finalize(&self, source_id: &str, outcome: WithdrawalOutcome) -> Result<()>;
    async fn get(&self, source_id: &str) -> Result<Option<WithdrawalRecord>>;
    async fn all(&self) -> Result<Vec<WithdrawalRecord>>;
}

#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn upsert(&self, wallet: PayoutWallet) -> Result<()>;
    async fn get(&self, address: &str) -> Result<Option<PayoutWallet>>;
    /// All wallets, oldest `last_used_at` first.
    async fn list_by_last_used(&self) -> Result<Vec<PayoutWallet>>;
    async fn touch(&self, address: &str, at: DateTime<Utc>) -> Result<()>;
    async fn set_balance(&self, address: &str, balance: Decimal) -> Result<()>;
}

/// Additive referral ledger. Increments are atomic per row so concurrent
/// accruals for the same user cannot lose updates.
#[async_trait]
pub trait ReferralStore: Send + Sync {
    async fn add_contribution(&self, user_id: &str, period_id: i64, amount: Decimal)
    -> Result<()>;
    async fn add_earning(&self, user_id: &str, period_id: i64, amount: Decimal) -> Result<()>;
    async fn get(&self, user_id: &str, period_id: i64) -> Result<Option<ReferralLedgerEntry>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_payer(&self, handle: &str) -> Result<Option<UserProfile>>;
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>>;
}

/// Key/value configuration with typed accessors. Values are read fresh on
/// every evaluation so operators can change odds without a deploy;
/// unparsable values fall back to the caller's default.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str, default: &str) -> String;
    async fn get_float(&self, key: &str, default: f64) -> f64;
    async fn get_int(&self, key: &str, default: i64) -> i64;
    async fn get_decimal(&self, key: &str, default: Decimal) -> Decimal;
    async fn set(&self, key: &str, value: &str);
}

/// Daily jackpot numbers, keyed by UTC calendar date.
#[async_trait]
pub trait JackpotStore: Send + Sync {
    async fn for_date(&self, date: NaiveDate) -> Result<Option<String>>;
}

/// Named mutual-exclusion token with a TTL, backed by a shared fast
/// store. Acquisition never waits: contended ticks skip.
#[async_trait]
pub trait LockService: Send + Sync {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> bool;
    async fn release(&self, key: &str);
}

/// Payment gateway client. Calls are signed per the gateway's own scheme
/// (opaque here) and routed through the account's egress path.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    async fn fetch_recent(
        &self,
        account: &CollectionAccount,
        limit: usize,
    ) -> Result<Vec<GatewayTransaction>>;
    async fn balance(&self, account: &CollectionAccount, symbol: &str) -> Result<Decimal>;
}

/// On-chain transfer capability with a blocking wait for confirmation.
/// A submitted-but-unconfirmed transfer surfaces as an error.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn transfer(
        &self,
        wallet: &PayoutWallet,
        destination: &str,
        token: &str,
        network: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt>;
}

/// Lightweight reachability probe through an egress path.
#[async_trait]
pub trait EgressProbe: Send + Sync {
    async fn probe(&self, proxy: &ProxyDescriptor) -> Result<()>;
}

/// Best-effort domain event emission.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: DomainEvent);
}

/// Operator-facing alerting sink.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn alert(&self, report: ProxyFailureReport);
}

/// At-least-once job queue. Payloads are plain structured data; jobs are
/// not retained after a terminal state.
#[async_trait]
pub trait JobQueue<J: Send + 'static>: Send + Sync {
    async fn enqueue(&self, job: J) -> Result<()>;
}

pub type AccountStoreRef = Arc<dyn AccountStore>;
pub type DepositStoreRef = Arc<dyn DepositStore>;
pub type WithdrawalStoreRef = Arc<dyn WithdrawalStore>;
pub type WalletStoreRef = Arc<dyn WalletStore>;
pub type ReferralStoreRef = Arc<dyn ReferralStore>;
pub type UserDirectoryRef = Arc<dyn UserDirectory>;
pub type SettingsStoreRef = Arc<dyn SettingsStore>;
pub type JackpotStoreRef = Arc<dyn JackpotStore>;
pub type LockServiceRef = Arc<dyn LockService>;
pub type GatewayClientRef = Arc<dyn GatewayClient>;
pub type ChainClientRef = Arc<dyn ChainClient>;
pub type EgressProbeRef = Arc<dyn EgressProbe>;
pub type EventSinkRef = Arc<dyn EventSink>;
pub type AlertSinkRef = Arc<dyn AlertSink>;
pub type JobQueueRef<J> = Arc<dyn JobQueue<J>>;
