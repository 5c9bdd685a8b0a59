use crate::domain::account::{AccountStatus, CollectionAccount};
use crate::domain::deposit::{SettledPayment, SettlementFinal};
use crate::domain::ports::{
    AccountStore, DepositStore, JackpotStore, ReferralStore, UserDirectory, WalletStore,
    WithdrawalStore,
};
use crate::domain::referral::ReferralLedgerEntry;
use crate::domain::user::UserProfile;
use crate::domain::variant::Variant;
use crate::domain::wallet::PayoutWallet;
use crate::domain::withdrawal::{WithdrawalOutcome, WithdrawalRecord, WithdrawalStatus};
use crate::error::{Result, SettleError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory store for collection accounts.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, CollectionAccount>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn upsert(&self, account: CollectionAccount) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.id.clone(), account);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<CollectionAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(id).cloned())
    }

    async fn list_active(&self, variant: Option<Variant>) -> Result<Vec<CollectionAccount>> {
        let accounts = self.accounts.read().await;
        let mut active: Vec<_> = accounts
            .values()
            .filter(|a| a.is_active() && variant.is_none_or(|v| a.variant == v))
            .cloned()
            .collect();
        // Stable order so schedule offsets stay consistent between ticks.
        active.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(active)
    }

    async fn set_status(&self, id: &str, status: AccountStatus) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| SettleError::NotFound(format!("account {id}")))?;
        account.status = status;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn set_balance(&self, id: &str, balance: Decimal) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| SettleError::NotFound(format!("account {id}")))?;
        account.balance = balance;
        account.updated_at = Utc::now();
        Ok(())
    }
}

/// In-memory settled-payment store.
///
/// The `order_id` uniqueness constraint lives here: insert checks and
/// writes under one write guard, so the second of two racing writers gets
/// `Conflict` no matter what their pre-checks said.
#[derive(Default, Clone)]
pub struct InMemoryDepositStore {
    payments: Arc<RwLock<HashMap<String, SettledPayment>>>,
}

impl InMemoryDepositStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DepositStore for InMemoryDepositStore {
    async fn insert(&self, payment: SettledPayment) -> Result<()> {
        let mut payments = self.payments.write().await;
        if payments.contains_key(&payment.order_id) {
            return Err(SettleError::Conflict(format!(
                "settled payment {} already exists",
                payment.order_id
            )));
        }
        payments.insert(payment.order_id.clone(), payment);
        Ok(())
    }

    async fn finalize(&self, order_id: &str, fin: SettlementFinal) -> Result<()> {
        let mut payments = self.payments.write().await;
        let payment = payments
            .get_mut(order_id)
            .ok_or_else(|| SettleError::NotFound(format!("settled payment {order_id}")))?;
        if payment.is_finalized() {
            return Err(SettleError::Conflict(format!(
                "settled payment {order_id} already finalized"
            )));
        }
        payment.result = fin.result;
        payment.payout = fin.payout;
        payment.metadata = fin.metadata;
        payment.finalized_at = Some(Utc::now());
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<SettledPayment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(order_id).cloned())
    }

    async fn exists(&self, order_id: &str) -> Result<bool> {
        let payments = self.payments.read().await;
        Ok(payments.contains_key(order_id))
    }

    async fn all(&self) -> Result<Vec<SettledPayment>> {
        let payments = self.payments.read().await;
        Ok(payments.values().cloned().collect())
    }
}

/// In-memory withdrawal store with the same uniqueness discipline keyed
/// by `source_id`.
#[derive(Default, Clone)]
pub struct InMemoryWithdrawalStore {
    records: Arc<RwLock<HashMap<String, WithdrawalRecord>>>,
}

impl InMemoryWithdrawalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WithdrawalStore for InMemoryWithdrawalStore {
    async fn insert_pending(&self, record: WithdrawalRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.source_id) {
            return Err(SettleError::Conflict(format!(
                "withdrawal {} already exists",
                record.source_id
            )));
        }
        records.insert(record.source_id.clone(), record);
        Ok(())
    }

    async fn finalize(&self, source_id: &str, outcome: WithdrawalOutcome) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(source_id)
            .ok_or_else(|| SettleError::NotFound(format!("withdrawal {source_id}")))?;
        if record.status != WithdrawalStatus::Pending {
            return Err(SettleError::Conflict(format!(
                "withdrawal {source_id} already finalized"
            )));
        }
        match outcome {
            WithdrawalOutcome::Success {
                tx_hash,
                fee,
                wallet_address,
            } => {
                record.status = WithdrawalStatus::Success;
                record.tx_hash = Some(tx_hash);
                record.fee = Some(fee);
                record.wallet_address = Some(wallet_address);
            }
            WithdrawalOutcome::Fail => {
                record.status = WithdrawalStatus::Fail;
            }
        }
        record.finalized_at = Some(Utc::now());
        Ok(())
    }

    async fn get(&self, source_id: &str) -> Result<Option<WithdrawalRecord>> {
        let records = self.records.read().await;
        Ok(records.get(source_id).cloned())
    }

    async fn all(&self) -> Result<Vec<WithdrawalRecord>> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }
}

/// In-memory payout wallet store.
#[derive(Default, Clone)]
pub struct InMemoryWalletStore {
    wallets: Arc<RwLock<HashMap<String, PayoutWallet>>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn upsert(&self, wallet: PayoutWallet) -> Result<()> {
        let mut wallets = self.wallets.write().await;
        wallets.insert(wallet.address.clone(), wallet);
        Ok(())
    }

    async fn get(&self, address: &str) -> Result<Option<PayoutWallet>> {
        let wallets = self.wallets.read().await;
        Ok(wallets.get(address).cloned())
    }

    async fn list_by_last_used(&self) -> Result<Vec<PayoutWallet>> {
        let wallets = self.wallets.read().await;
        let mut list: Vec<_> = wallets.values().cloned().collect();
        list.sort_by_key(|w| w.last_used_at);
        Ok(list)
    }

    async fn touch(&self, address: &str, at: DateTime<Utc>) -> Result<()> {
        let mut wallets = self.wallets.write().await;
        let wallet = wallets
            .get_mut(address)
            .ok_or_else(|| SettleError::NotFound(format!("wallet {address}")))?;
        wallet.last_used_at = at;
        Ok(())
    }

    async fn set_balance(&self, address: &str, balance: Decimal) -> Result<()> {
        let mut wallets = self.wallets.write().await;
        let wallet = wallets
            .get_mut(address)
            .ok_or_else(|| SettleError::NotFound(format!("wallet {address}")))?;
        wallet.balance = balance;
        Ok(())
    }
}

/// In-memory referral ledger. Increments run under the write guard, so
/// they behave as atomic read-modify-write per row.
#[derive(Default, Clone)]
pub struct InMemoryReferralStore {
    entries: Arc<RwLock<HashMap<(String, i64), ReferralLedgerEntry>>>,
}

impl InMemoryReferralStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReferralStore for InMemoryReferralStore {
    async fn add_contribution(
        &self,
        user_id: &str,
        period_id: i64,
        amount: Decimal,
    ) -> Result<()> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry((user_id.to_string(), period_id))
            .or_insert_with(|| ReferralLedgerEntry::new(user_id, period_id));
        entry.contribute_to_parent += amount;
        Ok(())
    }

    async fn add_earning(&self, user_id: &str, period_id: i64, amount: Decimal) -> Result<()> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry((user_id.to_string(), period_id))
            .or_insert_with(|| ReferralLedgerEntry::new(user_id, period_id));
        entry.earn_from_child += amount;
        Ok(())
    }

    async fn get(&self, user_id: &str, period_id: i64) -> Result<Option<ReferralLedgerEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&(user_id.to_string(), period_id)).cloned())
    }
}

/// In-memory user directory.
#[derive(Default, Clone)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, user: UserProfile) {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_payer(&self, handle: &str) -> Result<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.payer_handles.iter().any(|h| h == handle))
            .cloned())
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }
}

/// In-memory daily jackpot table.
#[derive(Default, Clone)]
pub struct InMemoryJackpotStore {
    numbers: Arc<RwLock<HashMap<NaiveDate, String>>>,
}

impl InMemoryJackpotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_for_date(&self, date: NaiveDate, number: impl Into<String>) {
        let mut numbers = self.numbers.write().await;
        numbers.insert(date, number.into());
    }
}

#[async_trait]
impl JackpotStore for InMemoryJackpotStore {
    async fn for_date(&self, date: NaiveDate) -> Result<Option<String>> {
        let numbers = self.numbers.read().await;
        Ok(numbers.get(&date).cloned())
    }
}
