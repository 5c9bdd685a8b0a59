use crate::domain::deposit::{SettledPayment, SettlementFinal};
use crate::domain::ports::{DepositStore, WithdrawalStore};
use crate::domain::withdrawal::{WithdrawalOutcome, WithdrawalRecord, WithdrawalStatus};
use crate::error::{Result, SettleError};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column family for settled payments, keyed by `order_id`.
pub const CF_DEPOSITS: &str = "deposits";
/// Column family for withdrawal records, keyed by `source_id`.
pub const CF_WITHDRAWALS: &str = "withdrawals";

/// Persistent store for settled payments and withdrawal records.
///
/// Values are JSON-encoded. RocksDB has no native unique-insert, so every
/// insert/finalize runs its existence check and write under `write_guard`;
/// the settlement and withdrawal workers are the only writers, and they
/// share one store instance per process.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    write_guard: Arc<Mutex<()>>,
}

impl RocksDbStore {
    /// Opens or creates the database, ensuring both column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_deposits = ColumnFamilyDescriptor::new(CF_DEPOSITS, Options::default());
        let cf_withdrawals = ColumnFamilyDescriptor::new(CF_WITHDRAWALS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_deposits, cf_withdrawals])
            .map_err(|e| SettleError::Internal(Box::new(e)))?;

        Ok(Self {
            db: Arc::new(db),
            write_guard: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| SettleError::Config(format!("column family {name} not found")))
    }
}

#[async_trait]
impl DepositStore for RocksDbStore {
    async fn insert(&self, payment: SettledPayment) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        let cf = self.cf(CF_DEPOSITS)?;
        let key = payment.order_id.as_bytes();
        let existing = self
            .db
            .get_pinned_cf(&cf, key)
            .map_err(|e| SettleError::Internal(Box::new(e)))?;
        if existing.is_some() {
            return Err(SettleError::Conflict(format!(
                "settled payment {} already exists",
                payment.order_id
            )));
        }
        let value = serde_json::to_vec(&payment)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| SettleError::Internal(Box::new(e)))
    }

    async fn finalize(&self, order_id: &str, fin: SettlementFinal) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        let cf = self.cf(CF_DEPOSITS)?;
        let bytes = self
            .db
            .get_cf(&cf, order_id.as_bytes())
            .map_err(|e| SettleError::Internal(Box::new(e)))?
            .ok_or_else(|| SettleError::NotFound(format!("settled payment {order_id}")))?;
        let mut payment: SettledPayment = serde_json::from_slice(&bytes)?;
        if payment.is_finalized() {
            return Err(SettleError::Conflict(format!(
                "settled payment {order_id} already finalized"
            )));
        }
        payment.result = fin.result;
        payment.payout = fin.payout;
        payment.metadata = fin.metadata;
        payment.finalized_at = Some(Utc::now());
        let value = serde_json::to_vec(&payment)?;
        self.db
            .put_cf(&cf, order_id.as_bytes(), value)
            .map_err(|e| SettleError::Internal(Box::new(e)))
    }

    async fn get(&self, order_id: &str) -> Result<Option<SettledPayment>> {
        let cf = self.cf(CF_DEPOSITS)?;
        let bytes = self
            .db
            .get_cf(&cf, order_id.as_bytes())
            .map_err(|e| SettleError::Internal(Box::new(e)))?;
        bytes
            .map(|b| serde_json::from_slice(&b).map_err(SettleError::from))
            .transpose()
    }

    async fn exists(&self, order_id: &str) -> Result<bool> {
        let cf = self.cf(CF_DEPOSITS)?;
        let pinned = self
            .db
            .get_pinned_cf(&cf, order_id.as_bytes())
            .map_err(|e| SettleError::Internal(Box::new(e)))?;
        Ok(pinned.is_some())
    }

    async fn all(&self) -> Result<Vec<SettledPayment>> {
        let cf = self.cf(CF_DEPOSITS)?;
        let mut payments = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| SettleError::Internal(Box::new(e)))?;
            payments.push(serde_json::from_slice(&value)?);
        }
        Ok(payments)
    }
}

#[async_trait]
impl WithdrawalStore for RocksDbStore {
    async fn insert_pending(&self, record: WithdrawalRecord) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        let cf = self.cf(CF_WITHDRAWALS)?;
        let key = record.source_id.as_bytes();
        let existing = self
            .db
            .get_pinned_cf(&cf, key)
            .map_err(|e| SettleError::Internal(Box::new(e)))?;
        if existing.is_some() {
            return Err(SettleError::Conflict(format!(
                "withdrawal {} already exists",
                record.source_id
            )));
        }
        let value = serde_json::to_vec(&record)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| SettleError::Internal(Box::new(e)))
    }

    async fn finalize(&self, source_id: &str, outcome: WithdrawalOutcome) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        let cf = self.cf(CF_WITHDRAWALS)?;
        let bytes = self
            .db
            .get_cf(&cf, source_id.as_bytes())
            .map_err(|e| SettleError::Internal(Box::new(e)))?
            .ok_or_else(|| SettleError::NotFound(format!("withdrawal {source_id}")))?;
        let mut record: WithdrawalRecord = serde_json::from_slice(&bytes)?;
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
            WithdrawalOutcome::Fail => record.status = WithdrawalStatus::Fail,
        }
        record.finalized_at = Some(Utc::now());
        let value = serde_json::to_vec(&record)?;
        self.db
            .put_cf(&cf, source_id.as_bytes(), value)
            .map_err(|e| SettleError::Internal(Box::new(e)))
    }

    async fn get(&self, source_id: &str) -> Result<Option<WithdrawalRecord>> {
        let cf = self.cf(CF_WITHDRAWALS)?;
        let bytes = self
            .db
            .get_cf(&cf, source_id.as_bytes())
            .map_err(|e| SettleError::Internal(Box::new(e)))?;
        bytes
            .map(|b| serde_json::from_slice(&b).map_err(SettleError::from))
            .transpose()
    }

    async fn all(&self) -> Result<Vec<WithdrawalRecord>> {
        let cf = self.cf(CF_WITHDRAWALS)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| SettleError::Internal(Box::new(e)))?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}
