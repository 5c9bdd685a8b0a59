use crate::domain::account::{CollectionAccount, ProxyDescriptor};
use crate::domain::gateway::{GatewayTransaction, TransactionKind};
use crate::domain::ports::{ChainClient, EgressProbe, GatewayClient};
use crate::domain::wallet::{PayoutWallet, TransferReceipt};
use crate::error::{Result, SettleError};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Seeded gateway double used by the binary and the integration harness.
///
/// Each fetch appends a few fresh peer transfers to the account's history
/// and returns the most recent window, so repeated polls naturally
/// re-deliver old orders and exercise the dedup path.
pub struct SimulatedGateway {
    rng: Mutex<StdRng>,
    history: Mutex<HashMap<String, Vec<GatewayTransaction>>>,
    payer_handles: Vec<String>,
    order_seq: AtomicU64,
    currency: String,
}

impl SimulatedGateway {
    pub fn new(seed: u64, currency: impl Into<String>, payer_handles: Vec<String>) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            history: Mutex::new(HashMap::new()),
            payer_handles,
            order_seq: AtomicU64::new(1),
            currency: currency.into(),
        }
    }

    fn next_tx(&self, rng: &mut StdRng) -> GatewayTransaction {
        let seq = self.order_seq.fetch_add(1, Ordering::SeqCst);
        let order_id = format!("ORD{seq:06}");
        let tx_id: String = (0..16)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();

        let kind = if rng.gen_ratio(9, 10) {
            TransactionKind::PeerTransfer
        } else {
            TransactionKind::Trade
        };
        let currency = if rng.gen_ratio(9, 10) {
            self.currency.clone()
        } else {
            "BTC".to_string()
        };
        let amount = Decimal::from(rng.gen_range(1..=200u32));

        let mut tx = GatewayTransaction {
            order_id,
            tx_id,
            kind,
            currency,
            amount,
            counterparty: Some(format!("CP{:04}", rng.gen_range(0..10_000u32))),
            payer_handle: None,
        };
        if !self.payer_handles.is_empty() && rng.gen_ratio(4, 5) {
            let handle = &self.payer_handles[rng.gen_range(0..self.payer_handles.len())];
            tx.payer_handle = Some(handle.clone());
        }
        tx
    }
}

#[async_trait]
impl GatewayClient for SimulatedGateway {
    async fn fetch_recent(
        &self,
        account: &CollectionAccount,
        limit: usize,
    ) -> Result<Vec<GatewayTransaction>> {
        let mut rng = self.rng.lock().expect("gateway rng poisoned");
        let mut history = self.history.lock().expect("gateway history poisoned");
        let entries = history.entry(account.id.clone()).or_default();

        for _ in 0..rng.gen_range(1..=3) {
            let tx = self.next_tx(&mut rng);
            entries.push(tx);
        }

        let start = entries.len().saturating_sub(limit);
        Ok(entries[start..].to_vec())
    }

    async fn balance(&self, _account: &CollectionAccount, _symbol: &str) -> Result<Decimal> {
        let mut rng = self.rng.lock().expect("gateway rng poisoned");
        if rng.gen_ratio(1, 5) {
            // A transient zero read; callers must not persist it.
            Ok(Decimal::ZERO)
        } else {
            Ok(Decimal::from(rng.gen_range(100..10_000u32)))
        }
    }
}

/// Deterministic on-chain transfer double.
pub struct SimulatedChain {
    seq: AtomicU64,
    fee: Decimal,
    failing: AtomicBool,
}

impl SimulatedChain {
    pub fn new(fee: Decimal) -> Self {
        Self {
            seq: AtomicU64::new(1),
            fee,
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainClient for SimulatedChain {
    async fn transfer(
        &self,
        _wallet: &PayoutWallet,
        _destination: &str,
        _token: &str,
        _network: &str,
        _amount: Decimal,
    ) -> Result<TransferReceipt> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SettleError::Upstream(
                "simulated chain rejected transfer".to_string(),
            ));
        }
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        Ok(TransferReceipt {
            tx_hash: format!("0x{seq:064x}"),
            fee: self.fee,
        })
    }
}

/// Probe double with a scriptable set of unreachable proxy hosts.
#[derive(Default)]
pub struct StaticProbe {
    down: Mutex<HashSet<String>>,
}

impl StaticProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_down(&self, host: &str) {
        self.down
            .lock()
            .expect("probe state poisoned")
            .insert(host.to_string());
    }

    pub fn set_up(&self, host: &str) {
        self.down.lock().expect("probe state poisoned").remove(host);
    }
}

#[async_trait]
impl EgressProbe for StaticProbe {
    async fn probe(&self, proxy: &ProxyDescriptor) -> Result<()> {
        let down = self.down.lock().expect("probe state poisoned");
        if down.contains(&proxy.host) {
            Err(SettleError::Upstream(format!(
                "proxy {}:{} unreachable",
                proxy.host, proxy.port
            )))
        } else {
            Ok(())
        }
    }
}
