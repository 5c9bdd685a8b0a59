use crate::application::accounts::AccountPoolManager;
use crate::application::ingestion::IngestionService;
use crate::application::proxy::ProxyHealthMonitor;
use crate::application::settlement::SettlementWorker;
use crate::application::withdrawal::WithdrawalWorker;
use crate::domain::jobs::{SettlementJob, WithdrawalJob};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub balance_sync_interval: Duration,
    pub proxy_sweep_interval: Duration,
    /// Symbol queried on balance sync.
    pub balance_symbol: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            balance_sync_interval: Duration::from_secs(300),
            proxy_sweep_interval: Duration::from_secs(600),
            balance_symbol: "USDT".to_string(),
        }
    }
}

/// Wires the services together and owns the periodic loops.
pub struct Runtime {
    pub accounts: Arc<AccountPoolManager>,
    pub monitor: Arc<ProxyHealthMonitor>,
    pub ingestion: Arc<IngestionService>,
    pub settlement: Arc<SettlementWorker>,
    pub withdrawal: Arc<WithdrawalWorker>,
    config: RuntimeConfig,
}

impl Runtime {
    pub fn new(
        accounts: Arc<AccountPoolManager>,
        monitor: Arc<ProxyHealthMonitor>,
        ingestion: Arc<IngestionService>,
        settlement: Arc<SettlementWorker>,
        withdrawal: Arc<WithdrawalWorker>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            accounts,
            monitor,
            ingestion,
            settlement,
            withdrawal,
            config,
        }
    }

    /// Spawns the long-running loops: the fine-grained ingestion
    /// scheduler, the balance-sync and proxy-sweep intervals, and the
    /// two queue consumers.
    pub fn spawn(
        &self,
        settlement_rx: mpsc::UnboundedReceiver<SettlementJob>,
        withdrawal_rx: mpsc::UnboundedReceiver<WithdrawalJob>,
    ) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();

        handles.push(tokio::spawn(self.ingestion.clone().run_scheduler()));
        handles.push(tokio::spawn(self.settlement.clone().run(settlement_rx)));
        handles.push(tokio::spawn(self.withdrawal.clone().run(withdrawal_rx)));

        let accounts = self.accounts.clone();
        let symbol = self.config.balance_symbol.clone();
        let sync_every = self.config.balance_sync_interval;
        handles.push(tokio::spawn(async move {
            let mut interval = tokio::time::interval(sync_every);
            loop {
                interval.tick().await;
                if let Err(error) = accounts.sync_all_balances(&symbol).await {
                    warn!(%error, "balance sync sweep failed");
                }
            }
        }));

        let monitor = self.monitor.clone();
        let sweep_every = self.config.proxy_sweep_interval;
        handles.push(tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_every);
            loop {
                interval.tick().await;
                if let Err(error) = monitor.run_sweep().await {
                    warn!(%error, "proxy sweep failed");
                }
            }
        }));

        handles
    }

    /// One bounded pipeline round for the simulation binary: a bulk
    /// ingestion sweep followed by draining both queues.
    pub async fn run_round(
        &self,
        settlement_rx: &mut mpsc::UnboundedReceiver<SettlementJob>,
        withdrawal_rx: &mut mpsc::UnboundedReceiver<WithdrawalJob>,
    ) -> Result<usize> {
        let enqueued = self.ingestion.poll_and_enqueue().await?;
        self.settlement.drain(settlement_rx).await;
        self.withdrawal.drain(withdrawal_rx).await;
        Ok(enqueued)
    }
}
