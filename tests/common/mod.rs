use betsettle::application::outcome::OutcomeEngine;
use betsettle::application::referral::ReferralAccumulator;
use betsettle::application::settlement::SettlementWorker;
use betsettle::application::wallet_pool::WalletPool;
use betsettle::application::withdrawal::WithdrawalWorker;
use betsettle::domain::gateway::GatewayTransaction;
use betsettle::domain::jobs::{SettlementJob, WithdrawalJob};
use betsettle::domain::variant::Variant;
use betsettle::infrastructure::events::RecordingEventSink;
use betsettle::infrastructure::in_memory::{
    InMemoryDepositStore, InMemoryJackpotStore, InMemoryReferralStore, InMemoryUserDirectory,
    InMemoryWalletStore, InMemoryWithdrawalStore,
};
use betsettle::infrastructure::queue::InMemoryJobQueue;
use betsettle::infrastructure::settings::InMemorySettings;
use betsettle::infrastructure::sim::SimulatedChain;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Fully wired settlement + withdrawal pipeline over in-memory adapters.
pub struct Harness {
    pub deposits: Arc<InMemoryDepositStore>,
    pub withdrawals: Arc<InMemoryWithdrawalStore>,
    pub wallets: Arc<InMemoryWalletStore>,
    pub referrals: Arc<InMemoryReferralStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub settings: Arc<InMemorySettings>,
    pub jackpots: Arc<InMemoryJackpotStore>,
    pub sink: Arc<RecordingEventSink>,
    pub chain: Arc<SimulatedChain>,
    pub settlement: Arc<SettlementWorker>,
    pub withdrawal: Arc<WithdrawalWorker>,
    pub withdrawal_rx: mpsc::UnboundedReceiver<WithdrawalJob>,
}

pub async fn harness() -> Harness {
    let deposits = Arc::new(InMemoryDepositStore::new());
    let withdrawals = Arc::new(InMemoryWithdrawalStore::new());
    let wallets = Arc::new(InMemoryWalletStore::new());
    let referrals = Arc::new(InMemoryReferralStore::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let settings = Arc::new(InMemorySettings::new());
    let jackpots = Arc::new(InMemoryJackpotStore::new());
    let sink = Arc::new(RecordingEventSink::new());
    let chain = Arc::new(SimulatedChain::new(dec!(1)));

    let withdrawal_queue = Arc::new(InMemoryJobQueue::new());
    let withdrawal_rx = withdrawal_queue.take_receiver();

    let engine = Arc::new(OutcomeEngine::new(settings.clone(), jackpots.clone()));
    let accumulator = Arc::new(ReferralAccumulator::new(referrals.clone(), users.clone()));
    let settlement = Arc::new(SettlementWorker::new(
        deposits.clone(),
        users.clone(),
        engine,
        accumulator,
        sink.clone(),
        withdrawal_queue,
        settings.clone(),
    ));

    let pool = Arc::new(WalletPool::new(
        wallets.clone(),
        chain.clone(),
        settings.clone(),
    ));
    let withdrawal = Arc::new(WithdrawalWorker::new(
        withdrawals.clone(),
        users.clone(),
        pool,
        sink.clone(),
    ));

    Harness {
        deposits,
        withdrawals,
        wallets,
        referrals,
        users,
        settings,
        jackpots,
        sink,
        chain,
        settlement,
        withdrawal,
        withdrawal_rx,
    }
}

/// A settlement job for a peer transfer with the given payer handle.
pub fn job(
    order_id: &str,
    tx_id: &str,
    amount: Decimal,
    variant: Variant,
    payer: Option<&str>,
) -> SettlementJob {
    let mut tx = GatewayTransaction::peer_transfer(order_id, tx_id, "USDT", amount);
    if let Some(handle) = payer {
        tx = tx.with_payer(handle);
    }
    SettlementJob {
        account_id: "acc-1".to_string(),
        variant,
        tx,
    }
}
