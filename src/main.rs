use betsettle::application::accounts::AccountPoolManager;
use betsettle::application::ingestion::{IngestionConfig, IngestionService};
use betsettle::application::outcome::OutcomeEngine;
use betsettle::application::proxy::{ProxyHealthMonitor, ProxyMonitorConfig};
use betsettle::application::referral::ReferralAccumulator;
use betsettle::application::runtime::{Runtime, RuntimeConfig};
use betsettle::application::settlement::SettlementWorker;
use betsettle::application::wallet_pool::WalletPool;
use betsettle::application::withdrawal::WithdrawalWorker;
use betsettle::domain::account::{CollectionAccount, ProxyDescriptor};
use betsettle::domain::deposit::GameResult;
use betsettle::domain::ports::{
    AccountStore, DepositStore, DepositStoreRef, SettingsStore, WalletStore, WithdrawalStore,
    WithdrawalStoreRef,
};
use betsettle::domain::user::UserProfile;
use betsettle::domain::variant::Variant;
use betsettle::domain::wallet::PayoutWallet;
use betsettle::domain::withdrawal::WithdrawalStatus;
use betsettle::infrastructure::events::RecordingEventSink;
use betsettle::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryDepositStore, InMemoryJackpotStore, InMemoryReferralStore,
    InMemoryUserDirectory, InMemoryWalletStore, InMemoryWithdrawalStore,
};
use betsettle::infrastructure::lock::InMemoryLockService;
use betsettle::infrastructure::queue::InMemoryJobQueue;
use betsettle::infrastructure::settings::InMemorySettings;
use betsettle::infrastructure::sim::{SimulatedChain, SimulatedGateway, StaticProbe};
use chrono::Utc;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Runs the settlement pipeline against a seeded simulated gateway and
/// prints a summary of what settled and what paid out.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pipeline rounds to run (each: ingestion sweep + queue drain).
    #[arg(long, default_value_t = 3)]
    rounds: u32,

    /// Collection accounts to seed, spread across the game variants.
    #[arg(long, default_value_t = 4)]
    accounts: usize,

    /// Seed for the simulated gateway.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Path to persistent settlement storage (optional). If provided,
    /// uses RocksDB for settled payments and withdrawal records.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let (deposits, withdrawals) = open_stores(&cli)?;

    let settings = Arc::new(InMemorySettings::new());
    settings.set("settlement.currency", "USDT").await;
    settings.set("referral.rate", "0.01").await;

    let jackpots = InMemoryJackpotStore::new();
    jackpots.set_for_date(Utc::now().date_naive(), "4829177").await;
    let jackpots = Arc::new(jackpots);

    let users = Arc::new(InMemoryUserDirectory::new());
    users
        .upsert(
            UserProfile::new("u-alice")
                .with_handle("@alice")
                .with_payout_address("T-alice")
                .with_notify_channel("chat:alice"),
        )
        .await;
    users
        .upsert(
            UserProfile::new("u-bob")
                .with_handle("@bob")
                .with_payout_address("T-bob")
                .with_referrer("u-alice"),
        )
        .await;
    users
        .upsert(UserProfile::new("u-carol").with_handle("@carol"))
        .await;

    let accounts = Arc::new(InMemoryAccountStore::new());
    for i in 0..cli.accounts {
        let variant = Variant::ALL[i % Variant::ALL.len()];
        accounts
            .upsert(CollectionAccount::new(
                format!("acc-{i:02}"),
                format!("cred-{i:02}"),
                variant,
                ProxyDescriptor::new(format!("10.0.0.{}", i + 1), 1080),
            ))
            .await
            .into_diagnostic()?;
    }

    let wallets = Arc::new(InMemoryWalletStore::new());
    for (i, balance) in [dec!(50), dec!(2000), dec!(10000)].iter().enumerate() {
        wallets
            .upsert(PayoutWallet::new(
                format!("w-{i:02}"),
                format!("wkey-{i:02}"),
                *balance,
            ))
            .await
            .into_diagnostic()?;
    }

    let gateway = Arc::new(SimulatedGateway::new(
        cli.seed,
        "USDT",
        vec![
            "@alice".to_string(),
            "@bob".to_string(),
            "@carol".to_string(),
            "@stranger".to_string(),
        ],
    ));
    let chain = Arc::new(SimulatedChain::new(dec!(1)));
    let probe = Arc::new(StaticProbe::new());
    let locks = Arc::new(InMemoryLockService::new());
    let sink = Arc::new(RecordingEventSink::new());

    let settlement_queue = Arc::new(InMemoryJobQueue::new());
    let mut settlement_rx = settlement_queue.take_receiver();
    let withdrawal_queue = Arc::new(InMemoryJobQueue::new());
    let mut withdrawal_rx = withdrawal_queue.take_receiver();

    let pool_manager = Arc::new(AccountPoolManager::new(
        accounts.clone(),
        gateway.clone(),
        locks.clone(),
    ));
    let monitor = Arc::new(ProxyHealthMonitor::new(
        accounts.clone(),
        probe,
        sink.clone(),
        ProxyMonitorConfig {
            attempts: 1,
            retry_delay: std::time::Duration::from_millis(100),
            ..ProxyMonitorConfig::default()
        },
    ));
    let ingestion = Arc::new(IngestionService::new(
        accounts.clone(),
        gateway,
        deposits.clone(),
        settlement_queue,
        settings.clone(),
        locks,
        IngestionConfig::default(),
    ));
    let engine = Arc::new(OutcomeEngine::new(settings.clone(), jackpots));
    let referrals = Arc::new(ReferralAccumulator::new(
        Arc::new(InMemoryReferralStore::new()),
        users.clone(),
    ));
    let settlement = Arc::new(SettlementWorker::new(
        deposits.clone(),
        users.clone(),
        engine,
        referrals,
        sink.clone(),
        withdrawal_queue,
        settings.clone(),
    ));
    let wallet_pool = Arc::new(WalletPool::new(wallets.clone(), chain, settings));
    let withdrawal = Arc::new(WithdrawalWorker::new(
        withdrawals.clone(),
        users,
        wallet_pool,
        sink.clone(),
    ));

    let runtime = Runtime::new(
        pool_manager,
        monitor,
        ingestion,
        settlement,
        withdrawal,
        RuntimeConfig::default(),
    );

    for round in 1..=cli.rounds {
        let enqueued = runtime
            .run_round(&mut settlement_rx, &mut withdrawal_rx)
            .await
            .into_diagnostic()?;
        println!("round {round}: {enqueued} payments enqueued");
    }
    runtime
        .accounts
        .sync_all_balances("USDT")
        .await
        .into_diagnostic()?;
    runtime.monitor.run_sweep().await.into_diagnostic()?;

    print_summary(&deposits, &withdrawals, &wallets).await?;
    println!("events emitted: {}", sink.events().await.len());

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(cli: &Cli) -> Result<(DepositStoreRef, WithdrawalStoreRef)> {
    use betsettle::infrastructure::rocksdb::RocksDbStore;
    if let Some(db_path) = &cli.db_path {
        let store = RocksDbStore::open(db_path).into_diagnostic()?;
        Ok((Arc::new(store.clone()), Arc::new(store)))
    } else {
        Ok((
            Arc::new(InMemoryDepositStore::new()),
            Arc::new(InMemoryWithdrawalStore::new()),
        ))
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(_cli: &Cli) -> Result<(DepositStoreRef, WithdrawalStoreRef)> {
    Ok((
        Arc::new(InMemoryDepositStore::new()),
        Arc::new(InMemoryWithdrawalStore::new()),
    ))
}

async fn print_summary(
    deposits: &DepositStoreRef,
    withdrawals: &WithdrawalStoreRef,
    wallets: &Arc<InMemoryWalletStore>,
) -> Result<()> {
    let settled = deposits.all().await.into_diagnostic()?;
    let wins = settled.iter().filter(|p| p.result == GameResult::Win).count();
    let losses = settled
        .iter()
        .filter(|p| p.result == GameResult::Lose)
        .count();
    let voids = settled.iter().filter(|p| p.result == GameResult::Void).count();
    println!("settled payments: {} (win {wins} / lose {losses} / void {voids})", settled.len());

    let records = withdrawals.all().await.into_diagnostic()?;
    let paid = records
        .iter()
        .filter(|r| r.status == WithdrawalStatus::Success)
        .count();
    let failed = records
        .iter()
        .filter(|r| r.status == WithdrawalStatus::Fail)
        .count();
    println!("withdrawals: {} (success {paid} / fail {failed})", records.len());

    for wallet in wallets.list_by_last_used().await.into_diagnostic()? {
        println!("wallet {}: balance {}", wallet.address, wallet.balance);
    }
    Ok(())
}
