mod common;

use betsettle::application::ingestion::{IngestionConfig, IngestionService};
use betsettle::domain::account::{CollectionAccount, ProxyDescriptor};
use betsettle::domain::deposit::GameResult;
use betsettle::domain::gateway::GatewayTransaction;
use betsettle::domain::jobs::SettlementJob;
use betsettle::domain::ports::{
    AccountStore, DepositStore, GatewayClient, WalletStore, WithdrawalStore,
};
use betsettle::domain::user::UserProfile;
use betsettle::domain::variant::Variant;
use betsettle::domain::wallet::PayoutWallet;
use betsettle::domain::withdrawal::WithdrawalStatus;
use betsettle::error::Result;
use betsettle::infrastructure::in_memory::InMemoryAccountStore;
use betsettle::infrastructure::lock::InMemoryLockService;
use betsettle::infrastructure::queue::InMemoryJobQueue;
use async_trait::async_trait;
use common::harness;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// Gateway double that returns the same window on every fetch, the way a
/// real gateway keeps re-delivering recent history.
struct ReplayGateway {
    txs: Vec<GatewayTransaction>,
}

#[async_trait]
impl GatewayClient for ReplayGateway {
    async fn fetch_recent(
        &self,
        _account: &CollectionAccount,
        _limit: usize,
    ) -> Result<Vec<GatewayTransaction>> {
        Ok(self.txs.clone())
    }

    async fn balance(&self, _account: &CollectionAccount, _symbol: &str) -> Result<Decimal> {
        Ok(dec!(100))
    }
}

#[tokio::test]
async fn repeated_polls_settle_and_pay_each_order_once() {
    let mut h = harness().await;
    h.users
        .upsert(
            UserProfile::new("u1")
                .with_handle("@alice")
                .with_payout_address("T-alice"),
        )
        .await;
    h.wallets
        .upsert(PayoutWallet::new("w-a", "k", dec!(10000)))
        .await
        .unwrap();

    let accounts = Arc::new(InMemoryAccountStore::new());
    accounts
        .upsert(CollectionAccount::new(
            "acc-1",
            "cred",
            Variant::Lucky,
            ProxyDescriptor::new("10.0.0.1", 1080),
        ))
        .await
        .unwrap();

    // One winner (ends in 7), one loser, one stranger with no account.
    let gateway = Arc::new(ReplayGateway {
        txs: vec![
            GatewayTransaction::peer_transfer("ord-1", "tx-907", "USDT", dec!(10))
                .with_payer("@alice"),
            GatewayTransaction::peer_transfer("ord-2", "tx-903", "USDT", dec!(10))
                .with_payer("@alice"),
            GatewayTransaction::peer_transfer("ord-3", "tx-907", "USDT", dec!(10)),
        ],
    });

    let queue: Arc<InMemoryJobQueue<SettlementJob>> = Arc::new(InMemoryJobQueue::new());
    let mut settlement_rx = queue.take_receiver();
    let ingestion = IngestionService::new(
        accounts,
        gateway,
        h.deposits.clone(),
        queue,
        h.settings.clone(),
        Arc::new(InMemoryLockService::new()),
        IngestionConfig::default(),
    );

    for _ in 0..3 {
        ingestion.poll_and_enqueue().await.unwrap();
        h.settlement.drain(&mut settlement_rx).await;
        h.withdrawal.drain(&mut h.withdrawal_rx).await;
    }

    let settled = h.deposits.all().await.unwrap();
    assert_eq!(settled.len(), 3);
    let win = h.deposits.get("ord-1").await.unwrap().unwrap();
    assert_eq!(win.result, GameResult::Win);
    assert_eq!(
        h.deposits.get("ord-2").await.unwrap().unwrap().result,
        GameResult::Lose
    );
    assert_eq!(
        h.deposits.get("ord-3").await.unwrap().unwrap().result,
        GameResult::Void
    );

    // One payout for the single win, across all three polling rounds.
    let records = h.withdrawals.all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, WithdrawalStatus::Success);
    assert_eq!(records[0].source_id, "lucky_ord-1");

    // 10000 - 70 payout - 1 fee.
    assert_eq!(
        h.wallets.get("w-a").await.unwrap().unwrap().balance,
        dec!(9929)
    );
}
