use crate::domain::money::quantize;
use crate::domain::ports::{ChainClientRef, SettingsStoreRef, WalletStoreRef};
use crate::domain::wallet::PayoutReceipt;
use crate::error::{Result, SettleError};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Rotates payout-source wallets and performs the funds transfer.
pub struct WalletPool {
    wallets: WalletStoreRef,
    chain: ChainClientRef,
    settings: SettingsStoreRef,
}

impl WalletPool {
    pub fn new(wallets: WalletStoreRef, chain: ChainClientRef, settings: SettingsStoreRef) -> Self {
        Self {
            wallets,
            chain,
            settings,
        }
    }

    /// Scans wallets oldest-used first and pays `amount` from the first
    /// one with sufficient balance.
    ///
    /// Every scanned candidate is marked used *before* its balance is
    /// checked, so an underfunded wallet rotates to the back instead of
    /// being re-scanned at the head of every request.
    pub async fn select_and_transfer(
        &self,
        destination: &str,
        amount: Decimal,
    ) -> Result<PayoutReceipt> {
        let token = self.settings.get("withdraw.token", "USDT").await;
        let network = self.settings.get("withdraw.network", "TRC20").await;

        for wallet in self.wallets.list_by_last_used().await? {
            self.wallets.touch(&wallet.address, Utc::now()).await?;
            if wallet.balance < amount {
                debug!(wallet = %wallet.address, balance = %wallet.balance, "wallet underfunded, rotating past");
                continue;
            }

            let receipt = self
                .chain
                .transfer(&wallet, destination, &token, &network, amount)
                .await?;
            let remaining = quantize(wallet.balance - amount - receipt.fee);
            self.wallets
                .set_balance(&wallet.address, remaining)
                .await?;
            info!(
                wallet = %wallet.address,
                %amount,
                tx_hash = %receipt.tx_hash,
                "payout transferred"
            );
            return Ok(PayoutReceipt {
                tx_hash: receipt.tx_hash,
                fee: receipt.fee,
                wallet_address: wallet.address,
            });
        }

        Err(SettleError::InsufficientFunds(amount))
    }
}
