use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A payout-source wallet.
///
/// Wallets are rotated oldest `last_used_at` first; the pool touches
/// `last_used_at` on every selection attempt, including candidates that
/// turn out underfunded, so a low-balance wallet cannot pin itself to the
/// head of the scan order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutWallet {
    pub address: String,
    pub credential: String,
    pub balance: Decimal,
    pub last_used_at: DateTime<Utc>,
}

impl PayoutWallet {
    pub fn new(
        address: impl Into<String>,
        credential: impl Into<String>,
        balance: Decimal,
    ) -> Self {
        Self {
            address: address.into(),
            credential: credential.into(),
            balance,
            last_used_at: Utc::now(),
        }
    }
}

/// Receipt returned by the on-chain transfer capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub tx_hash: String,
    pub fee: Decimal,
}

/// A completed payout, including which wallet funded it.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutReceipt {
    pub tx_hash: String,
    pub fee: Decimal,
    pub wallet_address: String,
}
