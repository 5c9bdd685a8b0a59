use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction kind as reported by the payment gateway. Only peer
/// transfers are eligible for settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    PeerTransfer,
    Trade,
    Fee,
    Other,
}

/// A raw transaction fetched from the gateway for a collection account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayTransaction {
    /// External payment identifier; the settlement idempotency key.
    pub order_id: String,
    /// Raw transaction identifier whose trailing digits drive outcomes.
    pub tx_id: String,
    pub kind: TransactionKind,
    pub currency: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_handle: Option<String>,
}

impl GatewayTransaction {
    pub fn peer_transfer(
        order_id: impl Into<String>,
        tx_id: impl Into<String>,
        currency: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            tx_id: tx_id.into(),
            kind: TransactionKind::PeerTransfer,
            currency: currency.into(),
            amount,
            counterparty: None,
            payer_handle: None,
        }
    }

    pub fn with_payer(mut self, handle: impl Into<String>) -> Self {
        self.payer_handle = Some(handle.into());
        self
    }

    pub fn with_counterparty(mut self, id: impl Into<String>) -> Self {
        self.counterparty = Some(id.into());
        self
    }
}
