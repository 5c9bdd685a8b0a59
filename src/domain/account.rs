use crate::domain::variant::Variant;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

/// Egress path a collection account's gateway traffic is routed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDescriptor {
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl ProxyDescriptor {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
        }
    }
}

/// A gateway account that collects bets for one game variant.
///
/// Credentials are opaque to the core; they are only handed back to the
/// gateway client. Status and balance are owned by the account pool
/// manager and the proxy health monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionAccount {
    pub id: String,
    pub credential: String,
    pub variant: Variant,
    pub status: AccountStatus,
    pub proxy: ProxyDescriptor,
    pub balance: Decimal,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

impl CollectionAccount {
    pub fn new(
        id: impl Into<String>,
        credential: impl Into<String>,
        variant: Variant,
        proxy: ProxyDescriptor,
    ) -> Self {
        Self {
            id: id.into(),
            credential: credential.into(),
            variant,
            status: AccountStatus::Active,
            proxy,
            balance: Decimal::ZERO,
            currency: "USDT".to_string(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}
