use crate::domain::ports::SettingsStore;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory settings adapter.
///
/// Reads go straight to the map on every call, so a `set` is visible to
/// the next evaluation without any cache invalidation step.
#[derive(Default, Clone)]
pub struct InMemorySettings {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with(self, key: &str, value: &str) -> Self {
        self.set(key, value).await;
        self
    }
}

#[async_trait]
impl SettingsStore for InMemorySettings {
    async fn get(&self, key: &str, default: &str) -> String {
        let values = self.values.read().await;
        values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    async fn get_float(&self, key: &str, default: f64) -> f64 {
        let values = self.values.read().await;
        values
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    async fn get_int(&self, key: &str, default: i64) -> i64 {
        let values = self.values.read().await;
        values
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    async fn get_decimal(&self, key: &str, default: Decimal) -> Decimal {
        let values = self.values.read().await;
        values
            .get(key)
            .and_then(|v| Decimal::from_str(v).ok())
            .unwrap_or(default)
    }

    async fn set(&self, key: &str, value: &str) {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value.to_string());
    }
}
