use serde::{Deserialize, Serialize};

/// Read-only view of a user known to the platform.
///
/// The directory itself (registration, bindings) lives outside the core;
/// settlement only needs to match a payer handle to a user and find the
/// payout destination, referrer, and notification channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub payer_handles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_channel: Option<String>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payer_handles: Vec::new(),
            payout_address: None,
            referrer_id: None,
            notify_channel: None,
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.payer_handles.push(handle.into());
        self
    }

    pub fn with_payout_address(mut self, address: impl Into<String>) -> Self {
        self.payout_address = Some(address.into());
        self
    }

    pub fn with_referrer(mut self, referrer_id: impl Into<String>) -> Self {
        self.referrer_id = Some(referrer_id.into());
        self
    }

    pub fn with_notify_channel(mut self, channel: impl Into<String>) -> Self {
        self.notify_channel = Some(channel.into());
        self
    }
}
