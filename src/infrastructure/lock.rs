use crate::domain::ports::LockService;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// TTL-based mutual-exclusion table.
///
/// A held key blocks acquisition until it is released or its TTL lapses;
/// expiry is how an abandoned lock (crashed holder) self-heals.
#[derive(Default, Clone)]
pub struct InMemoryLockService {
    held: Arc<Mutex<HashMap<String, Instant>>>,
}

impl InMemoryLockService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockService for InMemoryLockService {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> bool {
        let mut held = self.held.lock().expect("lock table poisoned");
        let now = Instant::now();
        match held.get(key) {
            Some(expiry) if *expiry > now => false,
            _ => {
                held.insert(key.to_string(), now + ttl);
                true
            }
        }
    }

    async fn release(&self, key: &str) {
        let mut held = self.held.lock().expect("lock table poisoned");
        held.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_contended_acquire_fails_until_release() {
        let locks = InMemoryLockService::new();
        assert!(locks.try_acquire("k", Duration::from_secs(30)).await);
        assert!(!locks.try_acquire("k", Duration::from_secs(30)).await);
        locks.release("k").await;
        assert!(locks.try_acquire("k", Duration::from_secs(30)).await);
    }

    #[tokio::test]
    async fn test_expired_lock_self_heals() {
        let locks = InMemoryLockService::new();
        assert!(locks.try_acquire("k", Duration::from_millis(10)).await);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(locks.try_acquire("k", Duration::from_secs(30)).await);
    }
}
