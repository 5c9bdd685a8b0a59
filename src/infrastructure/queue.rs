use crate::domain::ports::JobQueue;
use crate::error::{Result, SettleError};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Channel-backed job queue.
///
/// Jobs live only in the channel: once a consumer takes one it is gone,
/// which matches the no-retention queue contract. The single receiver is
/// claimed by whichever worker loop consumes this queue.
pub struct InMemoryJobQueue<J: Send + 'static> {
    tx: mpsc::UnboundedSender<J>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<J>>>,
}

impl<J: Send + 'static> InMemoryJobQueue<J> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Hands the consuming end to a worker. Panics if called twice; a
    /// queue has exactly one consumer loop.
    pub fn take_receiver(&self) -> mpsc::UnboundedReceiver<J> {
        self.rx
            .lock()
            .expect("queue receiver slot poisoned")
            .take()
            .expect("queue receiver already taken")
    }
}

impl<J: Send + 'static> Default for InMemoryJobQueue<J> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<J: Send + 'static> JobQueue<J> for InMemoryJobQueue<J> {
    async fn enqueue(&self, job: J) -> Result<()> {
        self.tx
            .send(job)
            .map_err(|_| SettleError::Upstream("job queue closed".to_string()))
    }
}
