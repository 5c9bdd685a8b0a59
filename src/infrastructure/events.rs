use crate::domain::events::{DomainEvent, ProxyFailureReport};
use crate::domain::ports::{AlertSink, EventSink};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Event sink that records everything it is handed.
///
/// Stands in for the notification/chat consumers outside this core; the
/// recorded log doubles as the observation point for tests.
#[derive(Default, Clone)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<DomainEvent>>>,
    alerts: Arc<Mutex<Vec<ProxyFailureReport>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().await.clone()
    }

    pub async fn alerts(&self) -> Vec<ProxyFailureReport> {
        self.alerts.lock().await.clone()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn emit(&self, event: DomainEvent) {
        info!(?event, "domain event");
        self.events.lock().await.push(event);
    }
}

#[async_trait]
impl AlertSink for RecordingEventSink {
    async fn alert(&self, report: ProxyFailureReport) {
        info!(demoted = report.demoted.len(), "proxy failure report");
        self.alerts.lock().await.push(report);
    }
}
