use crate::domain::account::{AccountStatus, CollectionAccount};
use crate::domain::events::{ProxyFailure, ProxyFailureReport};
use crate::domain::ports::{AccountStoreRef, AlertSinkRef, EgressProbeRef};
use crate::error::{Result, SettleError};
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ProxyMonitorConfig {
    /// Probe attempts per account per sweep.
    pub attempts: u32,
    /// Delay between attempts.
    pub retry_delay: Duration,
    /// Per-probe timeout, intentionally shorter than the retry cadence.
    pub probe_timeout: Duration,
    /// Consecutive failed sweeps before an account is demoted.
    pub demote_after: u32,
}

impl Default for ProxyMonitorConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            retry_delay: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(5),
            demote_after: 3,
        }
    }
}

/// Periodically verifies each active account's egress path.
///
/// Failure counters are process-local and reset on restart; a restart
/// merely delays a demotion by up to `demote_after` sweeps.
pub struct ProxyHealthMonitor {
    accounts: AccountStoreRef,
    probe: EgressProbeRef,
    alerts: AlertSinkRef,
    config: ProxyMonitorConfig,
    failures: Mutex<HashMap<String, u32>>,
}

impl ProxyHealthMonitor {
    pub fn new(
        accounts: AccountStoreRef,
        probe: EgressProbeRef,
        alerts: AlertSinkRef,
        config: ProxyMonitorConfig,
    ) -> Self {
        Self {
            accounts,
            probe,
            alerts,
            config,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Probes one account, retrying up to the configured attempts. Only
    /// the final attempt's failure is surfaced.
    pub async fn check_one(&self, account: &CollectionAccount) -> Result<()> {
        let mut last_error = None;
        for attempt in 1..=self.config.attempts {
            let probe = tokio::time::timeout(
                self.config.probe_timeout,
                self.probe.probe(&account.proxy),
            )
            .await;
            match probe {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(error)) => last_error = Some(error),
                Err(_) => {
                    last_error = Some(SettleError::Upstream(format!(
                        "proxy probe timed out after {:?}",
                        self.config.probe_timeout
                    )));
                }
            }
            if attempt < self.config.attempts {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }
        Err(last_error
            .unwrap_or_else(|| SettleError::Upstream("proxy probe failed".to_string())))
    }

    /// Sweeps all active accounts, demoting any that reach the
    /// consecutive-failure threshold. Emits a single batched alert per
    /// sweep when anything was demoted.
    pub async fn run_sweep(&self) -> Result<ProxyFailureReport> {
        let active = self.accounts.list_active(None).await?;
        let mut demoted = Vec::new();

        for account in active {
            match self.check_one(&account).await {
                Ok(()) => {
                    self.failures.lock().await.remove(&account.id);
                }
                Err(error) => {
                    let strikes = {
                        let mut failures = self.failures.lock().await;
                        let strikes = failures.entry(account.id.clone()).or_insert(0);
                        *strikes += 1;
                        *strikes
                    };
                    warn!(account = %account.id, %error, strikes, "proxy check failed");

                    if strikes >= self.config.demote_after {
                        self.accounts
                            .set_status(&account.id, AccountStatus::Inactive)
                            .await?;
                        self.failures.lock().await.remove(&account.id);
                        info!(account = %account.id, "account demoted after repeated proxy failures");
                        demoted.push(ProxyFailure {
                            account_id: account.id.clone(),
                            error: error.to_string(),
                        });
                    }
                }
            }
        }

        let report = ProxyFailureReport {
            demoted,
            at: Utc::now(),
        };
        if !report.demoted.is_empty() {
            self.alerts.alert(report.clone()).await;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::ProxyDescriptor;
    use crate::domain::ports::AccountStore;
    use crate::domain::variant::Variant;
    use crate::infrastructure::events::RecordingEventSink;
    use crate::infrastructure::in_memory::InMemoryAccountStore;
    use crate::infrastructure::sim::StaticProbe;
    use std::sync::Arc;

    fn fast_config() -> ProxyMonitorConfig {
        ProxyMonitorConfig {
            attempts: 1,
            retry_delay: Duration::from_millis(0),
            probe_timeout: Duration::from_millis(100),
            demote_after: 3,
        }
    }

    #[tokio::test]
    async fn test_three_strikes_demotes_with_one_alert() {
        let store = Arc::new(InMemoryAccountStore::new());
        store
            .upsert(CollectionAccount::new(
                "acc-1",
                "cred",
                Variant::Odd,
                ProxyDescriptor::new("10.0.0.1", 1080),
            ))
            .await
            .unwrap();
        let probe = Arc::new(StaticProbe::new());
        probe.set_down("10.0.0.1");
        let sink = Arc::new(RecordingEventSink::new());
        let monitor =
            ProxyHealthMonitor::new(store.clone(), probe, sink.clone(), fast_config());

        for _ in 0..2 {
            let report = monitor.run_sweep().await.unwrap();
            assert!(report.demoted.is_empty());
        }
        let report = monitor.run_sweep().await.unwrap();
        assert_eq!(report.demoted.len(), 1);

        assert_eq!(store.list_active(None).await.unwrap().len(), 0);
        assert_eq!(sink.alerts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_success_resets_counter() {
        let store = Arc::new(InMemoryAccountStore::new());
        store
            .upsert(CollectionAccount::new(
                "acc-1",
                "cred",
                Variant::Odd,
                ProxyDescriptor::new("10.0.0.1", 1080),
            ))
            .await
            .unwrap();
        let probe = Arc::new(StaticProbe::new());
        let sink = Arc::new(RecordingEventSink::new());
        let monitor =
            ProxyHealthMonitor::new(store.clone(), probe.clone(), sink.clone(), fast_config());

        probe.set_down("10.0.0.1");
        monitor.run_sweep().await.unwrap();
        monitor.run_sweep().await.unwrap();

        // Recovery clears the streak; two more failures are not enough.
        probe.set_up("10.0.0.1");
        monitor.run_sweep().await.unwrap();
        probe.set_down("10.0.0.1");
        monitor.run_sweep().await.unwrap();
        monitor.run_sweep().await.unwrap();

        assert_eq!(store.list_active(None).await.unwrap().len(), 1);
        assert!(sink.alerts().await.is_empty());
    }
}
