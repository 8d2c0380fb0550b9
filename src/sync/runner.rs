//! Generic periodic runner for the sync reconciler.
//!
//! The runner is the scheduler adapter: it owns the cadence (initial delay,
//! period, retry backoff) and the "network connected" precondition, while
//! the reconciler stays a plain callable. One run executes at a time; the
//! loop itself is the dedup. Dropping the returned future cancels the run
//! at its next await point, which is safe because the reconciler never
//! flips a synced flag before the remote write is confirmed.

use std::time::Duration;

use super::reconciler::{LocalEntryStore, SessionProvider, SyncReconciler};
use crate::remote::http::normalize_base_url;
use crate::remote::RemoteStore;

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(60);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(15 * 60);

/// Precondition probe checked before every scheduled run.
pub trait ConnectivityProbe {
    async fn is_connected(&self) -> bool;
}

/// Probe that treats a reachable `/health` endpoint as "connected".
pub struct HttpConnectivityProbe {
    client: reqwest::Client,
    health_url: String,
}

impl HttpConnectivityProbe {
    pub fn new(server_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            health_url: format!("{}/health", normalize_base_url(server_url)),
        }
    }
}

impl ConnectivityProbe for HttpConnectivityProbe {
    async fn is_connected(&self) -> bool {
        match self.client.get(&self.health_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Invokes the reconciler on a fixed period, with a shorter retry delay
/// after a failed or skipped run.
pub struct PeriodicRunner<L, R, S, C> {
    reconciler: SyncReconciler<L, R, S>,
    probe: C,
    initial_delay: Duration,
    period: Duration,
    retry_delay: Duration,
}

impl<L, R, S, C> PeriodicRunner<L, R, S, C>
where
    L: LocalEntryStore,
    R: RemoteStore,
    S: SessionProvider,
    C: ConnectivityProbe,
{
    pub fn new(reconciler: SyncReconciler<L, R, S>, probe: C) -> Self {
        Self {
            reconciler,
            probe,
            initial_delay: DEFAULT_INITIAL_DELAY,
            period: DEFAULT_PERIOD,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Runs until the future is dropped.
    pub async fn run(&self) {
        tokio::time::sleep(self.initial_delay).await;
        loop {
            let next = self.run_once().await;
            tokio::time::sleep(next).await;
        }
    }

    /// One scheduled attempt. Returns the delay until the next one.
    async fn run_once(&self) -> Duration {
        if !self.probe.is_connected().await {
            tracing::info!("network unreachable, deferring sync");
            return self.retry_delay;
        }

        match self.reconciler.reconcile().await {
            Ok(report) => {
                if report.failed_count() > 0 {
                    tracing::info!(
                        "sync run finished with {} deferred record(s)",
                        report.failed_count()
                    );
                }
                self.period
            }
            Err(e) => {
                tracing::warn!("sync run failed, will retry sooner: {}", e);
                self.retry_delay
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordKind;
    use crate::remote::RemoteStoreError;
    use crate::sync::reconciler::{LocalStoreError, SyncRecord};
    use serde_json::Map;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingLocal {
        fetches: Arc<AtomicUsize>,
    }

    impl LocalEntryStore for CountingLocal {
        async fn list_unsynced(
            &self,
            _kind: RecordKind,
        ) -> Result<Vec<SyncRecord>, LocalStoreError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }

        async fn mark_synced(&self, _kind: RecordKind, _id: i64) -> Result<(), LocalStoreError> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct NoopRemote;

    impl RemoteStore for NoopRemote {
        async fn upsert(
            &self,
            _collection: &str,
            _document_id: &str,
            _fields: &Map<String, serde_json::Value>,
        ) -> Result<(), RemoteStoreError> {
            Ok(())
        }
    }

    struct StaticSession;

    impl SessionProvider for StaticSession {
        fn current_user_id(&self) -> Option<String> {
            Some("user-1".to_string())
        }
    }

    #[derive(Clone, Default)]
    struct StaticProbe {
        connected: Arc<AtomicBool>,
    }

    impl ConnectivityProbe for StaticProbe {
        async fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_waits_for_initial_delay_then_ticks() {
        let local = CountingLocal::default();
        let fetches = local.fetches.clone();
        let probe = StaticProbe::default();
        probe.connected.store(true, Ordering::SeqCst);

        let runner = PeriodicRunner::new(
            SyncReconciler::new(local, NoopRemote, StaticSession),
            probe,
        )
        .with_initial_delay(Duration::from_secs(60))
        .with_period(Duration::from_secs(3600));

        let handle = tokio::spawn(async move { runner.run().await });

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fetches.load(Ordering::SeqCst), 0);

        // Past the initial delay: one run (both kinds fetched).
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);

        // One full period later: a second run.
        tokio::time::sleep(Duration::from_secs(3601)).await;
        assert_eq!(fetches.load(Ordering::SeqCst), 4);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_skips_runs_while_disconnected() {
        let local = CountingLocal::default();
        let fetches = local.fetches.clone();
        let probe = StaticProbe::default();
        let connected = probe.connected.clone();

        let runner = PeriodicRunner::new(
            SyncReconciler::new(local, NoopRemote, StaticSession),
            probe,
        )
        .with_initial_delay(Duration::from_secs(1))
        .with_period(Duration::from_secs(3600))
        .with_retry_delay(Duration::from_secs(10));

        let handle = tokio::spawn(async move { runner.run().await });

        // Offline: attempts happen but the reconciler is never invoked.
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(fetches.load(Ordering::SeqCst), 0);

        // Back online: the next retry tick runs the reconciler.
        connected.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);

        handle.abort();
    }
}
