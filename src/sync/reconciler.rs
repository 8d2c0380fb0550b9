//! Push-only reconciliation between the local entry store and the remote
//! document store.
//!
//! Every unsynced local record is upserted to the remote collection for its
//! kind; the local `synced` flag flips only after the remote write is
//! confirmed. Per-record remote failures are recorded and skipped — they
//! self-heal on the next scheduled run. Local store failures abort the run
//! so the scheduler can retry it wholesale.

use chrono::Utc;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::models::RecordKind;
use crate::remote::RemoteStore;

/// A record eligible for sync: local id plus its remote document payload.
#[derive(Debug, Clone)]
pub struct SyncRecord {
    pub id: i64,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A non-record-scoped failure. Returning this signals "retry" to the
/// scheduler; per-record remote failures never surface here.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("local store error: {0}")]
    LocalStore(#[from] LocalStoreError),
}

/// Local durable store as seen by the reconciler.
pub trait LocalEntryStore {
    async fn list_unsynced(&self, kind: RecordKind) -> Result<Vec<SyncRecord>, LocalStoreError>;
    async fn mark_synced(&self, kind: RecordKind, id: i64) -> Result<(), LocalStoreError>;
}

/// Source of the current user session, if any.
pub trait SessionProvider {
    fn current_user_id(&self) -> Option<String>;
}

/// Outcome for a single record within one reconcile run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Synced,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RecordResult {
    pub id: i64,
    pub outcome: RecordOutcome,
}

#[derive(Debug, Clone)]
pub struct KindReport {
    pub kind: RecordKind,
    pub results: Vec<RecordResult>,
}

impl KindReport {
    pub fn synced_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == RecordOutcome::Synced)
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &RecordResult> {
        self.results
            .iter()
            .filter(|r| !matches!(r.outcome, RecordOutcome::Synced))
    }
}

/// Per-item results of one reconcile run. An empty report means there was
/// no active session (or nothing to push).
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub kinds: Vec<KindReport>,
}

impl SyncReport {
    pub fn synced_count(&self) -> usize {
        self.kinds.iter().map(KindReport::synced_count).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.kinds.iter().map(|k| k.failed().count()).sum()
    }
}

/// Reconciles local records against the remote store, one kind at a time.
///
/// Collaborators are injected at construction so tests can substitute
/// fakes; the reconciler holds no ambient state of its own.
pub struct SyncReconciler<L, R, S> {
    local: L,
    remote: R,
    session: S,
}

impl<L, R, S> SyncReconciler<L, R, S>
where
    L: LocalEntryStore,
    R: RemoteStore,
    S: SessionProvider,
{
    pub fn new(local: L, remote: R, session: S) -> Self {
        Self {
            local,
            remote,
            session,
        }
    }

    /// Push all unsynced records of every kind to the remote store.
    ///
    /// Returns `Ok` even when individual records fail (they are retried on
    /// the next run); returns `Err` only when the local store itself fails,
    /// which the scheduler treats as a retry request. With no active
    /// session this is a successful no-op.
    pub async fn reconcile(&self) -> Result<SyncReport, SyncError> {
        let Some(owner_id) = self.session.current_user_id() else {
            tracing::debug!("no active session, skipping sync");
            return Ok(SyncReport::default());
        };

        let mut kinds = Vec::with_capacity(RecordKind::ALL.len());
        for kind in RecordKind::ALL {
            kinds.push(self.reconcile_kind(kind, &owner_id).await?);
        }

        let report = SyncReport { kinds };
        tracing::info!(
            "sync complete: {} synced, {} deferred",
            report.synced_count(),
            report.failed_count()
        );
        Ok(report)
    }

    async fn reconcile_kind(
        &self,
        kind: RecordKind,
        owner_id: &str,
    ) -> Result<KindReport, SyncError> {
        let records = self.local.list_unsynced(kind).await?;
        tracing::debug!("found {} unsynced {} record(s)", records.len(), kind);

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let mut fields = record.fields;
            fields.insert("owner_id".into(), json!(owner_id));
            fields.insert("timestamp".into(), json!(Utc::now().timestamp_millis()));

            let document_id = record.id.to_string();
            match self
                .remote
                .upsert(kind.collection(), &document_id, &fields)
                .await
            {
                Ok(()) => {
                    // The flag flips only after the confirmed remote write,
                    // never speculatively.
                    self.local.mark_synced(kind, record.id).await?;
                    results.push(RecordResult {
                        id: record.id,
                        outcome: RecordOutcome::Synced,
                    });
                }
                Err(e) => {
                    tracing::warn!("failed to sync {} record {}: {}", kind, record.id, e);
                    results.push(RecordResult {
                        id: record.id,
                        outcome: RecordOutcome::Failed(e.to_string()),
                    });
                }
            }
        }

        Ok(KindReport { kind, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteStoreError;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct FakeRecord {
        id: i64,
        fields: Map<String, Value>,
        synced: bool,
    }

    /// In-memory local store with injectable fetch/mark failures.
    #[derive(Clone, Default)]
    struct FakeLocal {
        records: Arc<Mutex<HashMap<RecordKind, Vec<FakeRecord>>>>,
        fail_fetch: bool,
        fail_mark: bool,
        fetch_calls: Arc<Mutex<usize>>,
    }

    impl FakeLocal {
        fn insert(&self, kind: RecordKind, id: i64, synced: bool) {
            let mut fields = Map::new();
            fields.insert("note".into(), json!(format!("record-{id}")));
            self.records
                .lock()
                .unwrap()
                .entry(kind)
                .or_default()
                .push(FakeRecord { id, fields, synced });
        }

        fn is_synced(&self, kind: RecordKind, id: i64) -> bool {
            self.records.lock().unwrap()[&kind]
                .iter()
                .find(|r| r.id == id)
                .unwrap()
                .synced
        }
    }

    impl LocalEntryStore for FakeLocal {
        async fn list_unsynced(
            &self,
            kind: RecordKind,
        ) -> Result<Vec<SyncRecord>, LocalStoreError> {
            *self.fetch_calls.lock().unwrap() += 1;
            if self.fail_fetch {
                return Err(LocalStoreError::Database(sqlx::Error::PoolClosed));
            }
            Ok(self
                .records
                .lock()
                .unwrap()
                .get(&kind)
                .map(|records| {
                    records
                        .iter()
                        .filter(|r| !r.synced)
                        .map(|r| SyncRecord {
                            id: r.id,
                            fields: r.fields.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default())
        }

        async fn mark_synced(&self, kind: RecordKind, id: i64) -> Result<(), LocalStoreError> {
            if self.fail_mark {
                return Err(LocalStoreError::Database(sqlx::Error::PoolClosed));
            }
            let mut records = self.records.lock().unwrap();
            if let Some(r) = records
                .get_mut(&kind)
                .and_then(|v| v.iter_mut().find(|r| r.id == id))
            {
                r.synced = true;
            }
            Ok(())
        }
    }

    /// In-memory remote store recording upserts in call order.
    #[derive(Clone, Default)]
    struct FakeRemote {
        documents: Arc<Mutex<HashMap<(String, String), Map<String, Value>>>>,
        upsert_log: Arc<Mutex<Vec<(String, String)>>>,
        fail_documents: Arc<Mutex<HashSet<(String, String)>>>,
    }

    impl FakeRemote {
        fn fail_on(&self, collection: &str, document_id: &str) {
            self.fail_documents
                .lock()
                .unwrap()
                .insert((collection.to_string(), document_id.to_string()));
        }

        fn upsert_count(&self) -> usize {
            self.upsert_log.lock().unwrap().len()
        }

        fn document(&self, collection: &str, document_id: &str) -> Option<Map<String, Value>> {
            self.documents
                .lock()
                .unwrap()
                .get(&(collection.to_string(), document_id.to_string()))
                .cloned()
        }
    }

    impl RemoteStore for FakeRemote {
        async fn upsert(
            &self,
            collection: &str,
            document_id: &str,
            fields: &Map<String, Value>,
        ) -> Result<(), RemoteStoreError> {
            let key = (collection.to_string(), document_id.to_string());
            self.upsert_log.lock().unwrap().push(key.clone());
            if self.fail_documents.lock().unwrap().contains(&key) {
                return Err(RemoteStoreError::Rejected {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            self.documents.lock().unwrap().insert(key, fields.clone());
            Ok(())
        }
    }

    struct FakeSession(Option<String>);

    impl SessionProvider for FakeSession {
        fn current_user_id(&self) -> Option<String> {
            self.0.clone()
        }
    }

    fn session() -> FakeSession {
        FakeSession(Some("user-1".to_string()))
    }

    #[tokio::test]
    async fn test_successful_upsert_marks_record_synced() {
        let local = FakeLocal::default();
        local.insert(RecordKind::Wellness, 1, false);
        let remote = FakeRemote::default();

        let reconciler = SyncReconciler::new(local.clone(), remote.clone(), session());
        let report = reconciler.reconcile().await.unwrap();

        assert_eq!(report.synced_count(), 1);
        assert_eq!(report.failed_count(), 0);
        assert!(local.is_synced(RecordKind::Wellness, 1));
        assert!(remote.document("wellness_entries", "1").is_some());
    }

    #[tokio::test]
    async fn test_owner_id_and_timestamp_injected() {
        let local = FakeLocal::default();
        local.insert(RecordKind::Exercise, 7, false);
        let remote = FakeRemote::default();

        let reconciler = SyncReconciler::new(local, remote.clone(), session());
        reconciler.reconcile().await.unwrap();

        let doc = remote.document("exercise_entries", "7").unwrap();
        assert_eq!(doc["owner_id"], json!("user-1"));
        assert!(doc["timestamp"].is_i64());
        assert_eq!(doc["note"], json!("record-7"));
    }

    #[tokio::test]
    async fn test_partial_failure_continues_and_reports_success() {
        // Two unsynced wellness entries and one already synced; "b" fails.
        let local = FakeLocal::default();
        local.insert(RecordKind::Wellness, 1, false); // "a"
        local.insert(RecordKind::Wellness, 2, false); // "b"
        local.insert(RecordKind::Wellness, 3, true); // "c"
        let remote = FakeRemote::default();
        remote.fail_on("wellness_entries", "2");

        let reconciler = SyncReconciler::new(local.clone(), remote.clone(), session());
        let report = reconciler.reconcile().await.unwrap();

        assert!(local.is_synced(RecordKind::Wellness, 1));
        assert!(!local.is_synced(RecordKind::Wellness, 2));
        assert!(local.is_synced(RecordKind::Wellness, 3));
        assert_eq!(report.synced_count(), 1);
        assert_eq!(report.failed_count(), 1);

        let failed: Vec<i64> = report.kinds[0].failed().map(|r| r.id).collect();
        assert_eq!(failed, vec![2]);
    }

    #[tokio::test]
    async fn test_no_session_is_a_silent_noop() {
        let local = FakeLocal::default();
        local.insert(RecordKind::Wellness, 1, false);
        let remote = FakeRemote::default();

        let reconciler =
            SyncReconciler::new(local.clone(), remote.clone(), FakeSession(None));
        let report = reconciler.reconcile().await.unwrap();

        assert!(report.kinds.is_empty());
        assert_eq!(*local.fetch_calls.lock().unwrap(), 0);
        assert_eq!(remote.upsert_count(), 0);
        assert!(!local.is_synced(RecordKind::Wellness, 1));
    }

    #[tokio::test]
    async fn test_local_fetch_failure_aborts_before_remote_calls() {
        let local = FakeLocal {
            fail_fetch: true,
            ..FakeLocal::default()
        };
        let remote = FakeRemote::default();

        let reconciler = SyncReconciler::new(local, remote.clone(), session());
        let result = reconciler.reconcile().await;

        assert!(matches!(result, Err(SyncError::LocalStore(_))));
        assert_eq!(remote.upsert_count(), 0);
    }

    #[tokio::test]
    async fn test_local_mark_failure_aborts_run() {
        let local = FakeLocal {
            fail_mark: true,
            ..FakeLocal::default()
        };
        local.insert(RecordKind::Wellness, 1, false);
        let remote = FakeRemote::default();

        let reconciler = SyncReconciler::new(local, remote, session());
        assert!(reconciler.reconcile().await.is_err());
    }

    #[tokio::test]
    async fn test_nothing_to_push_performs_zero_upserts() {
        let local = FakeLocal::default();
        local.insert(RecordKind::Wellness, 1, true);
        let remote = FakeRemote::default();

        let reconciler = SyncReconciler::new(local, remote.clone(), session());
        let report = reconciler.reconcile().await.unwrap();

        assert_eq!(remote.upsert_count(), 0);
        assert_eq!(report.synced_count(), 0);
        assert_eq!(report.failed_count(), 0);
    }

    #[tokio::test]
    async fn test_equal_ids_land_in_separate_collections() {
        let local = FakeLocal::default();
        local.insert(RecordKind::Wellness, 1, false);
        local.insert(RecordKind::Exercise, 1, false);
        let remote = FakeRemote::default();

        let reconciler = SyncReconciler::new(local, remote.clone(), session());
        reconciler.reconcile().await.unwrap();

        assert!(remote.document("wellness_entries", "1").is_some());
        assert!(remote.document("exercise_entries", "1").is_some());
    }

    #[tokio::test]
    async fn test_wellness_processed_before_exercise() {
        let local = FakeLocal::default();
        local.insert(RecordKind::Exercise, 1, false);
        local.insert(RecordKind::Wellness, 2, false);
        let remote = FakeRemote::default();

        let reconciler = SyncReconciler::new(local, remote.clone(), session());
        reconciler.reconcile().await.unwrap();

        let log = remote.upsert_log.lock().unwrap().clone();
        assert_eq!(log[0].0, "wellness_entries");
        assert_eq!(log[1].0, "exercise_entries");
    }

    #[tokio::test]
    async fn test_second_run_skips_already_synced_records() {
        let local = FakeLocal::default();
        local.insert(RecordKind::Wellness, 1, false);
        local.insert(RecordKind::Wellness, 2, false);
        let remote = FakeRemote::default();
        remote.fail_on("wellness_entries", "2");

        let reconciler = SyncReconciler::new(local.clone(), remote.clone(), session());
        reconciler.reconcile().await.unwrap();
        assert_eq!(remote.upsert_count(), 2);

        // Second run retries only the failed record.
        reconciler.reconcile().await.unwrap();
        assert_eq!(remote.upsert_count(), 3);
        let log = remote.upsert_log.lock().unwrap().clone();
        assert_eq!(log[2], ("wellness_entries".to_string(), "2".to_string()));
    }
}
