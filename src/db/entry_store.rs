use sqlx::SqlitePool;

use super::{ExerciseRepository, WellnessRepository};
use crate::models::RecordKind;
use crate::sync::{LocalEntryStore, LocalStoreError, SyncRecord};

/// SQLite-backed local store for the sync reconciler, dispatching to the
/// per-kind repositories.
pub struct SqliteEntryStore {
    wellness: WellnessRepository,
    exercise: ExerciseRepository,
}

impl SqliteEntryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            wellness: WellnessRepository::new(pool.clone()),
            exercise: ExerciseRepository::new(pool),
        }
    }
}

impl LocalEntryStore for SqliteEntryStore {
    async fn list_unsynced(&self, kind: RecordKind) -> Result<Vec<SyncRecord>, LocalStoreError> {
        let records = match kind {
            RecordKind::Wellness => self
                .wellness
                .list_unsynced()
                .await?
                .into_iter()
                .map(|e| SyncRecord {
                    id: e.id,
                    fields: e.document_fields(),
                })
                .collect(),
            RecordKind::Exercise => self
                .exercise
                .list_unsynced()
                .await?
                .into_iter()
                .map(|e| SyncRecord {
                    id: e.id,
                    fields: e.document_fields(),
                })
                .collect(),
        };
        Ok(records)
    }

    async fn mark_synced(&self, kind: RecordKind, id: i64) -> Result<(), LocalStoreError> {
        match kind {
            RecordKind::Wellness => self.wellness.mark_synced(id).await?,
            RecordKind::Exercise => self.exercise.mark_synced(id).await?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::models::{ExerciseEntry, Mood, WellnessEntry};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn setup() -> (SqliteEntryStore, WellnessRepository, ExerciseRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(temp_dir.path().join("test.db")).await.unwrap();
        (
            SqliteEntryStore::new(pool.clone()),
            WellnessRepository::new(pool.clone()),
            ExerciseRepository::new(pool),
            temp_dir,
        )
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_dispatches_by_kind() {
        let (store, wellness, exercise, _dir) = setup().await;

        let w = wellness
            .create(&WellnessEntry::new(date("2025-03-01"), Mood::Happy, 7.0, 2))
            .await
            .unwrap();
        let e = exercise
            .create(&ExerciseEntry::new(date("2025-03-01"), "running", 30))
            .await
            .unwrap();

        let wellness_records = store.list_unsynced(RecordKind::Wellness).await.unwrap();
        assert_eq!(wellness_records.len(), 1);
        assert_eq!(wellness_records[0].id, w.id);
        assert_eq!(wellness_records[0].fields["mood"], "happy");

        let exercise_records = store.list_unsynced(RecordKind::Exercise).await.unwrap();
        assert_eq!(exercise_records.len(), 1);
        assert_eq!(exercise_records[0].id, e.id);
        assert_eq!(exercise_records[0].fields["activity"], "running");
    }

    #[tokio::test]
    async fn test_mark_synced_targets_the_right_table() {
        let (store, wellness, exercise, _dir) = setup().await;

        let w = wellness
            .create(&WellnessEntry::new(date("2025-03-01"), Mood::Sad, 6.0, 4))
            .await
            .unwrap();
        let e = exercise
            .create(&ExerciseEntry::new(date("2025-03-01"), "yoga", 60))
            .await
            .unwrap();

        store.mark_synced(RecordKind::Wellness, w.id).await.unwrap();

        assert!(wellness.get_by_id(w.id).await.unwrap().unwrap().synced);
        assert!(!exercise.get_by_id(e.id).await.unwrap().unwrap().synced);
    }
}
