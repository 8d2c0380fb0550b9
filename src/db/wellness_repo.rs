use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::models::{Mood, WellnessEntry};

pub struct WellnessRepository {
    pool: SqlitePool,
}

// Row type for database queries
#[derive(sqlx::FromRow)]
struct WellnessRow {
    id: i64,
    user_id: String,
    date: String,
    mood: String,
    sleep_hours: f64,
    stress_level: i64,
    notes: String,
    synced: bool,
    created_at: String,
    updated_at: String,
}

impl WellnessRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, entry: &WellnessEntry) -> Result<WellnessEntry, sqlx::Error> {
        let created_at = entry.created_at.to_rfc3339();
        let updated_at = entry.updated_at.to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO wellness_entries (user_id, date, mood, sleep_hours, stress_level, notes, synced, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&entry.user_id)
        .bind(entry.date.to_string())
        .bind(entry.mood.to_string())
        .bind(entry.sleep_hours)
        .bind(entry.stress_level as i64)
        .bind(&entry.notes)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<WellnessEntry>, sqlx::Error> {
        let row: Option<WellnessRow> = sqlx::query_as("SELECT * FROM wellness_entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(hydrate_entry).transpose()
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<WellnessEntry>, sqlx::Error> {
        let rows: Vec<WellnessRow> =
            sqlx::query_as("SELECT * FROM wellness_entries WHERE user_id = ? ORDER BY date DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(hydrate_entry).collect()
    }

    pub async fn list_range(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WellnessEntry>, sqlx::Error> {
        let rows: Vec<WellnessRow> = sqlx::query_as(
            "SELECT * FROM wellness_entries WHERE user_id = ? AND date BETWEEN ? AND ? ORDER BY date",
        )
        .bind(user_id)
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(hydrate_entry).collect()
    }

    /// Entries not yet confirmed in the remote store, in insertion order.
    pub async fn list_unsynced(&self) -> Result<Vec<WellnessEntry>, sqlx::Error> {
        let rows: Vec<WellnessRow> =
            sqlx::query_as("SELECT * FROM wellness_entries WHERE synced = 0 ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(hydrate_entry).collect()
    }

    /// Flip the synced flag after a confirmed remote write. Idempotent.
    pub async fn mark_synced(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE wellness_entries SET synced = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Update the entry's fields. The synced flag is left as-is: edits to an
    /// already-synced entry do not re-queue it for sync.
    pub async fn update(&self, entry: &WellnessEntry) -> Result<WellnessEntry, sqlx::Error> {
        let updated_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE wellness_entries
            SET date = ?, mood = ?, sleep_hours = ?, stress_level = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(entry.date.to_string())
        .bind(entry.mood.to_string())
        .bind(entry.sleep_hours)
        .bind(entry.stress_level as i64)
        .bind(&entry.notes)
        .bind(&updated_at)
        .bind(entry.id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(entry.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn delete(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM wellness_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn hydrate_entry(row: WellnessRow) -> Result<WellnessEntry, sqlx::Error> {
    let mood: Mood = row.mood.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
        index: "mood".into(),
        source: e.into(),
    })?;

    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
        sqlx::Error::ColumnDecode {
            index: "date".into(),
            source: Box::new(e),
        }
    })?;

    Ok(WellnessEntry {
        id: row.id,
        user_id: row.user_id,
        date,
        mood,
        sleep_hours: row.sleep_hours,
        stress_level: row.stress_level as u8,
        notes: row.notes,
        synced: row.synced,
        created_at: DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}
