use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::models::ExerciseEntry;

pub struct ExerciseRepository {
    pool: SqlitePool,
}

// Row type for database queries
#[derive(sqlx::FromRow)]
struct ExerciseRow {
    id: i64,
    user_id: String,
    date: String,
    activity: String,
    duration_minutes: i64,
    calories_burned: i64,
    notes: String,
    synced: bool,
    created_at: String,
    updated_at: String,
}

impl ExerciseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, entry: &ExerciseEntry) -> Result<ExerciseEntry, sqlx::Error> {
        let created_at = entry.created_at.to_rfc3339();
        let updated_at = entry.updated_at.to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO exercise_entries (user_id, date, activity, duration_minutes, calories_burned, notes, synced, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&entry.user_id)
        .bind(entry.date.to_string())
        .bind(&entry.activity)
        .bind(entry.duration_minutes)
        .bind(entry.calories_burned)
        .bind(&entry.notes)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<ExerciseEntry>, sqlx::Error> {
        let row: Option<ExerciseRow> = sqlx::query_as("SELECT * FROM exercise_entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(hydrate_entry).transpose()
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<ExerciseEntry>, sqlx::Error> {
        let rows: Vec<ExerciseRow> =
            sqlx::query_as("SELECT * FROM exercise_entries WHERE user_id = ? ORDER BY date DESC")
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
    ) -> Result<Vec<ExerciseEntry>, sqlx::Error> {
        let rows: Vec<ExerciseRow> = sqlx::query_as(
            "SELECT * FROM exercise_entries WHERE user_id = ? AND date BETWEEN ? AND ? ORDER BY date",
        )
        .bind(user_id)
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(hydrate_entry).collect()
    }

    /// Entries not yet confirmed in the remote store, in insertion order.
    pub async fn list_unsynced(&self) -> Result<Vec<ExerciseEntry>, sqlx::Error> {
        let rows: Vec<ExerciseRow> =
            sqlx::query_as("SELECT * FROM exercise_entries WHERE synced = 0 ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(hydrate_entry).collect()
    }

    /// Flip the synced flag after a confirmed remote write. Idempotent.
    pub async fn mark_synced(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE exercise_entries SET synced = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Update the entry's fields; the synced flag is left as-is.
    pub async fn update(&self, entry: &ExerciseEntry) -> Result<ExerciseEntry, sqlx::Error> {
        let updated_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE exercise_entries
            SET date = ?, activity = ?, duration_minutes = ?, calories_burned = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(entry.date.to_string())
        .bind(&entry.activity)
        .bind(entry.duration_minutes)
        .bind(entry.calories_burned)
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
        sqlx::query("DELETE FROM exercise_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn hydrate_entry(row: ExerciseRow) -> Result<ExerciseEntry, sqlx::Error> {
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
        sqlx::Error::ColumnDecode {
            index: "date".into(),
            source: Box::new(e),
        }
    })?;

    Ok(ExerciseEntry {
        id: row.id,
        user_id: row.user_id,
        date,
        activity: row.activity,
        duration_minutes: row.duration_minutes,
        calories_burned: row.calories_burned,
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
