use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A logged exercise session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,
    pub activity: String,
    pub duration_minutes: i64,
    pub calories_burned: i64,
    pub notes: String,
    pub synced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExerciseEntry {
    pub fn new(date: NaiveDate, activity: impl Into<String>, duration_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id: String::new(),
            date,
            activity: activity.into(),
            duration_minutes,
            calories_burned: 0,
            notes: String::new(),
            synced: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_calories(mut self, calories_burned: i64) -> Self {
        self.calories_burned = calories_burned;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Payload fields for the remote document, excluding local bookkeeping.
    pub fn document_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("date".into(), json!(self.date.to_string()));
        fields.insert("activity".into(), json!(self.activity));
        fields.insert("duration_minutes".into(), json!(self.duration_minutes));
        fields.insert("calories_burned".into(), json!(self.calories_burned));
        fields.insert("notes".into(), json!(self.notes));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_defaults() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let e = ExerciseEntry::new(date, "running", 30);

        assert_eq!(e.activity, "running");
        assert_eq!(e.duration_minutes, 30);
        assert_eq!(e.calories_burned, 0);
        assert!(!e.synced);
    }

    #[test]
    fn test_document_fields_payload() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let e = ExerciseEntry::new(date, "swimming", 45)
            .with_calories(320)
            .with_notes("pool");

        let fields = e.document_fields();
        assert_eq!(fields["date"], serde_json::json!("2025-03-11"));
        assert_eq!(fields["activity"], serde_json::json!("swimming"));
        assert_eq!(fields["duration_minutes"], serde_json::json!(45));
        assert_eq!(fields["calories_burned"], serde_json::json!(320));
        assert!(!fields.contains_key("id"));
        assert!(!fields.contains_key("synced"));
    }
}
