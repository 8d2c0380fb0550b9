use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::mood::Mood;

/// A daily wellness check-in: mood, sleep, and stress for one date.
///
/// `id` is assigned by the local store on insert (0 until then).
/// `synced` flips to true only after the remote store confirms an upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellnessEntry {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,
    pub mood: Mood,
    pub sleep_hours: f64,
    pub stress_level: u8,
    pub notes: String,
    pub synced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WellnessEntry {
    pub fn new(date: NaiveDate, mood: Mood, sleep_hours: f64, stress_level: u8) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id: String::new(),
            date,
            mood,
            sleep_hours,
            stress_level,
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

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Payload fields for the remote document. The reconciler adds
    /// `owner_id` and `timestamp` at upsert time; local bookkeeping
    /// (`id`, `synced`, `user_id`) stays out of the payload.
    pub fn document_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("date".into(), json!(self.date.to_string()));
        fields.insert("mood".into(), json!(self.mood.to_string()));
        fields.insert("sleep_hours".into(), json!(self.sleep_hours));
        fields.insert("stress_level".into(), json!(self.stress_level));
        fields.insert("notes".into(), json!(self.notes));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> WellnessEntry {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        WellnessEntry::new(date, Mood::Happy, 7.5, 2).with_notes("slept well")
    }

    #[test]
    fn test_new_entry_starts_unsynced() {
        let e = entry();
        assert!(!e.synced);
        assert_eq!(e.id, 0);
        assert!(e.user_id.is_empty());
    }

    #[test]
    fn test_document_fields_payload() {
        let fields = entry().document_fields();

        assert_eq!(fields["date"], json!("2025-03-10"));
        assert_eq!(fields["mood"], json!("happy"));
        assert_eq!(fields["sleep_hours"], json!(7.5));
        assert_eq!(fields["stress_level"], json!(2));
        assert_eq!(fields["notes"], json!("slept well"));
    }

    #[test]
    fn test_document_fields_exclude_local_bookkeeping() {
        let fields = entry().document_fields();

        assert!(!fields.contains_key("id"));
        assert!(!fields.contains_key("synced"));
        assert!(!fields.contains_key("user_id"));
    }
}
