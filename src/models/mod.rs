mod exercise_entry;
mod mood;
mod record_kind;
mod wellness_entry;

pub use exercise_entry::ExerciseEntry;
pub use mood::Mood;
pub use record_kind::RecordKind;
pub use wellness_entry::WellnessEntry;
