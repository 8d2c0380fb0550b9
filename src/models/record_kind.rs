use std::fmt;

/// The two categories of locally-stored records that the sync reconciler
/// pushes to the remote store. Each kind maps to its own remote collection,
/// so equal numeric ids across kinds never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Wellness,
    Exercise,
}

impl RecordKind {
    /// All kinds, in the fixed order the reconciler processes them.
    pub const ALL: [RecordKind; 2] = [RecordKind::Wellness, RecordKind::Exercise];

    /// Remote collection name for this kind.
    pub fn collection(self) -> &'static str {
        match self {
            RecordKind::Wellness => "wellness_entries",
            RecordKind::Exercise => "exercise_entries",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Wellness => write!(f, "wellness"),
            RecordKind::Exercise => write!(f, "exercise"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collections_are_distinct() {
        assert_ne!(
            RecordKind::Wellness.collection(),
            RecordKind::Exercise.collection()
        );
    }

    #[test]
    fn test_fixed_processing_order() {
        assert_eq!(RecordKind::ALL[0], RecordKind::Wellness);
        assert_eq!(RecordKind::ALL[1], RecordKind::Exercise);
    }
}
