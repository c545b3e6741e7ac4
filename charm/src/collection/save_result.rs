use crate::driver::UpdateOutcome;
use bson::Bson;

/// The outcome of persisting a document.
///
/// `save` always returns a `SaveResult`, whether the document was inserted
/// for the first time or replaced an earlier revision; the saved instance
/// itself is mutated in place. On insert the generated identity is
/// available through [`inserted_id`]; on replace the matched/modified
/// counts are populated instead.
///
/// [`inserted_id`]: SaveResult::inserted_id
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveResult {
    inserted_id: Option<Bson>,
    matched_count: u64,
    modified_count: u64,
}

impl SaveResult {
    pub(crate) fn inserted(id: Bson) -> Self {
        SaveResult {
            inserted_id: Some(id),
            matched_count: 0,
            modified_count: 0,
        }
    }

    pub(crate) fn replaced(outcome: UpdateOutcome) -> Self {
        SaveResult {
            inserted_id: None,
            matched_count: outcome.matched_count(),
            modified_count: outcome.modified_count(),
        }
    }

    /// The identity generated on first insert, `None` on replace.
    pub fn inserted_id(&self) -> Option<&Bson> {
        self.inserted_id.as_ref()
    }

    /// Whether this save inserted a new record.
    pub fn is_insert(&self) -> bool {
        self.inserted_id.is_some()
    }

    /// Number of existing documents the replace matched.
    pub fn matched_count(&self) -> u64 {
        self.matched_count
    }

    /// Number of existing documents the replace modified.
    pub fn modified_count(&self) -> u64 {
        self.modified_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_result_carries_identity() {
        let result = SaveResult::inserted(Bson::String("abc".to_string()));
        assert!(result.is_insert());
        assert_eq!(result.inserted_id(), Some(&Bson::String("abc".to_string())));
        assert_eq!(result.matched_count(), 0);
    }

    #[test]
    fn replaced_result_carries_counts() {
        let result = SaveResult::replaced(UpdateOutcome::new(1, 1));
        assert!(!result.is_insert());
        assert!(result.inserted_id().is_none());
        assert_eq!(result.matched_count(), 1);
        assert_eq!(result.modified_count(), 1);
    }
}
