use crate::domain::entities::Entry;
use crate::domain::value_objects::{CollectionKind, SubjectId};
use serde::{Deserialize, Serialize};

/// Immutable view of a collection handed to observers. Carries the
/// optimistic state as-is, pending entries included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionSnapshot {
    pub kind: CollectionKind,
    pub entries: Vec<Entry>,
}

impl CollectionSnapshot {
    pub fn empty(kind: CollectionKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, subject_id: &SubjectId) -> bool {
        self.entries.iter().any(|e| &e.subject_id == subject_id)
    }
}
