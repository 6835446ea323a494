use crate::domain::value_objects::{LocalEntryId, Quantity, RemoteEntryId, SubjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tracked member of a user collection. `remote_id` is `None`
/// while the entry is pending, i.e. the server has not yet
/// acknowledged its creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub local_id: LocalEntryId,
    pub remote_id: Option<RemoteEntryId>,
    pub subject_id: SubjectId,
    pub quantity: Option<Quantity>,
    pub added_at: DateTime<Utc>,
}

impl Entry {
    /// Create a pending entry at the moment a mutation is requested.
    pub fn optimistic(subject_id: SubjectId, quantity: Option<Quantity>) -> Self {
        Self {
            local_id: LocalEntryId::random(),
            remote_id: None,
            subject_id,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Rebuild a confirmed entry from a server-side record.
    pub fn confirmed(
        remote_id: RemoteEntryId,
        subject_id: SubjectId,
        quantity: Option<Quantity>,
    ) -> Self {
        Self {
            local_id: LocalEntryId::random(),
            remote_id: Some(remote_id),
            subject_id,
            quantity,
            added_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.remote_id.is_none()
    }
}
