use crate::domain::value_objects::{CollectionKind, OwnerId, Quantity, RemoteEntryId, SubjectId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One collection row as the server reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteEntry {
    pub id: RemoteEntryId,
    pub subject_id: SubjectId,
    pub quantity: Option<Quantity>,
}

/// Server-side source of truth for a named collection scoped to a
/// user. One attempt per call; retry policy, if any, lives below this
/// boundary.
#[async_trait]
pub trait RemoteCollectionStore: Send + Sync {
    async fn create(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
        subject_id: &SubjectId,
        quantity: Option<Quantity>,
    ) -> Result<RemoteEntryId, AppError>;

    async fn delete(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
        entry_id: &RemoteEntryId,
    ) -> Result<(), AppError>;

    async fn update_quantity(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
        entry_id: &RemoteEntryId,
        quantity: Quantity,
    ) -> Result<(), AppError>;

    async fn list_by_owner(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
    ) -> Result<Vec<RemoteEntry>, AppError>;
}
