use crate::application::ports::{RemoteCollectionStore, RemoteEntry};
use crate::domain::value_objects::{CollectionKind, OwnerId, Quantity, RemoteEntryId, SubjectId};
use crate::shared::config::RemoteConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// REST-backed remote store for the storefront API.
///
/// Endpoints, relative to the configured base URL:
/// - `POST   /users/{owner}/{collection}`            -> `{ "id": ... }`
/// - `DELETE /users/{owner}/{collection}/{entry_id}`
/// - `PATCH  /users/{owner}/{collection}/{entry_id}` with `{ "quantity": n }`
/// - `GET    /users/{owner}/{collection}`            -> `[{ "id", "subject_id", "quantity"? }]`
pub struct HttpCollectionStore {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CreateEntryBody<'a> {
    subject_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
}

#[derive(Debug, Serialize)]
struct UpdateQuantityBody {
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct CreatedEntryBody {
    id: String,
}

#[derive(Debug, Deserialize)]
struct EntryBody {
    id: String,
    subject_id: String,
    #[serde(default)]
    quantity: Option<u32>,
}

impl EntryBody {
    fn into_remote_entry(self) -> Result<RemoteEntry, AppError> {
        Ok(RemoteEntry {
            id: RemoteEntryId::new(self.id).map_err(AppError::SerializationError)?,
            subject_id: SubjectId::new(self.subject_id).map_err(AppError::SerializationError)?,
            quantity: self
                .quantity
                .map(Quantity::new)
                .transpose()
                .map_err(AppError::SerializationError)?,
        })
    }
}

impl HttpCollectionStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|err| AppError::ConfigurationError(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self, owner: &OwnerId, kind: CollectionKind) -> String {
        format!("{}/users/{}/{}", self.base_url, owner, kind.as_str())
    }

    fn entry_url(&self, owner: &OwnerId, kind: CollectionKind, entry_id: &RemoteEntryId) -> String {
        format!("{}/{}", self.collection_url(owner, kind), entry_id)
    }

    fn ensure_success(response: Response, context: &str) -> Result<Response, AppError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(context.to_string()));
        }
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "{context} returned status {status}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteCollectionStore for HttpCollectionStore {
    async fn create(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
        subject_id: &SubjectId,
        quantity: Option<Quantity>,
    ) -> Result<RemoteEntryId, AppError> {
        let url = self.collection_url(owner, kind);
        debug!(%url, subject = %subject_id, "creating collection entry");
        let response = self
            .client
            .post(&url)
            .json(&CreateEntryBody {
                subject_id: subject_id.as_str(),
                quantity: quantity.map(|q| q.get()),
            })
            .send()
            .await?;
        let body: CreatedEntryBody = Self::ensure_success(response, "create entry")?
            .json()
            .await?;
        RemoteEntryId::new(body.id).map_err(AppError::SerializationError)
    }

    async fn delete(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
        entry_id: &RemoteEntryId,
    ) -> Result<(), AppError> {
        let url = self.entry_url(owner, kind, entry_id);
        debug!(%url, "deleting collection entry");
        let response = self.client.delete(&url).send().await?;
        Self::ensure_success(response, "delete entry")?;
        Ok(())
    }

    async fn update_quantity(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
        entry_id: &RemoteEntryId,
        quantity: Quantity,
    ) -> Result<(), AppError> {
        let url = self.entry_url(owner, kind, entry_id);
        debug!(%url, %quantity, "updating entry quantity");
        let response = self
            .client
            .patch(&url)
            .json(&UpdateQuantityBody {
                quantity: quantity.get(),
            })
            .send()
            .await?;
        Self::ensure_success(response, "update entry")?;
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
    ) -> Result<Vec<RemoteEntry>, AppError> {
        let url = self.collection_url(owner, kind);
        debug!(%url, "listing collection");
        let response = self.client.get(&url).send().await?;
        let bodies: Vec<EntryBody> = Self::ensure_success(response, "list collection")?
            .json()
            .await?;
        bodies
            .into_iter()
            .map(EntryBody::into_remote_entry)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HttpCollectionStore {
        HttpCollectionStore::new(&RemoteConfig {
            base_url: "http://localhost:9999/api/".to_string(),
            request_timeout: 5,
        })
        .unwrap()
    }

    fn owner() -> OwnerId {
        OwnerId::new("user-1".to_string()).unwrap()
    }

    #[test]
    fn test_collection_url_trims_trailing_slash() {
        let url = store().collection_url(&owner(), CollectionKind::Cart);
        assert_eq!(url, "http://localhost:9999/api/users/user-1/cart");
    }

    #[test]
    fn test_entry_url_appends_entry_id() {
        let entry_id = RemoteEntryId::new("900".to_string()).unwrap();
        let url = store().entry_url(&owner(), CollectionKind::Wishlist, &entry_id);
        assert_eq!(url, "http://localhost:9999/api/users/user-1/wishlist/900");
    }

    #[test]
    fn test_entry_body_conversion_rejects_zero_quantity() {
        let body = EntryBody {
            id: "r1".to_string(),
            subject_id: "p1".to_string(),
            quantity: Some(0),
        };
        assert!(matches!(
            body.into_remote_entry(),
            Err(AppError::SerializationError(_))
        ));
    }

    #[test]
    fn test_entry_body_conversion_allows_missing_quantity() {
        let body = EntryBody {
            id: "r1".to_string(),
            subject_id: "p1".to_string(),
            quantity: None,
        };
        let entry = body.into_remote_entry().unwrap();
        assert!(entry.quantity.is_none());
    }

    #[test]
    fn test_create_body_omits_absent_quantity() {
        let json = serde_json::to_string(&CreateEntryBody {
            subject_id: "p1",
            quantity: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"subject_id":"p1"}"#);
    }
}
