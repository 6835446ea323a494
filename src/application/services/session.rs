use crate::application::ports::RemoteCollectionStore;
use crate::application::services::CollectionService;
use crate::domain::value_objects::{CollectionKind, OwnerId};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::info;

/// Composition root for one signed-in user: owns the cart and
/// wishlist services and their lifecycle. Constructed with an
/// injected store so the whole stack runs without a UI framework.
pub struct SyncSession {
    owner: OwnerId,
    cart: Arc<CollectionService>,
    wishlist: Arc<CollectionService>,
}

impl SyncSession {
    /// Build the per-collection services and, unless configured
    /// otherwise, pull the initial snapshots from the server.
    pub async fn start(
        owner: OwnerId,
        store: Arc<dyn RemoteCollectionStore>,
        config: &AppConfig,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let cart = Arc::new(CollectionService::new(
            owner.clone(),
            CollectionKind::Cart,
            store.clone(),
        ));
        let wishlist = Arc::new(CollectionService::new(
            owner.clone(),
            CollectionKind::Wishlist,
            store,
        ));
        let session = Self {
            owner,
            cart,
            wishlist,
        };

        if config.sync.refresh_on_start {
            session.refresh_all().await?;
        }
        info!(owner = %session.owner, "sync session started");
        Ok(session)
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn cart(&self) -> &Arc<CollectionService> {
        &self.cart
    }

    pub fn wishlist(&self) -> &Arc<CollectionService> {
        &self.wishlist
    }

    pub fn collection(&self, kind: CollectionKind) -> &Arc<CollectionService> {
        match kind {
            CollectionKind::Cart => &self.cart,
            CollectionKind::Wishlist => &self.wishlist,
        }
    }

    /// Re-reconcile every collection against the server (login,
    /// reconnect after an offline stretch).
    pub async fn refresh_all(&self) -> Result<(), AppError> {
        self.cart.refresh().await?;
        self.wishlist.refresh().await?;
        Ok(())
    }

    /// Clear both mirrors and refuse further mutations. Called on
    /// logout; the session is inert afterwards.
    pub fn teardown(&self) {
        self.cart.teardown();
        self.wishlist.teardown();
        info!(owner = %self.owner, "sync session torn down");
    }
}
