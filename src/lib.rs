pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::{RemoteCollectionStore, RemoteEntry};
pub use application::services::{CollectionService, SyncSession};
pub use domain::entities::{CollectionSnapshot, Entry};
pub use domain::value_objects::{
    CollectionKind, LocalEntryId, OwnerId, Quantity, RemoteEntryId, SubjectId,
};
pub use infrastructure::remote::{HttpCollectionStore, MemoryCollectionStore};
pub use shared::config::AppConfig;
pub use shared::error::{AppError, Result};

/// Install the default tracing subscriber for host applications that
/// do not bring their own.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_sync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
