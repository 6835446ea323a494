pub mod config;
pub mod error;

pub use config::{AppConfig, RemoteConfig, SyncConfig};
pub use error::{AppError, Result};
