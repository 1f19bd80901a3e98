//! Local key/value persistence.
//!
//! The engine stores one serialized snapshot per user plus a last-sync
//! timestamp through the [`KeyValueStore`] trait. `SqliteStore` is the
//! shipped on-disk adapter; `MemoryStore` backs tests and hosts that manage
//! persistence themselves.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::CacheError;

/// String key/value persistence boundary.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Returns `~/.config/starquest[-dev]/` based on STARQUEST_ENV.
///
/// Set STARQUEST_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STARQUEST_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("starquest-dev")
    } else {
        base_dir.join("starquest")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
