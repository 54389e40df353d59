// ABOUTME: Store factory selecting a backend from the configured store URL
// ABOUTME: `memory` yields an InMemoryStore, `sqlite:` URLs a SqliteStore
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::memory::InMemoryStore;
use super::sqlite::SqliteStore;
use super::KeyedStore;
use crate::config::StoreConfig;
use crate::errors::{AppError, AppResult};
use std::sync::Arc;
use tracing::info;

/// Backend named by a store URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local tree, lost on exit
    Memory,
    /// SQLite database at the given sqlx URL
    Sqlite(String),
}

impl StoreBackend {
    /// Classify a store URL
    ///
    /// # Errors
    ///
    /// Returns a config error for unknown schemes.
    pub fn from_url(url: &str) -> AppResult<Self> {
        let url = url.trim();
        if url.eq_ignore_ascii_case("memory") || url == "mem://" {
            return Ok(Self::Memory);
        }
        if url.starts_with("sqlite:") {
            return Ok(Self::Sqlite(url.to_owned()));
        }
        Err(AppError::config(format!(
            "unsupported store url '{url}' (expected 'memory' or 'sqlite:...')"
        )))
    }
}

/// Open the store described by `config`
///
/// # Errors
///
/// Returns a config error for an unknown URL or a storage error if the backend
/// cannot be opened.
pub async fn connect(config: &StoreConfig) -> AppResult<Arc<dyn KeyedStore>> {
    match StoreBackend::from_url(&config.url)? {
        StoreBackend::Memory => {
            info!("Initializing in-memory step store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Sqlite(url) => {
            info!(url = %url, "Initializing sqlite step store");
            let store = SqliteStore::connect(&url, config.sqlite_max_connections).await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_backend_from_url() {
        assert_eq!(StoreBackend::from_url("memory").unwrap(), StoreBackend::Memory);
        assert_eq!(
            StoreBackend::from_url("sqlite:./steps.db").unwrap(),
            StoreBackend::Sqlite("sqlite:./steps.db".to_owned())
        );
        assert_eq!(
            StoreBackend::from_url("postgres://x").unwrap_err().code,
            ErrorCode::ConfigInvalid
        );
    }
}
