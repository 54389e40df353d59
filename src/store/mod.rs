// ABOUTME: Keyed store abstraction with pluggable backends (in-memory, SQLite)
// ABOUTME: Realtime-database style get/set/update/watch plus optional compare-and-set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Store factory for URL-based backend selection
pub mod factory;
/// In-memory store implementation
pub mod memory;
/// Validated store paths
pub mod path;
/// SQLite store implementation
pub mod sqlite;
/// JSON tree write semantics shared by the backends
pub mod tree;
/// Change subscriptions
pub mod watch;

pub use path::StorePath;
pub use watch::{watch, StoreWatch};

use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use bitflags::bitflags;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

bitflags! {
    /// Optional operations a store backend supports
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StoreCapabilities: u8 {
        /// Publishes a change feed usable by [`watch`]
        const WATCH = 1;
        /// Supports [`KeyedStore::compare_and_set`]
        const COMPARE_AND_SET = 1 << 1;
    }
}

/// Keyed store trait for pluggable backend implementations
///
/// Values form one JSON tree addressed by [`StorePath`]. `null` and empty
/// objects are never stored: writing them deletes the node, and reading an
/// absent node yields `None`. Reading a parent returns the assembled subtree.
///
/// # Examples
///
/// ```rust,no_run
/// use serde_json::json;
/// use stride_tracker::store::{memory::InMemoryStore, KeyedStore, StorePath};
/// # async fn example() -> Result<(), stride_tracker::errors::AppError> {
/// let store = InMemoryStore::new();
/// let path = StorePath::parse("users/u1")?;
///
/// store.set(&path, json!({"weight": 70, "height": 175})).await?;
/// store
///     .update(&path, json!({"stepGoal": 8000}).as_object().cloned().unwrap_or_default())
///     .await?;
///
/// let profile = store.get(&path).await?;
/// assert_eq!(profile, Some(json!({"weight": 70, "height": 175, "stepGoal": 8000})));
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Optional operations this backend supports
    fn capabilities(&self) -> StoreCapabilities;

    /// Read the value (or assembled subtree) at `path`
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read.
    async fn get(&self, path: &StorePath) -> AppResult<Option<Value>>;

    /// Overwrite the node at `path`; `null` deletes it
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    async fn set(&self, path: &StorePath, value: Value) -> AppResult<()>;

    /// Merge `partial` into the node at `path`, creating it if absent
    ///
    /// Each key replaces the matching child; children not named are kept. A
    /// `null` child deletes that child.
    ///
    /// # Errors
    ///
    /// Returns an invalid-path error for keys that are not valid segments, or
    /// a storage error if the write fails.
    async fn update(&self, path: &StorePath, partial: Map<String, Value>) -> AppResult<()>;

    /// Replace the node at `path` only if it still equals `expected`
    ///
    /// `expected == None` means "only if absent". Returns `false` without
    /// writing when the current value differs.
    ///
    /// # Errors
    ///
    /// Returns an unsupported-operation error for backends without
    /// [`StoreCapabilities::COMPARE_AND_SET`].
    async fn compare_and_set(
        &self,
        path: &StorePath,
        expected: Option<&Value>,
        value: Value,
    ) -> AppResult<bool> {
        let _ = (path, expected, value);
        Err(AppError::unsupported("compare_and_set"))
    }

    /// Subscribe to the paths written by successful mutations
    fn subscribe(&self) -> broadcast::Receiver<StorePath>;
}

/// Reject merge keys (and nested keys) that are not valid path segments
pub(crate) fn validate_partial(path: &StorePath, partial: &Map<String, Value>) -> AppResult<()> {
    for (key, value) in partial {
        tree::validate_keys(&path.child(key)?, value)?;
    }
    Ok(())
}
