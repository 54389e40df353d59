// ABOUTME: In-memory keyed store holding one JSON tree behind an async RwLock
// ABOUTME: Supports change feeds and compare-and-set; used as the test double for remote stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::tree::{get_at, merge_at, normalize, set_at, validate_keys};
use super::{validate_partial, KeyedStore, StoreCapabilities, StorePath};
use crate::errors::AppResult;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Capacity of the change feed before slow watchers start lagging
const CHANGE_FEED_CAPACITY: usize = 256;

/// In-memory store
///
/// Clones share the same tree and change feed, so one handle can be given to
/// the accumulator and another to the aggregator.
#[derive(Clone)]
pub struct InMemoryStore {
    root: Arc<RwLock<Value>>,
    changes: broadcast::Sender<StorePath>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::with_data(Value::Null)
    }

    /// Create a store seeded with an initial tree; non-object roots are ignored
    #[must_use]
    pub fn with_data(data: Value) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let tree = normalize(data)
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Map::new()));
        Self {
            root: Arc::new(RwLock::new(tree)),
            changes,
        }
    }

    /// Copy of the whole tree
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }

    fn notify(&self, path: &StorePath) {
        // No receivers is the normal case when nothing is watching
        let _ = self.changes.send(path.clone());
    }
}

#[async_trait]
impl KeyedStore for InMemoryStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::WATCH | StoreCapabilities::COMPARE_AND_SET
    }

    async fn get(&self, path: &StorePath) -> AppResult<Option<Value>> {
        let root = self.root.read().await;
        Ok(get_at(&root, path.segments()).cloned())
    }

    async fn set(&self, path: &StorePath, value: Value) -> AppResult<()> {
        validate_keys(path, &value)?;
        set_at(&mut *self.root.write().await, path.segments(), normalize(value));
        self.notify(path);
        Ok(())
    }

    async fn update(&self, path: &StorePath, partial: Map<String, Value>) -> AppResult<()> {
        validate_partial(path, &partial)?;
        merge_at(&mut *self.root.write().await, path, partial);
        self.notify(path);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        path: &StorePath,
        expected: Option<&Value>,
        value: Value,
    ) -> AppResult<bool> {
        validate_keys(path, &value)?;
        let mut root = self.root.write().await;
        let current = get_at(&root, path.segments());
        let expected = expected.cloned().and_then(normalize);
        if current != expected.as_ref() {
            return Ok(false);
        }
        set_at(&mut root, path.segments(), normalize(value));
        drop(root);
        self.notify(path);
        Ok(true)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorePath> {
        self.changes.subscribe()
    }
}
