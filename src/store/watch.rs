// ABOUTME: Live subscriptions to a store path built on the backend change feed
// ABOUTME: Emits the current snapshot first, then a fresh snapshot after each overlapping write
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{KeyedStore, StoreCapabilities, StorePath};
use crate::errors::{AppError, AppResult};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Snapshot stream for one path
pub struct StoreWatch {
    store: Arc<dyn KeyedStore>,
    path: StorePath,
    changes: broadcast::Receiver<StorePath>,
    primed: bool,
}

/// Watch `path` on `store`
///
/// The first call to [`StoreWatch::next`] yields the current value, like a
/// realtime-database listener firing on attach.
///
/// # Errors
///
/// Returns an unsupported-operation error when the backend does not report
/// [`StoreCapabilities::WATCH`].
pub fn watch(store: Arc<dyn KeyedStore>, path: StorePath) -> AppResult<StoreWatch> {
    if !store.capabilities().contains(StoreCapabilities::WATCH) {
        return Err(AppError::unsupported("watch"));
    }
    let changes = store.subscribe();
    Ok(StoreWatch {
        store,
        path,
        changes,
        primed: false,
    })
}

impl StoreWatch {
    /// Path being watched
    #[must_use]
    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Next snapshot; `None` once the store's change feed is closed
    ///
    /// Writes that land while the watcher is lagging are coalesced into a single
    /// re-read.
    pub async fn next(&mut self) -> Option<AppResult<Option<Value>>> {
        if !self.primed {
            self.primed = true;
            return Some(self.store.get(&self.path).await);
        }
        loop {
            match self.changes.recv().await {
                Ok(changed) if changed.overlaps(&self.path) => {
                    return Some(self.store.get(&self.path).await);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(path = %self.path, skipped, "store watcher lagged, re-reading");
                    return Some(self.store.get(&self.path).await);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Drive `callback` with every snapshot on a background task
    ///
    /// Read failures are logged and skipped. Abort the returned handle to
    /// detach the listener.
    pub fn for_each<F>(mut self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(Option<Value>) + Send + 'static,
    {
        tokio::spawn(async move {
            while let Some(snapshot) = self.next().await {
                match snapshot {
                    Ok(value) => callback(value),
                    Err(e) => warn!(path = %self.path, error = %e, "watch read failed"),
                }
            }
            debug!(path = %self.path, "store change feed closed, watcher exiting");
        })
    }
}
