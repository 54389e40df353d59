// ABOUTME: Durable keyed store on SQLite via sqlx, one row per JSON leaf
// ABOUTME: Subtree reads are range scans; writes and compare-and-set run in transactions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! SQLite keyed store
//!
//! The JSON tree is flattened so that every scalar leaf is a row keyed by its
//! full path (`steps/u1/2024-05-01/steps -> 5000`). Reading a node selects the
//! row at the node plus every row in the half-open range `[node/, node0)`, which
//! is exactly the set of descendants because `'0'` sorts right after `'/'`.

use super::tree::{assemble, flatten, normalize, validate_keys};
use super::{validate_partial, KeyedStore, StoreCapabilities, StorePath};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Capacity of the change feed before slow watchers start lagging
const CHANGE_FEED_CAPACITY: usize = 256;

/// How long a connection waits on another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Writers take the write lock up front so two read-then-write transactions
/// never both hold a shared lock and deadlock on upgrade
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    changes: broadcast::Sender<StorePath>,
}

impl SqliteStore {
    /// Connect to `database_url` and create the schema if needed
    ///
    /// In-memory databases are pinned to a single connection that never
    /// expires, since every new connection would otherwise see an empty
    /// database.
    ///
    /// # Errors
    ///
    /// Returns a config error for an unparsable URL or a storage error if the
    /// database cannot be opened or migrated.
    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("invalid sqlite url '{database_url}': {e}")))?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let max_connections = if in_memory { 1 } else { max_connections.max(1) };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(storage_error)?;

        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let store = Self { pool, changes };
        store.migrate().await?;
        info!(max_connections, in_memory, "sqlite store ready");
        Ok(store)
    }

    /// Create the node table
    ///
    /// # Errors
    ///
    /// Returns a storage error if the DDL fails.
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS store_nodes (
                path TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    fn notify(&self, path: &StorePath) {
        // No receivers is the normal case when nothing is watching
        let _ = self.changes.send(path.clone());
    }
}

fn storage_error(error: sqlx::Error) -> AppError {
    AppError::storage(error.to_string()).with_source(error)
}

/// Bounds of the descendant range of `path`
fn descendant_range(path: &StorePath) -> (String, String) {
    let base = path.to_string();
    (format!("{base}/"), format!("{base}0"))
}

async fn read_node(conn: &mut SqliteConnection, path: &StorePath) -> AppResult<Option<Value>> {
    let (lower, upper) = descendant_range(path);
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT path, value FROM store_nodes WHERE path = ? OR (path >= ? AND path < ?) ORDER BY path",
    )
    .bind(path.to_string())
    .bind(lower)
    .bind(upper)
    .fetch_all(&mut *conn)
    .await
    .map_err(storage_error)?;

    let parsed = rows
        .into_iter()
        .filter_map(|(row_path, text)| match serde_json::from_str::<Value>(&text) {
            Ok(value) => Some((row_path, value)),
            Err(e) => {
                warn!(path = %row_path, error = %e, "skipping unparsable sqlite leaf");
                None
            }
        })
        .collect();
    Ok(assemble(path, parsed))
}

/// Replace the node at `path` with `value` (or delete it for `None`)
async fn write_node(
    conn: &mut SqliteConnection,
    path: &StorePath,
    value: Option<&Value>,
) -> AppResult<()> {
    let (lower, upper) = descendant_range(path);
    sqlx::query("DELETE FROM store_nodes WHERE path = ? OR (path >= ? AND path < ?)")
        .bind(path.to_string())
        .bind(lower)
        .bind(upper)
        .execute(&mut *conn)
        .await
        .map_err(storage_error)?;

    let Some(value) = value else {
        return Ok(());
    };

    // A scalar ancestor is replaced by the object being written below it
    for ancestor in path.ancestors() {
        sqlx::query("DELETE FROM store_nodes WHERE path = ?")
            .bind(ancestor.to_string())
            .execute(&mut *conn)
            .await
            .map_err(storage_error)?;
    }

    for (leaf_path, leaf) in flatten(path, value) {
        sqlx::query("INSERT INTO store_nodes (path, value) VALUES (?, ?)")
            .bind(leaf_path)
            .bind(leaf)
            .execute(&mut *conn)
            .await
            .map_err(storage_error)?;
    }
    Ok(())
}

#[async_trait]
impl KeyedStore for SqliteStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::WATCH | StoreCapabilities::COMPARE_AND_SET
    }

    async fn get(&self, path: &StorePath) -> AppResult<Option<Value>> {
        let mut conn = self.pool.acquire().await.map_err(storage_error)?;
        read_node(&mut conn, path).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> AppResult<()> {
        validate_keys(path, &value)?;
        let value = normalize(value);
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await.map_err(storage_error)?;
        write_node(&mut tx, path, value.as_ref()).await?;
        tx.commit().await.map_err(storage_error)?;
        self.notify(path);
        Ok(())
    }

    async fn update(&self, path: &StorePath, partial: Map<String, Value>) -> AppResult<()> {
        validate_partial(path, &partial)?;
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await.map_err(storage_error)?;
        for (key, value) in partial {
            let child = path.child(&key)?;
            write_node(&mut tx, &child, normalize(value).as_ref()).await?;
        }
        tx.commit().await.map_err(storage_error)?;
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
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await.map_err(storage_error)?;
        let current = read_node(&mut tx, path).await?;
        if current != expected.cloned().and_then(normalize) {
            tx.rollback().await.map_err(storage_error)?;
            return Ok(false);
        }
        write_node(&mut tx, path, normalize(value).as_ref()).await?;
        tx.commit().await.map_err(storage_error)?;
        self.notify(path);
        Ok(true)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorePath> {
        self.changes.subscribe()
    }
}
