// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, seeded stores, and store wrappers that shape concurrency
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `stride_tracker`

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use stride_tracker::errors::{AppError, AppResult};
use stride_tracker::store::memory::InMemoryStore;
use stride_tracker::store::{KeyedStore, StoreCapabilities, StorePath};
use tokio::sync::{broadcast, Barrier};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Calendar date literal
pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

/// In-memory store holding one profile at `users/{user_id}`
pub async fn store_with_profile(user_id: &str, profile: Value) -> Result<Arc<InMemoryStore>> {
    init_test_logging();
    let store = Arc::new(InMemoryStore::new());
    store.set(&StorePath::user_profile(user_id)?, profile).await?;
    Ok(store)
}

/// Profile with the 70 kg weight used across the scenarios
pub fn standard_profile() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Moreno",
        "height": "172",
        "weight": "70",
        "stepGoal": "10000"
    })
}

/// Stored `steps` for one day, `None` when absent
pub async fn stored_steps(store: &dyn KeyedStore, user_id: &str, day: &str) -> Result<Option<u64>> {
    let path = StorePath::daily_record(user_id, day.parse()?)?;
    Ok(store
        .get(&path)
        .await?
        .and_then(|record| record.get("steps").and_then(Value::as_u64)))
}

/// Store wrapper that holds the first `parties` reads of daily records at a
/// barrier until all of them have read
///
/// Forces overlapping read-modify-write cycles to observe the same total.
pub struct GatedStore {
    inner: Arc<dyn KeyedStore>,
    barrier: Barrier,
    parties: usize,
    gated_reads: AtomicUsize,
}

impl GatedStore {
    pub fn new(inner: Arc<dyn KeyedStore>, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
            parties,
            gated_reads: AtomicUsize::new(0),
        }
    }
}

fn is_daily_record(path: &StorePath) -> bool {
    path.segments().len() == 3 && path.segments()[0] == "steps"
}

#[async_trait]
impl KeyedStore for GatedStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.inner.capabilities()
    }

    async fn get(&self, path: &StorePath) -> AppResult<Option<Value>> {
        let value = self.inner.get(path).await?;
        if is_daily_record(path) && self.gated_reads.fetch_add(1, Ordering::SeqCst) < self.parties {
            self.barrier.wait().await;
        }
        Ok(value)
    }

    async fn set(&self, path: &StorePath, value: Value) -> AppResult<()> {
        self.inner.set(path, value).await
    }

    async fn update(&self, path: &StorePath, partial: Map<String, Value>) -> AppResult<()> {
        self.inner.update(path, partial).await
    }

    async fn compare_and_set(
        &self,
        path: &StorePath,
        expected: Option<&Value>,
        value: Value,
    ) -> AppResult<bool> {
        self.inner.compare_and_set(path, expected, value).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StorePath> {
        self.inner.subscribe()
    }
}

/// Store wrapper without compare-and-set support
pub struct PlainStore {
    inner: Arc<dyn KeyedStore>,
}

impl PlainStore {
    pub fn new(inner: Arc<dyn KeyedStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl KeyedStore for PlainStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::WATCH
    }

    async fn get(&self, path: &StorePath) -> AppResult<Option<Value>> {
        self.inner.get(path).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> AppResult<()> {
        self.inner.set(path, value).await
    }

    async fn update(&self, path: &StorePath, partial: Map<String, Value>) -> AppResult<()> {
        self.inner.update(path, partial).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StorePath> {
        self.inner.subscribe()
    }
}

/// Store wrapper whose reads of one exact path fail
pub struct FailingReadStore {
    inner: Arc<dyn KeyedStore>,
    failing: StorePath,
}

impl FailingReadStore {
    pub fn new(inner: Arc<dyn KeyedStore>, failing: StorePath) -> Self {
        Self { inner, failing }
    }
}

#[async_trait]
impl KeyedStore for FailingReadStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.inner.capabilities()
    }

    async fn get(&self, path: &StorePath) -> AppResult<Option<Value>> {
        if *path == self.failing {
            return Err(AppError::storage(format!("simulated outage reading {path}")));
        }
        self.inner.get(path).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> AppResult<()> {
        self.inner.set(path, value).await
    }

    async fn update(&self, path: &StorePath, partial: Map<String, Value>) -> AppResult<()> {
        self.inner.update(path, partial).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StorePath> {
        self.inner.subscribe()
    }
}

/// Wrapper whose next `n` writes fail with a storage error
pub struct FailingWriteStore {
    inner: Arc<dyn KeyedStore>,
    remaining_failures: AtomicUsize,
}

impl FailingWriteStore {
    pub fn new(inner: Arc<dyn KeyedStore>) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(0),
        }
    }

    /// Make the next `n` writes fail
    pub fn fail_next(&self, n: usize) {
        self.remaining_failures.store(n, Ordering::SeqCst);
    }

    fn check_write(&self, path: &StorePath) -> AppResult<()> {
        let consumed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed {
            return Err(AppError::storage(format!("simulated outage writing {path}")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyedStore for FailingWriteStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.inner.capabilities()
    }

    async fn get(&self, path: &StorePath) -> AppResult<Option<Value>> {
        self.inner.get(path).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> AppResult<()> {
        self.check_write(path)?;
        self.inner.set(path, value).await
    }

    async fn update(&self, path: &StorePath, partial: Map<String, Value>) -> AppResult<()> {
        self.check_write(path)?;
        self.inner.update(path, partial).await
    }

    async fn compare_and_set(
        &self,
        path: &StorePath,
        expected: Option<&Value>,
        value: Value,
    ) -> AppResult<bool> {
        self.check_write(path)?;
        self.inner.compare_and_set(path, expected, value).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StorePath> {
        self.inner.subscribe()
    }
}
