// ABOUTME: Reads a user's daily records and orders them into recent-history views
// ABOUTME: Descending selection for lists, explicit ascending re-sort for charts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Step Aggregator
//!
//! Records live under `steps/{user_id}` as a map keyed by `yyyy-MM-dd`. The
//! two orderings are kept apart on purpose:
//!
//! - [`select_most_recent`] sorts descending and keeps at most `n` days
//! - [`chronological`] re-sorts a selection ascending for trend charts
//!
//! Neither pads missing days with zeros.

use crate::errors::AppResult;
use crate::models::{DailyRecord, DateKey};
use crate::store::{KeyedStore, StorePath};
use serde_json::Value;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, warn};

/// History reader over a keyed store
#[derive(Clone)]
pub struct StepAggregator {
    store: Arc<dyn KeyedStore>,
}

impl StepAggregator {
    /// Create an aggregator over `store`
    #[must_use]
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    /// Every stored record for `user_id`, most recent first
    ///
    /// Keys that are not canonical dates are skipped with a warning; missing
    /// or malformed `steps`/`calories` fields read as zero.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the records cannot be read.
    pub async fn history(&self, user_id: &str) -> AppResult<Vec<DailyRecord>> {
        let path = StorePath::user_steps(user_id)?;
        let records = match self.store.get(&path).await? {
            Some(Value::Object(days)) => days
                .iter()
                .filter_map(|(key, body)| match key.parse::<DateKey>() {
                    Ok(date) => Some(DailyRecord::from_stored(date, body)),
                    Err(e) => {
                        warn!(user.id = %user_id, key = %key, error = %e, "skipping record with non-date key");
                        None
                    }
                })
                .collect(),
            Some(other) => {
                warn!(user.id = %user_id, value = %other, "step history is not a map, ignoring");
                Vec::new()
            }
            None => Vec::new(),
        };
        debug!(user.id = %user_id, days = records.len(), "loaded step history");
        Ok(sort_descending(records))
    }

    /// At most `n` most recent records, most recent first
    ///
    /// # Errors
    ///
    /// Returns a storage error if the records cannot be read.
    pub async fn last_n_days(&self, user_id: &str, n: usize) -> AppResult<Vec<DailyRecord>> {
        let records = self.history(user_id).await?;
        Ok(select_most_recent(records, n))
    }
}

fn sort_descending(mut records: Vec<DailyRecord>) -> Vec<DailyRecord> {
    records.sort_by_key(|record| Reverse(record.date));
    records
}

/// Sort descending by date and keep at most `n` records
#[must_use]
pub fn select_most_recent(records: Vec<DailyRecord>, n: usize) -> Vec<DailyRecord> {
    let mut records = sort_descending(records);
    records.truncate(n);
    records
}

/// Re-sort records ascending by date for left-to-right charts
#[must_use]
pub fn chronological(mut records: Vec<DailyRecord>) -> Vec<DailyRecord> {
    records.sort_by_key(|record| record.date);
    records
}
