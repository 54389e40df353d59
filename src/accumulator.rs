// ABOUTME: Converts pedometer readings into durable per-day step and calorie totals
// ABOUTME: Read-modify-write of steps/{user}/{date} with last-writer-wins or compare-and-swap
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Step Accumulator
//!
//! Each reading goes through the same sequence:
//!
//! 1. the cumulative reading becomes a delta via [`CumulativeTracker`]
//! 2. the accounting date is resolved from the clock, once per call
//! 3. the profile is read for the calorie basis (weight and height)
//! 4. the day's record is read, incremented, and written back
//! 5. the in-memory mirror is refreshed and the goal is checked
//!
//! The profile read and the record read-modify-write are separate round trips,
//! so a concurrent weight edit may or may not be reflected in one write.
//!
//! ## Lost updates
//!
//! With [`WriteMode::LastWriterWins`] two overlapping writers that both read
//! the same total each write back their own increment and one of them is
//! lost. This mirrors the realtime-database client and is acceptable for a
//! single device. [`WriteMode::CompareAndSwap`] closes the gap on stores with
//! [`StoreCapabilities::COMPARE_AND_SET`] by retrying against the fresh value.

use crate::calories::calories_with_basis;
use crate::clock::Clock;
use crate::config::{AccumulatorConfig, WriteMode};
use crate::errors::{AppError, AppResult};
use crate::logging::TrackerLogger;
use crate::models::{CalorieBasis, DailyRecord, DateKey, StepTotals, UserProfile};
use crate::sensor::CumulativeTracker;
use crate::store::{KeyedStore, StoreCapabilities, StorePath};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

/// Goal events buffered for slow subscribers
const GOAL_EVENT_CAPACITY: usize = 32;

/// Advisory notification that today's total is at or above the step goal
///
/// Sent after every successful write at or above the goal, so subscribers see
/// it repeatedly once the goal is passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalReached {
    /// User whose goal was reached
    pub user_id: String,
    /// Accounting date
    pub date: DateKey,
    /// Step total after the write
    pub steps: u64,
    /// Goal from the profile at the time of the write
    pub step_goal: u64,
}

/// Daily step accumulator for one sensor subscription
pub struct StepAccumulator {
    store: Arc<dyn KeyedStore>,
    clock: Arc<dyn Clock>,
    config: AccumulatorConfig,
    tracker: CumulativeTracker,
    mirror: RwLock<Option<DailyRecord>>,
    goal_events: broadcast::Sender<GoalReached>,
}

impl StepAccumulator {
    /// Create an accumulator over `store` using `clock` for the accounting date
    #[must_use]
    pub fn new(store: Arc<dyn KeyedStore>, clock: Arc<dyn Clock>, config: AccumulatorConfig) -> Self {
        let (goal_events, _) = broadcast::channel(GOAL_EVENT_CAPACITY);
        Self {
            store,
            clock,
            config,
            tracker: CumulativeTracker::new(),
            mirror: RwLock::new(None),
            goal_events,
        }
    }

    /// Reset the cumulative baseline for a new sensor subscription
    pub fn begin_subscription(&mut self) {
        self.tracker.reset();
    }

    /// Last cumulative reading seen on this subscription
    #[must_use]
    pub const fn last_observed(&self) -> u64 {
        self.tracker.last_observed()
    }

    /// Write mode in effect
    #[must_use]
    pub const fn write_mode(&self) -> WriteMode {
        self.config.write_mode
    }

    /// Apply a cumulative sensor reading
    ///
    /// The baseline advances even when the write fails, so a failed tick
    /// loses its delta rather than having it re-added on the next reading.
    ///
    /// # Errors
    ///
    /// See [`StepAccumulator::apply_delta`].
    pub async fn apply(&mut self, user_id: &str, cumulative_steps: u64) -> AppResult<StepTotals> {
        let delta = self.tracker.observe(cumulative_steps);
        self.apply_delta(user_id, delta).await
    }

    /// Add `delta` steps to today's record for `user_id`
    ///
    /// Failures are logged here; the caller only decides whether to continue.
    ///
    /// # Errors
    ///
    /// - `MissingProfile` when the profile, weight, or height is absent
    /// - `StorageError` when a read or write fails
    /// - `WriteConflict` when compare-and-swap runs out of attempts
    pub async fn apply_delta(&self, user_id: &str, delta: u64) -> AppResult<StepTotals> {
        self.accumulate(user_id, delta).await.inspect_err(|e| {
            TrackerLogger::log_apply_failure(user_id, e);
        })
    }

    async fn accumulate(&self, user_id: &str, delta: u64) -> AppResult<StepTotals> {
        let date = self.clock.current_period();
        let profile = self.load_profile(user_id).await?;
        let basis = profile.calorie_basis(user_id)?;
        let path = StorePath::daily_record(user_id, date)?;

        let totals = match self.config.write_mode {
            WriteMode::LastWriterWins => self.write_last_writer_wins(&path, delta, &basis).await?,
            WriteMode::CompareAndSwap { max_attempts } => {
                if self
                    .store
                    .capabilities()
                    .contains(StoreCapabilities::COMPARE_AND_SET)
                {
                    self.write_compare_and_swap(&path, delta, &basis, max_attempts)
                        .await?
                } else {
                    warn!(
                        path = %path,
                        "store has no compare-and-set, falling back to last-writer-wins"
                    );
                    self.write_last_writer_wins(&path, delta, &basis).await?
                }
            }
        };

        TrackerLogger::log_step_update(
            user_id,
            &date.to_string(),
            delta,
            totals.steps,
            totals.calories,
        );
        *self.mirror.write().await = Some(DailyRecord::new(date, totals));

        if let Some(step_goal) = profile.effective_step_goal() {
            if totals.steps >= step_goal {
                TrackerLogger::log_goal_reached(user_id, &date.to_string(), totals.steps, step_goal);
                // Advisory only; nobody listening is fine
                let _ = self.goal_events.send(GoalReached {
                    user_id: user_id.to_owned(),
                    date,
                    steps: totals.steps,
                    step_goal,
                });
            }
        }

        Ok(totals)
    }

    async fn load_profile(&self, user_id: &str) -> AppResult<UserProfile> {
        let path = StorePath::user_profile(user_id)?;
        match self.store.get(&path).await? {
            Some(value) => UserProfile::from_stored(value),
            None => Err(AppError::missing_profile(user_id, "no profile stored")),
        }
    }

    async fn write_last_writer_wins(
        &self,
        path: &StorePath,
        delta: u64,
        basis: &CalorieBasis,
    ) -> AppResult<StepTotals> {
        let existing = self
            .store
            .get(path)
            .await?
            .map_or(StepTotals::ZERO, |value| StepTotals::from_stored(&value));
        let totals = next_totals(existing, delta, basis);
        self.store.update(path, totals.to_partial()).await?;
        Ok(totals)
    }

    async fn write_compare_and_swap(
        &self,
        path: &StorePath,
        delta: u64,
        basis: &CalorieBasis,
        max_attempts: u32,
    ) -> AppResult<StepTotals> {
        for attempt in 1..=max_attempts {
            let current = self.store.get(path).await?;
            let existing = current
                .as_ref()
                .map_or(StepTotals::ZERO, StepTotals::from_stored);
            let totals = next_totals(existing, delta, basis);

            // Keep any sibling fields other clients stored on the record
            let mut body = match &current {
                Some(Value::Object(fields)) => fields.clone(),
                _ => Map::new(),
            };
            body.extend(totals.to_partial());

            if self
                .store
                .compare_and_set(path, current.as_ref(), Value::Object(body))
                .await?
            {
                return Ok(totals);
            }
            debug!(path = %path, attempt, "daily record changed underneath us, retrying");
        }
        Err(AppError::write_conflict(path, max_attempts))
    }

    /// Load today's stored record into the mirror, zero when absent
    ///
    /// # Errors
    ///
    /// Returns a storage error if the record cannot be read.
    pub async fn sync_today(&self, user_id: &str) -> AppResult<StepTotals> {
        let date = self.clock.current_period();
        let path = StorePath::daily_record(user_id, date)?;
        let totals = self
            .store
            .get(&path)
            .await?
            .map_or(StepTotals::ZERO, |value| StepTotals::from_stored(&value));
        *self.mirror.write().await = Some(DailyRecord::new(date, totals));
        Ok(totals)
    }

    /// Last record this accumulator wrote or synced
    pub async fn mirror(&self) -> Option<DailyRecord> {
        *self.mirror.read().await
    }

    /// Mirrored totals for the current date; zero once the date has moved on
    pub async fn today_totals(&self) -> StepTotals {
        let today = self.clock.current_period();
        match *self.mirror.read().await {
            Some(record) if record.date == today => record.totals(),
            _ => StepTotals::ZERO,
        }
    }

    /// Subscribe to goal-reached notifications
    #[must_use]
    pub fn subscribe_goal_events(&self) -> broadcast::Receiver<GoalReached> {
        self.goal_events.subscribe()
    }
}

fn next_totals(existing: StepTotals, delta: u64, basis: &CalorieBasis) -> StepTotals {
    let steps = existing.steps.saturating_add(delta);
    StepTotals {
        steps,
        calories: calories_with_basis(steps, basis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_totals_recomputes_calories_from_total() {
        let basis = CalorieBasis {
            weight_kg: 80.0,
            height_cm: 180.0,
        };
        let existing = StepTotals {
            steps: 100,
            calories: 999.0,
        };
        let totals = next_totals(existing, 20, &basis);
        assert_eq!(totals.steps, 120);
        assert!((totals.calories - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_next_totals_saturates() {
        let basis = CalorieBasis {
            weight_kg: 1.0,
            height_cm: 1.0,
        };
        let existing = StepTotals {
            steps: u64::MAX - 1,
            calories: 0.0,
        };
        assert_eq!(next_totals(existing, 10, &basis).steps, u64::MAX);
    }
}
