// ABOUTME: Pedometer abstraction: permission, availability, and cumulative count subscription
// ABOUTME: CumulativeTracker turns cumulative readings into per-event step deltas
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Step sensor abstraction
//!
//! Platform pedometers report the number of steps counted *since the
//! subscription started*, not per-event increments. [`CumulativeTracker`]
//! keeps the last observed count so callers only ever deal in deltas.

/// Replaying sensor for tests and the CLI
pub mod scripted;

pub use scripted::ScriptedSensor;

use crate::errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Outcome of asking the user for motion permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// Readings may be collected
    Granted,
    /// The user refused
    Denied,
    /// The user has not answered yet
    Undetermined,
}

impl PermissionStatus {
    /// Whether readings may be collected
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// One pedometer callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReading {
    /// Steps counted since the subscription started
    pub cumulative_steps: u64,
    /// When the platform delivered the reading
    pub observed_at: DateTime<Utc>,
}

impl StepReading {
    /// Reading observed now
    #[must_use]
    pub fn now(cumulative_steps: u64) -> Self {
        Self {
            cumulative_steps,
            observed_at: Utc::now(),
        }
    }
}

/// Platform step counter
#[async_trait]
pub trait StepSensor: Send + Sync {
    /// Whether the device has a usable pedometer
    async fn is_available(&self) -> bool;

    /// Ask for motion permission
    ///
    /// # Errors
    ///
    /// Returns a sensor error if the platform cannot be queried.
    async fn request_permission(&self) -> AppResult<PermissionStatus>;

    /// Start receiving cumulative step counts
    ///
    /// # Errors
    ///
    /// Returns a sensor-unavailable error if no pedometer is present.
    async fn watch_step_count(&self) -> AppResult<SensorSubscription>;
}

/// Live stream of readings from one subscription
pub struct SensorSubscription {
    readings: mpsc::Receiver<StepReading>,
    feeder: Option<JoinHandle<()>>,
}

impl SensorSubscription {
    /// Wrap a reading channel
    #[must_use]
    pub const fn new(readings: mpsc::Receiver<StepReading>) -> Self {
        Self {
            readings,
            feeder: None,
        }
    }

    /// Wrap a reading channel fed by a background task that is stopped on
    /// [`SensorSubscription::remove`]
    #[must_use]
    pub const fn with_feeder(readings: mpsc::Receiver<StepReading>, feeder: JoinHandle<()>) -> Self {
        Self {
            readings,
            feeder: Some(feeder),
        }
    }

    /// Next reading, or `None` once the subscription has ended
    pub async fn next(&mut self) -> Option<StepReading> {
        self.readings.recv().await
    }

    /// Stop delivery; readings already queued are dropped
    pub fn remove(&mut self) {
        self.readings.close();
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
        while self.readings.try_recv().is_ok() {}
    }
}

impl Drop for SensorSubscription {
    fn drop(&mut self) {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
    }
}

/// Converts cumulative sensor counts into deltas
///
/// The baseline is zero at subscription start. A reading below the previous
/// one means the platform restarted its counter, so the reading itself is the
/// delta and becomes the new baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CumulativeTracker {
    last_observed: u64,
}

impl CumulativeTracker {
    /// Tracker at the start of a subscription
    #[must_use]
    pub const fn new() -> Self {
        Self { last_observed: 0 }
    }

    /// Forget the baseline for a new subscription
    pub fn reset(&mut self) {
        self.last_observed = 0;
    }

    /// Last cumulative count seen
    #[must_use]
    pub const fn last_observed(&self) -> u64 {
        self.last_observed
    }

    /// Record `cumulative` and return the steps taken since the previous reading
    pub fn observe(&mut self, cumulative: u64) -> u64 {
        let delta = if cumulative >= self.last_observed {
            cumulative - self.last_observed
        } else {
            warn!(
                previous = self.last_observed,
                reading = cumulative,
                "step counter went backwards, treating as sensor restart"
            );
            cumulative
        };
        self.last_observed = cumulative;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deltas_sum_to_last_reading() {
        let mut tracker = CumulativeTracker::new();
        let deltas: Vec<u64> = [0, 5, 5, 12, 40].iter().map(|r| tracker.observe(*r)).collect();
        assert_eq!(deltas, vec![0, 5, 0, 7, 28]);
        assert_eq!(deltas.iter().sum::<u64>(), 40);
    }

    #[test]
    fn test_counter_restart_counts_reading_as_delta() {
        let mut tracker = CumulativeTracker::new();
        assert_eq!(tracker.observe(100), 100);
        assert_eq!(tracker.observe(30), 30);
        assert_eq!(tracker.observe(45), 15);
        assert_eq!(tracker.last_observed(), 45);
    }

    #[test]
    fn test_reset_restores_zero_baseline() {
        let mut tracker = CumulativeTracker::new();
        tracker.observe(250);
        tracker.reset();
        assert_eq!(tracker.observe(20), 20);
    }
}
