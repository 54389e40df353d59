// ABOUTME: Step sensor that replays a fixed list of cumulative readings
// ABOUTME: Used by integration tests and the CLI `record` command in place of a pedometer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{PermissionStatus, SensorSubscription, StepReading, StepSensor};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Readings buffered ahead of the consumer
const READING_BUFFER: usize = 64;

/// Replaying sensor
///
/// Every call to [`StepSensor::watch_step_count`] starts a new subscription
/// that replays the script from the beginning, then ends.
///
/// # Examples
///
/// ```rust,no_run
/// use stride_tracker::sensor::{ScriptedSensor, StepSensor};
/// # async fn example() -> stride_tracker::errors::AppResult<()> {
/// let sensor = ScriptedSensor::new(vec![10, 25, 40]);
/// let mut subscription = sensor.watch_step_count().await?;
/// while let Some(reading) = subscription.next().await {
///     println!("{}", reading.cumulative_steps);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedSensor {
    readings: Vec<u64>,
    permission: PermissionStatus,
    available: bool,
    interval: Option<Duration>,
}

impl ScriptedSensor {
    /// Sensor granting permission and replaying `readings` back to back
    #[must_use]
    pub const fn new(readings: Vec<u64>) -> Self {
        Self {
            readings,
            permission: PermissionStatus::Granted,
            available: true,
            interval: None,
        }
    }

    /// Answer permission requests with `permission`
    #[must_use]
    pub const fn with_permission(mut self, permission: PermissionStatus) -> Self {
        self.permission = permission;
        self
    }

    /// Pause between readings
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Device without a pedometer
    #[must_use]
    pub const fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

#[async_trait]
impl StepSensor for ScriptedSensor {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn request_permission(&self) -> AppResult<PermissionStatus> {
        Ok(self.permission)
    }

    async fn watch_step_count(&self) -> AppResult<SensorSubscription> {
        if !self.available {
            return Err(AppError::sensor_unavailable(
                "no step counter on this device",
            ));
        }

        let (tx, rx) = mpsc::channel(READING_BUFFER);
        let readings = self.readings.clone();
        let interval = self.interval;
        let feeder = tokio::spawn(async move {
            for (index, cumulative) in readings.into_iter().enumerate() {
                if index > 0 {
                    if let Some(pause) = interval {
                        tokio::time::sleep(pause).await;
                    }
                }
                if tx.send(StepReading::now(cumulative)).await.is_err() {
                    debug!("scripted sensor subscription removed");
                    return;
                }
            }
        });
        Ok(SensorSubscription::with_feeder(rx, feeder))
    }
}
