// ABOUTME: Wires a step sensor subscription to an accumulator on a background task
// ABOUTME: Permission gate, mirror sync, sequential reading processing, and live totals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tracking Session
//!
//! One session per sensor subscription. Readings are applied strictly in the
//! order the sensor delivers them; a failing reading is logged by the
//! accumulator and the session moves on to the next one.

use crate::accumulator::{GoalReached, StepAccumulator};
use crate::errors::{AppError, AppResult};
use crate::models::StepTotals;
use crate::sensor::StepSensor;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Session entry point
pub struct TrackingSession;

impl TrackingSession {
    /// Ask for permission, subscribe, and start applying readings for `user_id`
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` when the user refuses (or has not answered)
    /// - `SensorUnavailable` when the device has no pedometer
    pub async fn start(
        sensor: &dyn StepSensor,
        mut accumulator: StepAccumulator,
        user_id: impl Into<String>,
    ) -> AppResult<SessionHandle> {
        let user_id = user_id.into();

        let permission = sensor.request_permission().await?;
        if !permission.is_granted() {
            warn!(user.id = %user_id, ?permission, "step tracking blocked");
            return Err(AppError::permission_denied(format!(
                "motion permission is {permission:?}; step tracking needs it granted"
            )));
        }

        let mut subscription = sensor.watch_step_count().await?;
        accumulator.begin_subscription();

        let initial = match accumulator.sync_today(&user_id).await {
            Ok(totals) => totals,
            Err(e) => {
                warn!(user.id = %user_id, error = %e, "could not load today's record, starting from zero");
                StepTotals::ZERO
            }
        };

        let (totals_tx, totals_rx) = watch::channel(initial);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let goal_events = accumulator.subscribe_goal_events();
        info!(user.id = %user_id, steps = initial.steps, "step tracking started");

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => {
                        subscription.remove();
                        debug!(user.id = %user_id, "step subscription removed");
                        break;
                    }
                    reading = subscription.next() => {
                        let Some(reading) = reading else {
                            debug!(user.id = %user_id, "step sensor stream ended");
                            break;
                        };
                        // Failures are logged by the accumulator; next reading is a fresh attempt
                        if let Ok(totals) = accumulator.apply(&user_id, reading.cumulative_steps).await {
                            totals_tx.send_replace(totals);
                        }
                    }
                }
            }
            accumulator
        });

        Ok(SessionHandle {
            task,
            stop: stop_tx,
            totals: totals_rx,
            goal_events: Some(goal_events),
        })
    }
}

/// Running session; dropping it stops tracking
pub struct SessionHandle {
    task: JoinHandle<StepAccumulator>,
    stop: oneshot::Sender<()>,
    totals: watch::Receiver<StepTotals>,
    goal_events: Option<broadcast::Receiver<GoalReached>>,
}

impl SessionHandle {
    /// Latest totals written by this session
    #[must_use]
    pub fn current(&self) -> StepTotals {
        *self.totals.borrow()
    }

    /// Receiver notified after every successful write
    #[must_use]
    pub fn totals(&self) -> watch::Receiver<StepTotals> {
        self.totals.clone()
    }

    /// Goal-reached notifications from this session, starting at `start`
    ///
    /// The receiver is handed out once; later calls return `None`.
    #[must_use]
    pub fn goal_events(&mut self) -> Option<broadcast::Receiver<GoalReached>> {
        self.goal_events.take()
    }

    /// Remove the sensor subscription and hand the accumulator back
    ///
    /// # Errors
    ///
    /// Returns an internal error if the session task panicked.
    pub async fn stop(self) -> AppResult<StepAccumulator> {
        // The task may already have finished on its own
        let _ = self.stop.send(());
        self.task
            .await
            .map_err(|e| AppError::internal(format!("tracking session task failed: {e}")))
    }

    /// Wait for the sensor stream to end on its own
    ///
    /// # Errors
    ///
    /// Returns an internal error if the session task panicked.
    pub async fn finished(self) -> AppResult<StepAccumulator> {
        let Self { task, stop, .. } = self;
        let result = task
            .await
            .map_err(|e| AppError::internal(format!("tracking session task failed: {e}")));
        drop(stop);
        result
    }
}
