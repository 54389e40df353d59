// ABOUTME: Home screen view-model combining today's totals, goal progress, and recent history
// ABOUTME: History read failures degrade to an empty week instead of failing the snapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::aggregator::{chronological, StepAggregator};
use crate::clock::Clock;
use crate::config::HistoryDays;
use crate::constants::records::CHART_LABEL_FORMAT;
use crate::errors::AppResult;
use crate::models::{DailyRecord, DateKey, StepTotals};
use crate::profile::ProfileService;
use crate::store::{KeyedStore, StorePath};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Everything the home screen renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Accounting date of `today`
    pub date: DateKey,
    /// Stored totals for today
    pub today: StepTotals,
    /// Profile step goal, if one is set
    pub step_goal: Option<u64>,
    /// Progress ring fill in `[0, 1]`
    pub progress: f64,
    /// Recent days, most recent first
    pub week: Vec<DailyRecord>,
    /// Recent days, oldest first
    pub chart: ChartSeries,
}

/// Parallel series for the weekly trend chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// `MM-DD` labels
    pub labels: Vec<String>,
    /// Steps per day
    pub steps: Vec<u64>,
    /// Calories per day
    pub calories: Vec<f64>,
}

impl ChartSeries {
    /// Build the series from records in chronological order
    #[must_use]
    pub fn from_records(records: &[DailyRecord]) -> Self {
        Self {
            labels: records
                .iter()
                .map(|r| r.date.format_with(CHART_LABEL_FORMAT))
                .collect(),
            steps: records.iter().map(|r| r.steps).collect(),
            calories: records.iter().map(|r| r.calories).collect(),
        }
    }
}

/// Progress ring fraction; zero without a goal
#[must_use]
pub fn goal_progress(steps: u64, step_goal: Option<u64>) -> f64 {
    match step_goal {
        Some(goal) if goal > 0 => (steps as f64 / goal as f64).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Builds dashboard snapshots
pub struct DashboardService {
    store: Arc<dyn KeyedStore>,
    clock: Arc<dyn Clock>,
    aggregator: StepAggregator,
    profiles: ProfileService,
    history_days: HistoryDays,
}

impl DashboardService {
    /// Create a dashboard service
    #[must_use]
    pub fn new(store: Arc<dyn KeyedStore>, clock: Arc<dyn Clock>, history_days: HistoryDays) -> Self {
        Self {
            aggregator: StepAggregator::new(Arc::clone(&store)),
            profiles: ProfileService::new(Arc::clone(&store)),
            store,
            clock,
            history_days,
        }
    }

    /// Current view for `user_id`
    ///
    /// # Errors
    ///
    /// Returns a storage error if today's record or the profile cannot be read.
    /// A failing history read only empties the week.
    pub async fn snapshot(&self, user_id: &str) -> AppResult<DashboardSnapshot> {
        let date = self.clock.current_period();
        let today = self
            .store
            .get(&StorePath::daily_record(user_id, date)?)
            .await?
            .map_or(StepTotals::ZERO, |value| StepTotals::from_stored(&value));
        let step_goal = self
            .profiles
            .fetch(user_id)
            .await?
            .and_then(|profile| profile.effective_step_goal());

        let week = match self
            .aggregator
            .last_n_days(user_id, self.history_days.get())
            .await
        {
            Ok(week) => week,
            Err(e) => {
                warn!(user.id = %user_id, error = %e, "history unavailable, showing empty week");
                Vec::new()
            }
        };
        let chart = ChartSeries::from_records(&chronological(week.clone()));

        Ok(DashboardSnapshot {
            date,
            today,
            step_goal,
            progress: goal_progress(today.steps, step_goal),
            week,
            chart,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_clamped() {
        assert!((goal_progress(5000, Some(10_000)) - 0.5).abs() < f64::EPSILON);
        assert!((goal_progress(25_000, Some(10_000)) - 1.0).abs() < f64::EPSILON);
        assert!(goal_progress(5000, None).abs() < f64::EPSILON);
        assert!(goal_progress(5000, Some(0)).abs() < f64::EPSILON);
    }
}
