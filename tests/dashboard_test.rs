// ABOUTME: Integration tests for the home screen snapshot
// ABOUTME: Today's totals, goal progress, week list and chart order, degraded history reads
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

mod common;

use anyhow::Result;
use common::{date, init_test_logging, FailingReadStore};
use serde_json::json;
use std::sync::Arc;
use stride_tracker::clock::FixedClock;
use stride_tracker::config::HistoryDays;
use stride_tracker::dashboard::DashboardService;
use stride_tracker::store::memory::InMemoryStore;
use stride_tracker::store::StorePath;

const USER: &str = "u1";

fn seeded_store() -> Arc<InMemoryStore> {
    init_test_logging();
    Arc::new(InMemoryStore::with_data(json!({
        "users": {"u1": {"weight": "70", "height": "172", "stepGoal": "8000"}},
        "steps": {"u1": {
            "2024-04-28": {"steps": 1000, "calories": 35},
            "2024-04-30": {"steps": 3000, "calories": 105},
            "2024-05-01": {"steps": 5000, "calories": 175},
            "2024-05-03": {"steps": 6000, "calories": 210}
        }}
    })))
}

#[tokio::test]
async fn test_snapshot_combines_today_goal_and_week() -> Result<()> {
    let clock = Arc::new(FixedClock::new(date("2024-05-03")));
    let service = DashboardService::new(seeded_store(), clock, HistoryDays::new(3)?);

    let snapshot = service.snapshot(USER).await?;

    assert_eq!(snapshot.date.to_string(), "2024-05-03");
    assert_eq!(snapshot.today.steps, 6000);
    assert_eq!(snapshot.step_goal, Some(8000));
    assert!((snapshot.progress - 0.75).abs() < f64::EPSILON);

    let week: Vec<String> = snapshot.week.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(week, vec!["2024-05-03", "2024-05-01", "2024-04-30"]);

    assert_eq!(snapshot.chart.labels, vec!["04-30", "05-01", "05-03"]);
    assert_eq!(snapshot.chart.steps, vec![3000, 5000, 6000]);
    assert_eq!(snapshot.chart.calories.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_new_day_shows_zero_until_first_write() -> Result<()> {
    let clock = Arc::new(FixedClock::new(date("2024-05-04")));
    let service = DashboardService::new(seeded_store(), clock, HistoryDays::default());

    let snapshot = service.snapshot(USER).await?;

    assert_eq!(snapshot.today.steps, 0);
    assert!(snapshot.progress.abs() < f64::EPSILON);
    assert_eq!(snapshot.week.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_progress_caps_at_full_ring() -> Result<()> {
    let store = seeded_store();
    let clock = Arc::new(FixedClock::new(date("2024-05-01")));
    let service = DashboardService::new(store, clock, HistoryDays::default());

    // 5000 of 8000 on 2024-05-01
    let partial = service.snapshot(USER).await?;
    assert!((partial.progress - 0.625).abs() < f64::EPSILON);

    let clock = Arc::new(FixedClock::new(date("2024-05-03")));
    let store = Arc::new(InMemoryStore::with_data(json!({
        "users": {"u1": {"weight": 70, "height": 172, "stepGoal": 1000}},
        "steps": {"u1": {"2024-05-03": {"steps": 2500}}}
    })));
    let full = DashboardService::new(store, clock, HistoryDays::default())
        .snapshot(USER)
        .await?;
    assert!((full.progress - 1.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_history_outage_degrades_to_empty_week() -> Result<()> {
    let store = Arc::new(FailingReadStore::new(
        seeded_store(),
        StorePath::user_steps(USER)?,
    ));
    let clock = Arc::new(FixedClock::new(date("2024-05-03")));
    let service = DashboardService::new(store, clock, HistoryDays::default());

    let snapshot = service.snapshot(USER).await?;

    assert_eq!(snapshot.today.steps, 6000);
    assert!(snapshot.week.is_empty());
    assert!(snapshot.chart.labels.is_empty());
    Ok(())
}
