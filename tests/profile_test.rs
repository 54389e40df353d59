// ABOUTME: Integration tests for profile setup, partial edits, and live profile snapshots
// ABOUTME: Form-style string values, validation, and merge semantics over the keyed store
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used)]

mod common;

use anyhow::Result;
use common::{date, init_test_logging, store_with_profile};
use serde_json::json;
use std::sync::Arc;
use stride_tracker::accumulator::StepAccumulator;
use stride_tracker::clock::FixedClock;
use stride_tracker::config::AccumulatorConfig;
use stride_tracker::errors::ErrorCode;
use stride_tracker::models::{ProfileUpdate, UserProfile};
use stride_tracker::profile::ProfileService;
use stride_tracker::store::memory::InMemoryStore;
use stride_tracker::store::{KeyedStore, StorePath};

const USER: &str = "runner";

fn service() -> (Arc<InMemoryStore>, ProfileService) {
    init_test_logging();
    let store = Arc::new(InMemoryStore::new());
    let profiles = ProfileService::new(store.clone());
    (store, profiles)
}

#[tokio::test]
async fn test_fetch_before_onboarding_is_none() -> Result<()> {
    let (_store, profiles) = service();
    assert!(profiles.fetch(USER).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_create_overwrites_whole_document() -> Result<()> {
    let (store, profiles) = service();
    store
        .set(&StorePath::user_profile(USER)?, json!({"legacy": true, "weight": 60}))
        .await?;

    let profile = UserProfile {
        first_name: Some("Kai".to_owned()),
        weight: Some(68.5),
        height: Some(180.0),
        step_goal: Some(9000),
        ..UserProfile::default()
    };
    profiles.create(USER, &profile).await?;

    let stored = store.get(&StorePath::user_profile(USER)?).await?;
    assert_eq!(
        stored,
        Some(json!({"firstName": "Kai", "height": 180.0, "weight": 68.5, "stepGoal": 9000}))
    );
    assert_eq!(profiles.fetch(USER).await?, Some(profile));
    Ok(())
}

#[tokio::test]
async fn test_update_merges_present_fields_only() -> Result<()> {
    let store = store_with_profile(
        USER,
        json!({"firstName": "Kai", "lastName": "Berg", "height": "180", "weight": "68"}),
    )
    .await?;
    let profiles = ProfileService::new(store.clone());

    profiles
        .update(
            USER,
            &ProfileUpdate {
                weight: Some(66.0),
                step_goal: Some(12_000),
                ..ProfileUpdate::default()
            },
        )
        .await?;

    let profile = profiles.fetch(USER).await?.unwrap_or_default();
    assert_eq!(profile.first_name.as_deref(), Some("Kai"));
    assert_eq!(profile.last_name.as_deref(), Some("Berg"));
    assert_eq!(profile.height, Some(180.0));
    assert_eq!(profile.weight, Some(66.0));
    assert_eq!(profile.step_goal, Some(12_000));
    Ok(())
}

#[tokio::test]
async fn test_invalid_edits_are_rejected_before_writing() -> Result<()> {
    let (store, profiles) = service();

    let err = profiles
        .update(USER, &ProfileUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = profiles
        .update(
            USER,
            &ProfileUpdate {
                height: Some(0.0),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = profiles
        .create(
            USER,
            &UserProfile {
                weight: Some(-70.0),
                ..UserProfile::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    assert!(store.get(&StorePath::user_profile(USER)?).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_watch_streams_profile_edits() -> Result<()> {
    let (_store, profiles) = service();
    let mut watcher = profiles.watch(USER)?;

    assert_eq!(watcher.next().await.transpose()?, Some(None));

    profiles
        .create(
            USER,
            &UserProfile {
                weight: Some(70.0),
                height: Some(170.0),
                ..UserProfile::default()
            },
        )
        .await?;
    let first = watcher.next().await.transpose()?.flatten().unwrap_or_default();
    assert_eq!(first.weight, Some(70.0));

    profiles
        .update(
            USER,
            &ProfileUpdate {
                weight: Some(71.0),
                ..ProfileUpdate::default()
            },
        )
        .await?;
    let second = watcher.next().await.transpose()?.flatten().unwrap_or_default();
    assert_eq!(second.weight, Some(71.0));
    assert_eq!(second.height, Some(170.0));
    Ok(())
}

#[tokio::test]
async fn test_profile_edit_changes_next_calorie_write() -> Result<()> {
    let (store, profiles) = service();
    profiles
        .create(
            USER,
            &UserProfile {
                weight: Some(70.0),
                height: Some(170.0),
                ..UserProfile::default()
            },
        )
        .await?;
    let accumulator = StepAccumulator::new(
        store,
        Arc::new(FixedClock::new(date("2024-05-01"))),
        AccumulatorConfig::default(),
    );

    let before = accumulator.apply_delta(USER, 1000).await?;
    profiles
        .update(
            USER,
            &ProfileUpdate {
                weight: Some(90.0),
                ..ProfileUpdate::default()
            },
        )
        .await?;
    let after = accumulator.apply_delta(USER, 0).await?;

    assert!((before.calories - 35.0).abs() < 1e-9);
    assert!((after.calories - 45.0).abs() < 1e-9);
    Ok(())
}
