// ABOUTME: Main library entry point for the Stride step tracker
// ABOUTME: Sensor-driven daily step accumulation, history aggregation, and profile access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Stride Tracker
//!
//! Turns a pedometer's cumulative step count into per-day step and calorie
//! records in a realtime-database style keyed store, and reads them back as a
//! recent-history view.
//!
//! ## Architecture
//!
//! - **Store**: `KeyedStore` trait with in-memory and `SQLite` backends
//! - **Sensor**: permission and cumulative-count subscription abstraction
//! - **Accumulator**: converts sensor readings into daily record updates
//! - **Aggregator**: last-N-days history over the stored records
//! - **Dashboard / Profile / Session**: home screen and profile screen logic
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stride_tracker::accumulator::StepAccumulator;
//! use stride_tracker::clock::SystemClock;
//! use stride_tracker::config::TrackerConfig;
//! use stride_tracker::errors::AppResult;
//! use stride_tracker::store::factory;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = TrackerConfig::from_env()?;
//!     let store = factory::connect(&config.store).await?;
//!     let mut accumulator =
//!         StepAccumulator::new(store, Arc::new(SystemClock), config.accumulator);
//!
//!     accumulator.begin_subscription();
//!     let totals = accumulator.apply("user-1", 120).await?;
//!     println!("{} steps, {:.2} kcal", totals.steps, totals.calories);
//!     Ok(())
//! }
//! ```

pub use stride_core::{calories, constants, errors, models};

/// Sensor reading to daily record updates
pub mod accumulator;

/// Recent-history views over stored daily records
pub mod aggregator;

/// Local calendar date source
pub mod clock;

/// Environment-based configuration
pub mod config;

/// Home screen view-model
pub mod dashboard;

/// Structured logging setup
pub mod logging;

/// Profile reads, writes, and live updates
pub mod profile;

/// Step sensor abstraction
pub mod sensor;

/// Sensor subscription wired to an accumulator
pub mod session;

/// Keyed store abstraction and backends
pub mod store;
