// ABOUTME: Domain models for the Stride step tracker
// ABOUTME: Re-exports date keys, daily records, step totals, and user profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Daily record and step totals
pub mod daily_record;
/// Canonical `yyyy-MM-dd` date key
pub mod date_key;
/// Lenient numeric decoding helpers
pub mod lenient;
/// User profile and profile updates
pub mod profile;

pub use daily_record::{DailyRecord, StepTotals};
pub use date_key::DateKey;
pub use profile::{CalorieBasis, ProfileUpdate, UserProfile};
