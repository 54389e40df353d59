// ABOUTME: Core types and constants for the Stride step tracker
// ABOUTME: Foundation crate with error handling, constants, domain models, and calorie math
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Stride Core
//!
//! Foundation crate providing shared types for the Stride step tracker. It has
//! no async runtime and no storage dependency, so it can be shared by every
//! store backend and by the presentation layer.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Store paths, calorie factor, and history defaults
//! - **models**: `DailyRecord`, `UserProfile`, `DateKey`, and friends
//! - **calories**: Step to calorie conversion

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (daily records, user profiles, date keys)
pub mod models;

/// Step to calorie conversion
pub mod calories;
