// ABOUTME: Unified error type and error codes shared across the Stride crates
// ABOUTME: Maps the tracker failure taxonomy (profile, store, sensor, config) onto AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every fallible operation in the workspace returns [`AppResult`]. Errors carry
//! an [`ErrorCode`] so callers can tell a missing profile (nothing to retry until
//! onboarding completes) from a transient store failure (the next sensor event is
//! a fresh attempt) without matching on message text.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Input & validation (1000-1999)
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 1000,
    #[serde(rename = "INVALID_PATH")]
    InvalidPath = 1001,

    // Profile (2000-2999)
    #[serde(rename = "MISSING_PROFILE")]
    MissingProfile = 2000,

    // Sensor (3000-3999)
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied = 3000,
    #[serde(rename = "SENSOR_UNAVAILABLE")]
    SensorUnavailable = 3001,

    // Store (4000-4999)
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 4000,
    #[serde(rename = "WRITE_CONFLICT")]
    WriteConflict = 4001,
    #[serde(rename = "UNSUPPORTED_OPERATION")]
    UnsupportedOperation = 4002,
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 4003,

    // Configuration (6000-6999)
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6000,

    // Internal (9000-9999)
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidPath => "The store path is invalid",
            Self::MissingProfile => "User profile is missing data required for calorie conversion",
            Self::PermissionDenied => "Step sensor access was denied",
            Self::SensorUnavailable => "Step sensor is not available on this device",
            Self::StorageError => "Store operation failed",
            Self::WriteConflict => "Concurrent writers kept changing the record",
            Self::UnsupportedOperation => "The store does not support this operation",
            Self::SerializationError => "Data serialization/deserialization failed",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
        }
    }

    /// Whether the failure only affects the current tick
    ///
    /// Transient errors degrade to "no update this tick"; the next sensor event is
    /// an independent attempt. Non-transient errors need outside action (onboarding,
    /// a permission grant, a config fix) before anything changes.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StorageError | Self::WriteConflict | Self::SerializationError
        )
    }
}

/// Unified error type for the tracker
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Invalid store path or path segment
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPath, message)
    }

    /// Profile (or one of its calorie fields) is absent
    pub fn missing_profile(user_id: &str, detail: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MissingProfile,
            format!("user {user_id}: {}", detail.into()),
        )
    }

    /// Sensor permission refused
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Sensor hardware or service missing
    pub fn sensor_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SensorUnavailable, message)
    }

    /// Store read/write failure
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Optimistic write lost every attempt
    pub fn write_conflict(path: impl fmt::Display, attempts: u32) -> Self {
        Self::new(
            ErrorCode::WriteConflict,
            format!("{path} changed concurrently on all {attempts} attempts"),
        )
    }

    /// Store lacks a capability
    pub fn unsupported(operation: &str) -> Self {
        Self::new(
            ErrorCode::UnsupportedOperation,
            format!("{operation} is not supported by this store"),
        )
    }

    /// Serialization failure
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ErrorCode::StorageError.is_transient());
        assert!(ErrorCode::WriteConflict.is_transient());
        assert!(!ErrorCode::MissingProfile.is_transient());
        assert!(!ErrorCode::PermissionDenied.is_transient());
    }

    #[test]
    fn test_display_includes_description_and_message() {
        let error = AppError::missing_profile("u1", "weight is not set");
        let rendered = error.to_string();
        assert!(rendered.contains("calorie conversion"));
        assert!(rendered.contains("u1: weight is not set"));
        assert_eq!(error.code, ErrorCode::MissingProfile);
    }

    #[test]
    fn test_serde_json_error_keeps_source() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = AppError::from(parse_error);
        assert_eq!(error.code, ErrorCode::SerializationError);
        assert!(error.source.is_some());
    }
}
