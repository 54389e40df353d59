// ABOUTME: Environment-based configuration for the step tracker
// ABOUTME: Store URL, history window, and write concurrency mode with validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-only configuration
//!
//! Every value has a default, so an empty environment yields an in-memory
//! store, a seven day history, and last-writer-wins record updates.

use crate::constants::env_vars;
use crate::constants::records::{DEFAULT_CAS_MAX_ATTEMPTS, DEFAULT_HISTORY_DAYS};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Default store URL
const DEFAULT_STORE_URL: &str = "memory";

/// Default pool size for file-backed sqlite stores
const DEFAULT_SQLITE_MAX_CONNECTIONS: u32 = 4;

/// How the accumulator writes the day's record back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Read, add, merge-update; concurrent writers can lose an increment
    #[default]
    LastWriterWins,
    /// Optimistic compare-and-set with re-read on conflict
    CompareAndSwap {
        /// Attempts before reporting a write conflict
        max_attempts: u32,
    },
}

impl WriteMode {
    /// Parse a mode name, taking the attempt budget for compare-and-swap
    ///
    /// # Errors
    ///
    /// Returns a config error for unknown names or a zero attempt budget.
    pub fn parse(name: &str, max_attempts: u32) -> AppResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "last-writer-wins" | "lww" => Ok(Self::LastWriterWins),
            "compare-and-swap" | "cas" => {
                if max_attempts == 0 {
                    return Err(AppError::config(
                        "compare-and-swap needs at least one attempt",
                    ));
                }
                Ok(Self::CompareAndSwap { max_attempts })
            }
            other => Err(AppError::config(format!(
                "unknown write mode '{other}' (expected last-writer-wins or compare-and-swap)"
            ))),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastWriterWins => write!(f, "last-writer-wins"),
            Self::CompareAndSwap { max_attempts } => {
                write!(f, "compare-and-swap (max {max_attempts} attempts)")
            }
        }
    }
}

/// Store connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `memory` or a sqlx sqlite URL
    pub url: String,
    /// Pool size for file-backed sqlite stores
    pub sqlite_max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STORE_URL.to_owned(),
            sqlite_max_connections: DEFAULT_SQLITE_MAX_CONNECTIONS,
        }
    }
}

/// Top-level tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    /// Store connection
    pub store: StoreConfig,
    /// Accumulator settings
    pub accumulator: AccumulatorConfig,
    /// Days shown on the dashboard
    pub history_days: HistoryDays,
}

/// Accumulator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AccumulatorConfig {
    /// Record write strategy
    pub write_mode: WriteMode,
}

/// Number of days in the history view (at least one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDays(usize);

impl HistoryDays {
    /// Validate a day count
    ///
    /// # Errors
    ///
    /// Returns a config error for zero.
    pub fn new(days: usize) -> AppResult<Self> {
        if days == 0 {
            return Err(AppError::config("history must cover at least one day"));
        }
        Ok(Self(days))
    }

    /// Day count
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for HistoryDays {
    fn default() -> Self {
        Self(DEFAULT_HISTORY_DAYS)
    }
}

impl TrackerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error if any variable is present but invalid.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns a config error if any variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(env_vars::STORE_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_URL.to_owned());
        let sqlite_max_connections = parse_var(
            &lookup,
            env_vars::SQLITE_MAX_CONNECTIONS,
            DEFAULT_SQLITE_MAX_CONNECTIONS,
        )?;
        let history_days = HistoryDays::new(parse_var(
            &lookup,
            env_vars::HISTORY_DAYS,
            DEFAULT_HISTORY_DAYS,
        )?)?;
        let max_attempts = parse_var(
            &lookup,
            env_vars::CAS_MAX_ATTEMPTS,
            DEFAULT_CAS_MAX_ATTEMPTS,
        )?;
        let write_mode = lookup(env_vars::WRITE_MODE).map_or(Ok(WriteMode::default()), |name| {
            WriteMode::parse(&name, max_attempts)
        })?;

        Ok(Self {
            store: StoreConfig {
                url,
                sqlite_max_connections,
            },
            accumulator: AccumulatorConfig { write_mode },
            history_days,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("{key}='{raw}' is invalid: {e}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = TrackerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.history_days.get(), 7);
        assert_eq!(config.accumulator.write_mode, WriteMode::LastWriterWins);
    }

    #[test]
    fn test_compare_and_swap_mode() {
        let config = TrackerConfig::from_lookup(lookup_from(&[
            ("STRIDE_WRITE_MODE", "compare-and-swap"),
            ("STRIDE_CAS_MAX_ATTEMPTS", "3"),
            ("STRIDE_STORE_URL", "sqlite::memory:"),
        ]))
        .unwrap();
        assert_eq!(
            config.accumulator.write_mode,
            WriteMode::CompareAndSwap { max_attempts: 3 }
        );
        assert_eq!(config.store.url, "sqlite::memory:");
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for pairs in [
            [("STRIDE_HISTORY_DAYS", "0")],
            [("STRIDE_HISTORY_DAYS", "seven")],
            [("STRIDE_WRITE_MODE", "eventually")],
        ] {
            let err = TrackerConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert_eq!(err.code, ErrorCode::ConfigInvalid);
        }

        let err = TrackerConfig::from_lookup(lookup_from(&[
            ("STRIDE_WRITE_MODE", "cas"),
            ("STRIDE_CAS_MAX_ATTEMPTS", "0"),
        ]))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalid);
    }
}
