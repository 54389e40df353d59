// ABOUTME: Calendar date key used to address daily records (`yyyy-MM-dd`)
// ABOUTME: Canonical formatting keeps lexicographic key order equal to date order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::records::DATE_FORMAT;
use crate::errors::AppError;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A device-local calendar date in canonical `yyyy-MM-dd` form
///
/// Ordering follows the calendar, which for canonical keys is the same as the
/// lexicographic order of the stored key strings.
///
/// # Examples
///
/// ```rust
/// use stride_core::models::DateKey;
///
/// let key: DateKey = "2024-05-03".parse().unwrap();
/// assert_eq!(key.to_string(), "2024-05-03");
/// assert!("2024-5-3".parse::<DateKey>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wrap a calendar date
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Underlying calendar date
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// Format with an arbitrary `chrono` pattern (chart labels)
    #[must_use]
    pub fn format_with(&self, pattern: &str) -> String {
        self.0.format(pattern).to_string()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map_err(|e| AppError::invalid_input(format!("invalid date key '{s}': {e}")))?;
        let key = Self(date);
        // chrono accepts unpadded fields; only canonical keys sort correctly
        if key.to_string() != s {
            return Err(AppError::invalid_input(format!(
                "date key '{s}' is not in canonical yyyy-MM-dd form"
            )));
        }
        Ok(key)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_string_order_matches_date_order() {
        let mut keys = ["2024-12-31", "2024-05-03", "2025-01-01", "2024-05-01"];
        let mut dates: Vec<DateKey> = keys.iter().map(|k| k.parse().unwrap()).collect();
        keys.sort_unstable();
        dates.sort();
        let rendered: Vec<String> = dates.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, keys);
    }

    #[test]
    fn test_rejects_non_canonical_keys() {
        assert!("2024-5-01".parse::<DateKey>().is_err());
        assert!("2024-05-01T00:00:00Z".parse::<DateKey>().is_err());
        assert!("yesterday".parse::<DateKey>().is_err());
    }

    #[test]
    fn test_serde_uses_key_form() {
        let key: DateKey = "2024-02-29".parse().unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2024-02-29\"");
        let back: DateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
