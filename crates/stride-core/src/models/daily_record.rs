// ABOUTME: Daily step/calorie record and the totals written for one calendar date
// ABOUTME: Decoding is forgiving: partial writes read back with missing fields as zero
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{lenient, DateKey};
use crate::constants::records::{CALORIES_FIELD, STEPS_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Running totals for one date as stored at `steps/{user_id}/{date}`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StepTotals {
    /// Steps accumulated so far
    pub steps: u64,
    /// Calories derived from `steps` at the weight in effect when last written
    pub calories: f64,
}

impl StepTotals {
    /// Totals for a date with no record yet
    pub const ZERO: Self = Self {
        steps: 0,
        calories: 0.0,
    };

    /// Decode a stored record body, coercing missing or malformed fields to zero
    #[must_use]
    pub fn from_stored(value: &Value) -> Self {
        let field = |name: &str| value.get(name);
        Self {
            steps: field(STEPS_FIELD).and_then(lenient::as_u64).unwrap_or(0),
            calories: field(CALORIES_FIELD)
                .and_then(lenient::as_f64)
                .filter(|c| *c >= 0.0)
                .unwrap_or(0.0),
        }
    }

    /// Partial document merged into the stored record
    #[must_use]
    pub fn to_partial(&self) -> Map<String, Value> {
        let mut partial = Map::new();
        partial.insert(STEPS_FIELD.to_owned(), Value::from(self.steps));
        partial.insert(CALORIES_FIELD.to_owned(), Value::from(self.calories));
        partial
    }
}

/// One user's activity for one calendar date
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use stride_core::models::DailyRecord;
///
/// let record = DailyRecord::from_stored("2024-05-01".parse().unwrap(), &json!({"steps": 5000}));
/// assert_eq!(record.steps, 5000);
/// assert_eq!(record.calories, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Device-local calendar date of the record
    pub date: DateKey,
    /// Step total for the date
    pub steps: u64,
    /// Calorie total for the date
    pub calories: f64,
}

impl DailyRecord {
    /// Build from a date and its totals
    #[must_use]
    pub const fn new(date: DateKey, totals: StepTotals) -> Self {
        Self {
            date,
            steps: totals.steps,
            calories: totals.calories,
        }
    }

    /// Decode a stored record body for `date`
    #[must_use]
    pub fn from_stored(date: DateKey, value: &Value) -> Self {
        Self::new(date, StepTotals::from_stored(value))
    }

    /// Totals without the date
    #[must_use]
    pub const fn totals(&self) -> StepTotals {
        StepTotals {
            steps: self.steps,
            calories: self.calories,
        }
    }
}
