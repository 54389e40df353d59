// ABOUTME: User profile stored at `users/{user_id}` and the partial update applied to it
// ABOUTME: Numeric fields tolerate string values written by form-based clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::lenient;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user's static attributes
///
/// Owned by the user; the step accumulator only reads it to convert steps into
/// calories. Field names match the stored camelCase document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Height in centimeters
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<f64>,
    /// Weight in kilograms
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
    /// Daily step goal
    #[serde(
        default,
        deserialize_with = "lenient::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub step_goal: Option<u64>,
    /// Target weight in kilograms
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight_goal: Option<f64>,
}

/// Body measurements needed before any calorie value can be written
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalorieBasis {
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Height in centimeters
    pub height_cm: f64,
}

impl UserProfile {
    /// Decode a stored profile document
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the document is not an object.
    pub fn from_stored(value: Value) -> AppResult<Self> {
        if !value.is_object() {
            return Err(AppError::serialization(
                "stored profile is not a JSON object",
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Weight and height, when both are present and positive
    ///
    /// A zero or blank measurement counts as missing: the profile form stores
    /// empty strings until the user fills it in.
    ///
    /// # Errors
    ///
    /// Returns a missing-profile error naming the absent field.
    pub fn calorie_basis(&self, user_id: &str) -> AppResult<CalorieBasis> {
        let weight_kg = positive(self.weight)
            .ok_or_else(|| AppError::missing_profile(user_id, "weight is not set"))?;
        let height_cm = positive(self.height)
            .ok_or_else(|| AppError::missing_profile(user_id, "height is not set"))?;
        Ok(CalorieBasis {
            weight_kg,
            height_cm,
        })
    }

    /// Step goal, ignoring a zero goal
    #[must_use]
    pub fn effective_step_goal(&self) -> Option<u64> {
        self.step_goal.filter(|goal| *goal > 0)
    }

    /// Check that every provided measurement is finite and positive
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error naming the first bad field.
    pub fn validate(&self) -> AppResult<()> {
        check_measurement("height", self.height)?;
        check_measurement("weight", self.weight)?;
        check_measurement("weightGoal", self.weight_goal)?;
        if self.step_goal == Some(0) {
            return Err(AppError::invalid_input("stepGoal must be positive"));
        }
        Ok(())
    }
}

/// Partial profile edit; `None` fields are left untouched in the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New height (cm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New weight (kg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// New daily step goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_goal: Option<u64>,
    /// New weight goal (kg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_goal: Option<f64>,
}

impl ProfileUpdate {
    /// True when nothing would be written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields to merge into the stored profile
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for non-positive measurements.
    pub fn to_partial(&self) -> AppResult<Map<String, Value>> {
        check_measurement("height", self.height)?;
        check_measurement("weight", self.weight)?;
        check_measurement("weightGoal", self.weight_goal)?;
        if self.step_goal == Some(0) {
            return Err(AppError::invalid_input("stepGoal must be positive"));
        }
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::internal("profile update did not serialize to an object")),
        }
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn check_measurement(field: &str, value: Option<f64>) -> AppResult<()> {
    match value {
        Some(v) if positive(Some(v)).is_none() => Err(AppError::invalid_input(format!(
            "{field} must be a positive number, got {v}"
        ))),
        _ => Ok(()),
    }
}
