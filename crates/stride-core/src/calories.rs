// ABOUTME: Step to calorie conversion used when a daily record is written
// ABOUTME: Linear in steps and body weight; height is required upstream but not used here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::calories::PER_STEP_PER_KG;
use crate::models::CalorieBasis;

/// Calories burned for `steps` at the given body weight (kg)
#[must_use]
pub fn calories_for_steps(steps: u64, weight_kg: f64) -> f64 {
    steps as f64 * weight_kg * PER_STEP_PER_KG
}

/// Calories for `steps` using a profile's calorie basis
#[must_use]
pub fn calories_with_basis(steps: u64, basis: &CalorieBasis) -> f64 {
    calories_for_steps(steps, basis.weight_kg)
}
