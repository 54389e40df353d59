// ABOUTME: Lenient numeric decoding for values written by loosely typed clients
// ABOUTME: Accepts JSON numbers or numeric strings; anything else decodes as absent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a finite `f64` from a number or a numeric string
#[must_use]
pub fn as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Read a non-negative integer count; fractional values are truncated
#[must_use]
pub fn as_u64(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    as_f64(value)
        .filter(|v| *v >= 0.0)
        .map(|v| v.trunc() as u64)
}

/// `deserialize_with` helper for optional lenient floats
///
/// # Errors
///
/// Only fails when the underlying deserializer cannot produce a JSON value.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(as_f64))
}

/// `deserialize_with` helper for optional lenient counts
///
/// # Errors
///
/// Only fails when the underlying deserializer cannot produce a JSON value.
pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(as_u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_strings_are_accepted() {
        assert_eq!(as_f64(&json!("72.5")), Some(72.5));
        assert_eq!(as_f64(&json!(" 80 ")), Some(80.0));
        assert_eq!(as_u64(&json!("10000")), Some(10_000));
    }

    #[test]
    fn test_garbage_is_absent() {
        assert_eq!(as_f64(&json!("")), None);
        assert_eq!(as_f64(&json!("heavy")), None);
        assert_eq!(as_f64(&json!(null)), None);
        assert_eq!(as_u64(&json!(-4)), None);
        assert_eq!(as_u64(&json!({"steps": 1})), None);
    }

    #[test]
    fn test_fractional_counts_truncate() {
        assert_eq!(as_u64(&json!(41.9)), Some(41));
    }
}
