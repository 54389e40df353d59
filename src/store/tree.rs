// ABOUTME: JSON tree helpers implementing realtime-database write semantics
// ABOUTME: Null and empty objects are absence; writes below a scalar replace it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::StorePath;
use crate::errors::AppResult;
use serde_json::{Map, Value};

/// Check that every object key below `path` is a valid path segment
pub fn validate_keys(path: &StorePath, value: &Value) -> AppResult<()> {
    if let Value::Object(map) = value {
        for (key, child) in map {
            validate_keys(&path.child(key)?, child)?;
        }
    }
    Ok(())
}

/// Strip nulls and empty objects; `None` means the value is absent
pub fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| normalize(v).map(|v| (k, v)))
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                Some(Value::Object(cleaned))
            }
        }
        other => Some(other),
    }
}

/// Borrow the subtree at `segments`
pub fn get_at<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |node, segment| node.as_object()?.get(segment))
}

/// Write `value` at `segments`, creating parents and pruning emptied ones
pub fn set_at(root: &mut Value, segments: &[String], value: Option<Value>) {
    let Some((head, rest)) = segments.split_first() else {
        *root = value.unwrap_or_else(|| Value::Object(Map::new()));
        return;
    };
    if !root.is_object() {
        if value.is_none() {
            return;
        }
        *root = Value::Object(Map::new());
    }
    let Value::Object(map) = root else {
        return;
    };
    if rest.is_empty() {
        match value {
            Some(v) => {
                map.insert(head.clone(), v);
            }
            None => {
                map.remove(head);
            }
        }
        return;
    }
    let child = map
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    set_at(child, rest, value);
    if child.as_object().is_some_and(Map::is_empty) {
        map.remove(head);
    }
}

/// Merge `partial` into the node at `path`, one child at a time
pub fn merge_at(root: &mut Value, path: &StorePath, partial: Map<String, Value>) {
    for (key, value) in partial {
        let mut segments = path.segments().to_vec();
        segments.push(key);
        set_at(root, &segments, normalize(value));
    }
}

/// Flatten a value into `(path, json scalar)` leaves below `prefix`
pub fn flatten(prefix: &StorePath, value: &Value) -> Vec<(String, String)> {
    let mut leaves = Vec::new();
    flatten_into(&prefix.to_string(), value, &mut leaves);
    leaves
}

fn flatten_into(prefix: &str, value: &Value, leaves: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(&format!("{prefix}/{key}"), child, leaves);
            }
        }
        leaf => leaves.push((prefix.to_owned(), leaf.to_string())),
    }
}

/// Rebuild the subtree at `base` from flattened leaves
///
/// Rows must be at or below `base`; unparsable leaves are skipped.
pub fn assemble(base: &StorePath, rows: Vec<(String, Value)>) -> Option<Value> {
    let depth = base.segments().len();
    let mut root = Value::Object(Map::new());
    for (path, leaf) in rows {
        let segments: Vec<String> = path.split('/').skip(depth).map(str::to_owned).collect();
        if segments.is_empty() {
            return normalize(leaf);
        }
        set_at(&mut root, &segments, Some(leaf));
    }
    normalize(root)
}
