// ABOUTME: Validated `/`-separated store paths and the tracker's path layout
// ABOUTME: Enforces realtime-database key rules so user ids cannot escape their subtree
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::paths::{FORBIDDEN_KEY_CHARS, SEPARATOR, STEPS_ROOT, USERS_ROOT};
use crate::errors::{AppError, AppResult};
use crate::models::DateKey;
use std::fmt;

/// A non-empty path of validated key segments
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// Parse `a/b/c`; leading and trailing separators are ignored
    ///
    /// # Errors
    ///
    /// Returns an invalid-path error for empty paths, empty segments, or
    /// segments containing forbidden characters.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim_matches(SEPARATOR);
        if trimmed.is_empty() {
            return Err(AppError::invalid_path("store path is empty"));
        }
        let segments = trimmed
            .split(SEPARATOR)
            .map(|segment| validate_segment(segment).map(|()| segment.to_owned()))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    /// `users/{user_id}`
    ///
    /// # Errors
    ///
    /// Returns an invalid-path error if `user_id` is not a valid key.
    pub fn user_profile(user_id: &str) -> AppResult<Self> {
        Self::from_segments([USERS_ROOT, user_id])
    }

    /// `steps/{user_id}`
    ///
    /// # Errors
    ///
    /// Returns an invalid-path error if `user_id` is not a valid key.
    pub fn user_steps(user_id: &str) -> AppResult<Self> {
        Self::from_segments([STEPS_ROOT, user_id])
    }

    /// `steps/{user_id}/{date}`
    ///
    /// # Errors
    ///
    /// Returns an invalid-path error if `user_id` is not a valid key.
    pub fn daily_record(user_id: &str, date: DateKey) -> AppResult<Self> {
        Self::user_steps(user_id)?.child(&date.to_string())
    }

    /// Append one segment
    ///
    /// # Errors
    ///
    /// Returns an invalid-path error if `segment` is not a valid key.
    pub fn child(&self, segment: &str) -> AppResult<Self> {
        validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_owned());
        Ok(Self { segments })
    }

    fn from_segments<const N: usize>(parts: [&str; N]) -> AppResult<Self> {
        for part in parts {
            validate_segment(part)?;
        }
        Ok(Self {
            segments: parts.iter().map(|p| (*p).to_owned()).collect(),
        })
    }

    /// Path segments in order
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment
    #[must_use]
    pub fn key(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// True if `self` equals `other` or is one of its ancestors
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// True when a write at one path changes what a read at the other returns
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.contains(other) || other.contains(self)
    }

    /// Proper ancestors, shortest first
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        (1..self.segments.len())
            .map(|len| Self {
                segments: self.segments[..len].to_vec(),
            })
            .collect()
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

fn validate_segment(segment: &str) -> AppResult<()> {
    if segment.is_empty() {
        return Err(AppError::invalid_path("store path segment is empty"));
    }
    if let Some(bad) = segment
        .chars()
        .find(|c| FORBIDDEN_KEY_CHARS.contains(c) || c.is_control())
    {
        return Err(AppError::invalid_path(format!(
            "store key '{segment}' contains forbidden character {bad:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_daily_record_layout() {
        let date: DateKey = "2024-05-03".parse().unwrap();
        let path = StorePath::daily_record("user_2abc", date).unwrap();
        assert_eq!(path.to_string(), "steps/user_2abc/2024-05-03");
        assert_eq!(path.key(), "2024-05-03");
    }

    #[test]
    fn test_user_ids_cannot_escape() {
        for bad in ["", "a/b", "a.b", "$x", "x#", "[0]", "tab\t"] {
            let err = StorePath::user_profile(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidPath, "{bad:?}");
        }
    }

    #[test]
    fn test_overlap_is_symmetric_prefix_relation() {
        let parent = StorePath::parse("steps/u1").unwrap();
        let child = StorePath::parse("steps/u1/2024-05-01").unwrap();
        let sibling = StorePath::parse("steps/u10").unwrap();
        assert!(parent.contains(&child));
        assert!(!child.contains(&parent));
        assert!(parent.overlaps(&child) && child.overlaps(&parent));
        assert!(!parent.overlaps(&sibling));
    }

    #[test]
    fn test_parse_trims_separators() {
        let path = StorePath::parse("/users/u1/").unwrap();
        assert_eq!(path.segments(), ["users", "u1"]);
        assert_eq!(path.ancestors(), vec![StorePath::parse("users").unwrap()]);
        assert!(StorePath::parse("users//u1").is_err());
        assert!(StorePath::parse("/").is_err());
    }
}
