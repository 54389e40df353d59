// ABOUTME: Profile screen operations over users/{user_id}
// ABOUTME: Fetch, initial setup (full write), partial edit (merge), and live profile snapshots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use crate::models::{ProfileUpdate, UserProfile};
use crate::store::{watch, KeyedStore, StorePath, StoreWatch};
use std::sync::Arc;
use tracing::info;

/// Reads and writes user profiles
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn KeyedStore>,
}

impl ProfileService {
    /// Create a profile service over `store`
    #[must_use]
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    /// Stored profile, `None` before onboarding
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails or a serialization error if the
    /// stored document is not a profile object.
    pub async fn fetch(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        let path = StorePath::user_profile(user_id)?;
        self.store
            .get(&path)
            .await?
            .map(UserProfile::from_stored)
            .transpose()
    }

    /// Initial setup: overwrite the whole profile document
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for non-positive measurements, or a
    /// storage error if the write fails.
    pub async fn create(&self, user_id: &str, profile: &UserProfile) -> AppResult<()> {
        profile.validate()?;
        let path = StorePath::user_profile(user_id)?;
        self.store.set(&path, serde_json::to_value(profile)?).await?;
        info!(user.id = %user_id, "profile created");
        Ok(())
    }

    /// Edit: merge the provided fields, leaving the rest untouched
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for an empty update or non-positive
    /// measurements, or a storage error if the write fails.
    pub async fn update(&self, user_id: &str, update: &ProfileUpdate) -> AppResult<()> {
        if update.is_empty() {
            return Err(AppError::invalid_input("profile update has no fields"));
        }
        let partial = update.to_partial()?;
        let fields: Vec<String> = partial.keys().cloned().collect();
        let path = StorePath::user_profile(user_id)?;
        self.store.update(&path, partial).await?;
        info!(user.id = %user_id, fields = ?fields, "profile updated");
        Ok(())
    }

    /// Live snapshots of the stored profile document
    ///
    /// # Errors
    ///
    /// Returns an invalid-path error for a user id that is not a valid key, or
    /// an unsupported-operation error when the store has no change feed.
    pub fn watch(&self, user_id: &str) -> AppResult<ProfileWatch> {
        let path = StorePath::user_profile(user_id)?;
        Ok(ProfileWatch {
            inner: watch(Arc::clone(&self.store), path)?,
        })
    }
}

/// Stream of decoded profile snapshots
pub struct ProfileWatch {
    inner: StoreWatch,
}

impl ProfileWatch {
    /// Next profile snapshot; `None` once the store stops publishing changes
    pub async fn next(&mut self) -> Option<AppResult<Option<UserProfile>>> {
        let snapshot = self.inner.next().await?;
        Some(snapshot.and_then(|value| value.map(UserProfile::from_stored).transpose()))
    }
}
