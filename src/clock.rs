// ABOUTME: Clock abstraction that resolves the device-local accounting date
// ABOUTME: System clock for production, settable clock for tests and replays
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::DateKey;
use chrono::{Datelike, Days, Local, NaiveDate};
use std::sync::atomic::{AtomicI32, Ordering};

/// Source of the current local calendar date
pub trait Clock: Send + Sync {
    /// Today's date in the device's local timezone
    fn today(&self) -> NaiveDate;

    /// Today's accounting period as a record key
    fn current_period(&self) -> DateKey {
        DateKey::new(self.today())
    }
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock
///
/// Stores the date as days since the common era so it can be moved from any
/// thread while the accumulator holds a shared reference.
#[derive(Debug)]
pub struct FixedClock {
    days_from_ce: AtomicI32,
}

impl FixedClock {
    /// Clock frozen at `date`
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            days_from_ce: AtomicI32::new(date.num_days_from_ce()),
        }
    }

    /// Move the clock to `date`
    pub fn set(&self, date: NaiveDate) {
        self.days_from_ce
            .store(date.num_days_from_ce(), Ordering::SeqCst);
    }

    /// Move the clock forward by whole days
    pub fn advance_days(&self, days: u32) {
        let next = self
            .today()
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        self.set(next);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        NaiveDate::from_num_days_from_ce_opt(self.days_from_ce.load(Ordering::SeqCst))
            .unwrap_or(NaiveDate::MIN)
    }
}
