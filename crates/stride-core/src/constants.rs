// ABOUTME: Application-wide constants for the Stride step tracker
// ABOUTME: Store path roots, calorie conversion factor, history window, and env var names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Store path layout
pub mod paths {
    /// Root under which daily records live: `steps/{user_id}/{date}`
    pub const STEPS_ROOT: &str = "steps";

    /// Root under which profiles live: `users/{user_id}`
    pub const USERS_ROOT: &str = "users";

    /// Separator between path segments
    pub const SEPARATOR: char = '/';

    /// Characters a realtime-database key may not contain
    pub const FORBIDDEN_KEY_CHARS: [char; 6] = ['/', '.', '#', '$', '[', ']'];
}

/// Calorie conversion
pub mod calories {
    /// Kilocalories burned per step per kilogram of body weight
    pub const PER_STEP_PER_KG: f64 = 0.0005;
}

/// Daily record fields and history window
pub mod records {
    /// `chrono` format of a daily record key (`yyyy-MM-dd`)
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Field holding the step total
    pub const STEPS_FIELD: &str = "steps";

    /// Field holding the calorie total
    pub const CALORIES_FIELD: &str = "calories";

    /// Number of days shown on the dashboard
    pub const DEFAULT_HISTORY_DAYS: usize = 7;

    /// Attempts made by the compare-and-swap writer before giving up
    pub const DEFAULT_CAS_MAX_ATTEMPTS: u32 = 5;

    /// Chart label format (`MM-DD`)
    pub const CHART_LABEL_FORMAT: &str = "%m-%d";
}

/// Environment variable names
pub mod env_vars {
    /// Store URL (`memory` or `sqlite:...`)
    pub const STORE_URL: &str = "STRIDE_STORE_URL";
    /// Days of history on the dashboard
    pub const HISTORY_DAYS: &str = "STRIDE_HISTORY_DAYS";
    /// `last-writer-wins` or `compare-and-swap`
    pub const WRITE_MODE: &str = "STRIDE_WRITE_MODE";
    /// Compare-and-swap attempts
    pub const CAS_MAX_ATTEMPTS: &str = "STRIDE_CAS_MAX_ATTEMPTS";
    /// Pool size for file-backed sqlite stores
    pub const SQLITE_MAX_CONNECTIONS: &str = "STRIDE_SQLITE_MAX_CONNECTIONS";
}

/// Service identity used in structured logs
pub mod service_names {
    /// Library / CLI service name
    pub const STRIDE_TRACKER: &str = "stride-tracker";
}
