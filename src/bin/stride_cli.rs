// ABOUTME: Stride CLI - command-line access to profiles, step recording, and history
// ABOUTME: Replays sensor readings through the accumulator and prints JSON results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Create a profile (full write)
//! stride-cli --store-url sqlite:./stride.db profile set --user u1 --weight 70 --height 175 --step-goal 8000 --create
//!
//! # Edit one field (merge)
//! stride-cli --store-url sqlite:./stride.db profile set --user u1 --weight 72
//!
//! # Replay cumulative pedometer readings for today
//! stride-cli --store-url sqlite:./stride.db record --user u1 --readings 120,340,500
//!
//! # Last seven days, oldest first
//! stride-cli --store-url sqlite:./stride.db history --user u1 --chronological
//!
//! # Home screen snapshot
//! stride-cli --store-url sqlite:./stride.db dashboard --user u1
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use stride_tracker::accumulator::StepAccumulator;
use stride_tracker::aggregator::{chronological, StepAggregator};
use stride_tracker::clock::{Clock, FixedClock, SystemClock};
use stride_tracker::config::{HistoryDays, TrackerConfig, WriteMode};
use stride_tracker::constants::records::DEFAULT_CAS_MAX_ATTEMPTS;
use stride_tracker::dashboard::DashboardService;
use stride_tracker::logging::LoggingConfig;
use stride_tracker::models::{ProfileUpdate, UserProfile};
use stride_tracker::profile::ProfileService;
use stride_tracker::sensor::ScriptedSensor;
use stride_tracker::session::TrackingSession;
use stride_tracker::store::{factory, KeyedStore};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "stride-cli",
    about = "Stride step tracker CLI",
    long_about = "Manage profiles, replay pedometer readings, and inspect daily step history."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Store URL override (`memory` or `sqlite:...`)
    #[arg(long, global = true)]
    store_url: Option<String>,

    /// Write mode override (`last-writer-wins` or `compare-and-swap`)
    #[arg(long, global = true)]
    write_mode: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Profile commands
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },

    /// Replay cumulative pedometer readings into today's record
    Record {
        /// User id
        #[arg(long)]
        user: String,

        /// Cumulative step counts since subscription start, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        readings: Vec<u64>,

        /// Accounting date override (`yyyy-MM-dd`), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Most recent daily records
    History {
        /// User id
        #[arg(long)]
        user: String,

        /// Number of days, defaults to the configured history window
        #[arg(long)]
        days: Option<usize>,

        /// Oldest first instead of most recent first
        #[arg(long)]
        chronological: bool,
    },

    /// Home screen snapshot
    Dashboard {
        /// User id
        #[arg(long)]
        user: String,

        /// Accounting date override (`yyyy-MM-dd`), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Write profile fields
    Set {
        /// User id
        #[arg(long)]
        user: String,

        /// Replace the whole profile instead of merging fields
        #[arg(long)]
        create: bool,

        /// Given name
        #[arg(long)]
        first_name: Option<String>,

        /// Family name
        #[arg(long)]
        last_name: Option<String>,

        /// Height in centimeters
        #[arg(long)]
        height: Option<f64>,

        /// Weight in kilograms
        #[arg(long)]
        weight: Option<f64>,

        /// Daily step goal
        #[arg(long)]
        step_goal: Option<u64>,

        /// Target weight in kilograms
        #[arg(long)]
        weight_goal: Option<f64>,
    },

    /// Print the stored profile
    Show {
        /// User id
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env();
    let logging = if cli.verbose {
        logging.with_level("debug")
    } else {
        logging
    };
    logging.init()?;

    let mut config = TrackerConfig::from_env()?;
    if let Some(url) = cli.store_url {
        config.store.url = url;
    }
    if let Some(mode) = cli.write_mode.as_deref() {
        let max_attempts = match config.accumulator.write_mode {
            WriteMode::CompareAndSwap { max_attempts } => max_attempts,
            WriteMode::LastWriterWins => DEFAULT_CAS_MAX_ATTEMPTS,
        };
        config.accumulator.write_mode = WriteMode::parse(mode, max_attempts)?;
    }

    let store = factory::connect(&config.store)
        .await
        .with_context(|| format!("opening store {}", config.store.url))?;

    match cli.command {
        Command::Profile { action } => run_profile(store, action).await,
        Command::Record {
            user,
            readings,
            date,
        } => {
            let accumulator = StepAccumulator::new(store, clock_for(date), config.accumulator);
            let sensor = ScriptedSensor::new(readings);
            let session = TrackingSession::start(&sensor, accumulator, user.as_str()).await?;
            let accumulator = session.finished().await?;
            info!(user.id = %user, "replay finished");
            print_json(&accumulator.today_totals().await)
        }
        Command::History {
            user,
            days,
            chronological: oldest_first,
        } => {
            let days = match days {
                Some(days) => HistoryDays::new(days)?,
                None => config.history_days,
            };
            let records = StepAggregator::new(store)
                .last_n_days(&user, days.get())
                .await?;
            if oldest_first {
                print_json(&chronological(records))
            } else {
                print_json(&records)
            }
        }
        Command::Dashboard { user, date } => {
            let service = DashboardService::new(store, clock_for(date), config.history_days);
            print_json(&service.snapshot(&user).await?)
        }
    }
}

async fn run_profile(store: Arc<dyn KeyedStore>, action: ProfileCommand) -> Result<()> {
    let profiles = ProfileService::new(store);
    match action {
        ProfileCommand::Set {
            user,
            create,
            first_name,
            last_name,
            height,
            weight,
            step_goal,
            weight_goal,
        } => {
            if create {
                let profile = UserProfile {
                    first_name,
                    last_name,
                    height,
                    weight,
                    step_goal,
                    weight_goal,
                };
                profiles.create(&user, &profile).await?;
            } else {
                let update = ProfileUpdate {
                    first_name,
                    last_name,
                    height,
                    weight,
                    step_goal,
                    weight_goal,
                };
                profiles.update(&user, &update).await?;
            }
            print_json(&profiles.fetch(&user).await?)
        }
        ProfileCommand::Show { user } => print_json(&profiles.fetch(&user).await?),
    }
}

fn clock_for(date: Option<NaiveDate>) -> Arc<dyn Clock> {
    match date {
        Some(date) => Arc::new(FixedClock::new(date)),
        None => Arc::new(SystemClock),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
