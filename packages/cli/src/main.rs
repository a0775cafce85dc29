#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Operator CLI for the civic-connect analytics engine.
//!
//! Loads a JSON snapshot file (an array of raw report documents, as
//! exported from the report store) and either prints the normalized
//! records or computes one dashboard aggregate against them. Useful for
//! eyeballing production exports without standing up the dashboard.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use civic_connect_analytics::{parse_kind, AggregationEngine};
use civic_connect_analytics_models::{QueryDescriptor, Role};
use civic_connect_report::Normalizer;
use civic_connect_report_models::RawReport;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "civic_connect_cli", about = "Civic report snapshot inspector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one dashboard aggregate over a snapshot file
    Aggregate {
        /// Path to a JSON array of raw report documents
        snapshot: PathBuf,
        /// Aggregate to compute: overview, trends, department,
        /// `response_time`, or geographic
        #[arg(long, default_value = "overview")]
        kind: String,
        /// Caller role: admin or `department_head`
        #[arg(long, default_value = "admin")]
        role: Role,
        /// Caller's department (required for `department_head`)
        #[arg(long)]
        caller_department: Option<String>,
        /// Explicit department filter
        #[arg(long)]
        department: Option<String>,
        /// Explicit priority filter
        #[arg(long)]
        priority: Option<String>,
        /// Time window in days (0 disables the window)
        #[arg(long, default_value_t = 0)]
        window_days: i64,
        /// Registered user count to report in the overview
        #[arg(long, default_value_t = 0)]
        total_users: u64,
        /// Reference instant (RFC 3339); defaults to now
        #[arg(long)]
        reference_time: Option<DateTime<Utc>>,
        /// UTC offset in hours applied to naive stored timestamps
        #[arg(long, default_value_t = 0)]
        utc_offset_hours: i32,
    },
    /// Print the normalized form of every record in a snapshot file
    Normalize {
        /// Path to a JSON array of raw report documents
        snapshot: PathBuf,
        /// UTC offset in hours applied to naive stored timestamps
        #[arg(long, default_value_t = 0)]
        utc_offset_hours: i32,
    },
}

fn load_snapshot(path: &Path) -> Result<Vec<RawReport>, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let records: Vec<RawReport> = serde_json::from_str(&contents)?;
    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn offset_from_hours(hours: i32) -> Result<FixedOffset, Box<dyn std::error::Error>> {
    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| format!("invalid utc offset: {hours}h").into())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate {
            snapshot,
            kind,
            role,
            caller_department,
            department,
            priority,
            window_days,
            total_users,
            reference_time,
            utc_offset_hours,
        } => {
            let records = load_snapshot(&snapshot)?;
            let kind = parse_kind(&kind)?;
            let query = QueryDescriptor {
                role,
                caller_department,
                department_filter: department,
                priority_filter: priority,
                window_days,
                reference_time: reference_time.unwrap_or_else(Utc::now),
                total_users,
            };
            let engine =
                AggregationEngine::new(Normalizer::new(offset_from_hours(utc_offset_hours)?));
            let result = engine.compute(&records, &query, kind)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Normalize {
            snapshot,
            utc_offset_hours,
        } => {
            let records = load_snapshot(&snapshot)?;
            let normalizer = Normalizer::new(offset_from_hours(utc_offset_hours)?);
            let normalized = normalizer.normalize_all(&records);
            println!("{}", serde_json::to_string_pretty(&normalized)?);
        }
    }

    Ok(())
}
