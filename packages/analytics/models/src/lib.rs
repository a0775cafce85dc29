#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query and aggregate result types for the civic-connect dashboard.
//!
//! Defines the query descriptor the aggregation engine accepts and the
//! five fixed result shapes the dashboard UI renders. The result field
//! names are a stable contract with the UI; they serialize exactly as
//! written here (no renaming).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use civic_connect_report_models::Coordinate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Caller role, which bounds the records a query may see.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// Sees every report.
    Admin,
    /// Sees only reports routed to their own department.
    DepartmentHead,
}

/// Which aggregate a query asks for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AggregateKind {
    /// Headline KPIs (`OverviewStats`).
    Overview,
    /// Daily/monthly/weekly series (`TrendStats`).
    Trends,
    /// Per-department breakdown.
    Department,
    /// Response-time distribution (`ResponseTimeStats`).
    ResponseTime,
    /// Per-city geographic distribution.
    Geographic,
}

/// Everything the engine needs to scope and window one aggregation.
///
/// `reference_time` is injected rather than read from the wall clock so
/// the calculators stay deterministic and testable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Caller role.
    pub role: Role,
    /// The caller's own department; required when `role` is
    /// [`Role::DepartmentHead`].
    pub caller_department: Option<String>,
    /// Explicit department filter, applied on top of role scoping.
    pub department_filter: Option<String>,
    /// Explicit priority filter.
    pub priority_filter: Option<String>,
    /// Only keep reports created within this many days of
    /// `reference_time`; `0` disables the window.
    pub window_days: i64,
    /// The "now" instant the window and day boundaries are computed from.
    pub reference_time: DateTime<Utc>,
    /// Registered user count, supplied by the identity collaborator and
    /// reported untouched in the overview (it is not report-scoped).
    pub total_users: u64,
}

impl QueryDescriptor {
    /// An unscoped admin query at the given reference instant, with no
    /// filters and no time window.
    #[must_use]
    pub const fn admin(reference_time: DateTime<Utc>) -> Self {
        Self {
            role: Role::Admin,
            caller_department: None,
            department_filter: None,
            priority_filter: None,
            window_days: 0,
            reference_time,
            total_users: 0,
        }
    }
}

/// Headline KPIs over the filtered snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewStats {
    /// Reports remaining after filtering.
    pub total_reports: u64,
    /// Registered users (from the query, not report-scoped).
    pub total_users: u64,
    /// Reports created on or after the start of the reference day.
    pub reports_today: u64,
    /// Reports created within the last 7 local days.
    pub reports_this_week: u64,
    /// Reports created within the last 30 local days.
    pub reports_this_month: u64,
    /// Percentage of reports whose status means closed, 0 when empty.
    pub resolution_rate: f64,
    /// Mean response time in hours over the same filtered set.
    pub avg_response_hours: f64,
    /// Report count per status value.
    pub status_distribution: BTreeMap<String, u64>,
    /// Report count per priority value.
    pub priority_distribution: BTreeMap<String, u64>,
    /// Report count per department.
    pub department_distribution: BTreeMap<String, u64>,
    /// Report count per city.
    pub city_distribution: BTreeMap<String, u64>,
    /// Up to five departments by report count, ties kept in
    /// first-encountered order.
    pub top_departments: Vec<LabelCount>,
    /// Up to five cities by report count, same tie-breaking.
    pub top_cities: Vec<LabelCount>,
}

/// A labeled count used for top-N listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    /// Department or city name.
    pub label: String,
    /// Number of reports.
    pub count: u64,
}

/// One calendar day in the daily trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTrend {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    /// Reports created that day.
    pub reports: u64,
    /// Of those, reports whose status means closed.
    pub resolved: u64,
}

/// One 30-day step in the monthly trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// Month label, e.g. `"Aug 2026"`.
    pub month: String,
    /// Month key, e.g. `"2026-08"`.
    pub month_key: String,
    /// Reports created in that calendar month.
    pub reports: u64,
    /// Of those, reports whose status means closed.
    pub resolved: u64,
}

/// The three dashboard trend series.
///
/// The daily and monthly series are always dense (30 and 12 entries,
/// zero-filled); the department-weekly map is sparse and only carries
/// buckets that occur in the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendStats {
    /// Exactly 30 calendar days ending at the reference day, oldest first.
    pub daily_trends: Vec<DailyTrend>,
    /// Exactly 12 fixed 30-day steps back from the reference instant,
    /// oldest first.
    pub monthly_trends: Vec<MonthlyTrend>,
    /// Department -> ISO-week key (`YYYY-Www`) -> report count.
    pub department_weekly_trends: BTreeMap<String, BTreeMap<String, u64>>,
}

/// Per-department rollup. Departments with no reports after filtering are
/// omitted entirely, not zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentStats {
    /// Reports routed to this department.
    pub total_reports: u64,
    /// Reports still pending.
    pub pending: u64,
    /// Reports in progress.
    pub in_progress: u64,
    /// Reports whose status means closed (`resolved` or `completed`).
    pub resolved: u64,
    /// High-priority reports.
    pub high_priority: u64,
    /// Medium-priority reports.
    pub medium_priority: u64,
    /// Low-priority reports.
    pub low_priority: u64,
    /// Nested city -> count breakdown.
    pub cities: BTreeMap<String, u64>,
    /// Percentage closed, 0 when the department total is 0.
    pub resolution_rate: f64,
    /// Percentage pending, same zero guard.
    pub pending_rate: f64,
}

/// Response-time distribution over the filtered snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimeStats {
    /// Mean response time in hours.
    pub overall_avg_hours: f64,
    /// Mean response time per department.
    pub department_avg_hours: BTreeMap<String, f64>,
    /// Mean response time per priority.
    pub priority_avg_hours: BTreeMap<String, f64>,
    /// Fixed four-bucket histogram keyed `"<24h"`, `"1-3 days"`,
    /// `"3-7 days"`, `">1 week"`; always carries all four keys.
    pub response_time_distribution: BTreeMap<String, u64>,
}

/// Per-city rollup for map rendering. Cities with no reports after
/// filtering are omitted; grouping is purely by city string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityStats {
    /// Reports filed in this city.
    pub total_reports: u64,
    /// Reports whose status means closed.
    pub resolved: u64,
    /// Percentage closed, 0 when the city total is 0.
    pub resolution_rate: f64,
    /// Department -> count sub-distribution.
    pub departments: BTreeMap<String, u64>,
    /// Priority -> count sub-distribution.
    pub priorities: BTreeMap<String, u64>,
    /// Every coordinate pair available for this city.
    pub coordinates: Vec<Coordinate>,
}

/// One computed aggregate, tagged with the kind that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum AggregateResult {
    /// Headline KPIs.
    Overview(OverviewStats),
    /// Trend series.
    Trends(TrendStats),
    /// Department name -> rollup.
    Department(BTreeMap<String, DepartmentStats>),
    /// Response-time distribution.
    ResponseTime(ResponseTimeStats),
    /// City name -> rollup.
    Geographic(BTreeMap<String, CityStats>),
}
