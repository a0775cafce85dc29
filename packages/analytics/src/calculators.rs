//! The five metric calculators.
//!
//! Each calculator is a stateless function over the filtered snapshot and
//! the query's `reference_time`. They share one response-time definition
//! (`resolved_at - created_at`, or `reference_time - created_at` for open
//! reports) and one rounding rule (two decimals for every rate and hour
//! figure). The daily and monthly trend series are always dense and
//! fixed-length; the department, geographic, and department-weekly
//! groupings are sparse and omit empty buckets.

#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike as _, Days, Duration, Utc};
use civic_connect_analytics_models::{
    CityStats, DailyTrend, DepartmentStats, LabelCount, MonthlyTrend, OverviewStats,
    QueryDescriptor, ResponseTimeStats, TrendStats,
};
use civic_connect_report_models::{Coordinate, Report};

/// Number of entries in the daily trend series.
const DAILY_TREND_DAYS: u64 = 30;

/// Number of entries in the monthly trend series.
const MONTHLY_TREND_STEPS: i64 = 12;

// Histogram bucket labels, in boundary order.
const BUCKET_UNDER_DAY: &str = "<24h";
const BUCKET_1_3_DAYS: &str = "1-3 days";
const BUCKET_3_7_DAYS: &str = "3-7 days";
const BUCKET_OVER_WEEK: &str = ">1 week";

/// Rounds to two decimal places, the dashboard's display precision.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part` as a percentage of `total`, 0 when `total` is 0.
fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 * 100.0 / total as f64)
    }
}

/// Elapsed response time in hours for one report.
///
/// Open reports measure against `reference`. Reports with no normalized
/// `created_at` have no defined elapsed time and are skipped by every
/// consumer. Clamped at zero so a `resolved_at` recorded before
/// `created_at` cannot produce a negative span.
fn elapsed_hours(report: &Report, reference: DateTime<Utc>) -> Option<f64> {
    let created = report.created_at?;
    let end = report.resolved_at.unwrap_or(reference);
    let hours = (end - created).num_seconds() as f64 / 3600.0;
    Some(hours.max(0.0))
}

/// UTC start of the calendar day containing `t`.
fn start_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

/// Counts occurrences of each value, remembering first-encounter order so
/// top-N listings can break ties stably.
fn distribution<'a, I>(values: I) -> (BTreeMap<String, u64>, Vec<String>)
where
    I: Iterator<Item = &'a str>,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut order: Vec<String> = Vec::new();
    for value in values {
        if !counts.contains_key(value) {
            order.push(value.to_string());
        }
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    (counts, order)
}

/// Top five entries by count; ties stay in first-encountered order
/// (stable sort over the encounter list).
fn top_five(counts: &BTreeMap<String, u64>, order: &[String]) -> Vec<LabelCount> {
    let mut ranked: Vec<LabelCount> = order
        .iter()
        .map(|label| LabelCount {
            label: label.clone(),
            count: counts.get(label).copied().unwrap_or(0),
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(5);
    ranked
}

/// Headline KPIs over the filtered snapshot.
#[must_use]
pub fn overview(reports: &[Report], query: &QueryDescriptor) -> OverviewStats {
    let total = reports.len() as u64;
    let start_today = start_of_day(query.reference_time);
    let start_week = start_today - Duration::days(7);
    let start_month = start_today - Duration::days(30);

    let created_since = |bound: DateTime<Utc>| {
        reports
            .iter()
            .filter(|r| r.created_at.is_some_and(|c| c >= bound))
            .count() as u64
    };

    let (status_distribution, _) = distribution(reports.iter().map(|r| r.status.as_str()));
    let (priority_distribution, _) = distribution(reports.iter().map(|r| r.priority.as_str()));
    let (department_distribution, department_order) =
        distribution(reports.iter().map(|r| r.department.as_str()));
    let (city_distribution, city_order) = distribution(reports.iter().map(|r| r.city.as_str()));

    let resolved = reports.iter().filter(|r| r.is_closed()).count() as u64;

    let elapsed: Vec<f64> = reports
        .iter()
        .filter_map(|r| elapsed_hours(r, query.reference_time))
        .collect();
    let avg_response_hours = if elapsed.is_empty() {
        0.0
    } else {
        round2(elapsed.iter().sum::<f64>() / elapsed.len() as f64)
    };

    OverviewStats {
        total_reports: total,
        total_users: query.total_users,
        reports_today: created_since(start_today),
        reports_this_week: created_since(start_week),
        reports_this_month: created_since(start_month),
        resolution_rate: percentage(resolved, total),
        avg_response_hours,
        top_departments: top_five(&department_distribution, &department_order),
        top_cities: top_five(&city_distribution, &city_order),
        status_distribution,
        priority_distribution,
        department_distribution,
        city_distribution,
    }
}

/// ISO-week bucket key, e.g. `"2026-W35"`.
fn iso_week_key(t: DateTime<Utc>) -> String {
    let week = t.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// The three trend series.
///
/// Daily and monthly series are zero-filled to their fixed lengths even
/// for an empty snapshot; records with no normalized `created_at` are
/// excluded from bucketing rather than mis-bucketed.
#[must_use]
pub fn trends(reports: &[Report], query: &QueryDescriptor) -> TrendStats {
    let mut by_day: BTreeMap<chrono::NaiveDate, (u64, u64)> = BTreeMap::new();
    let mut by_month: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    let mut by_department_week: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();

    for report in reports {
        let Some(created) = report.created_at else {
            continue;
        };
        let closed = u64::from(report.is_closed());

        let day = by_day.entry(created.date_naive()).or_insert((0, 0));
        day.0 += 1;
        day.1 += closed;

        let month = by_month
            .entry(created.format("%Y-%m").to_string())
            .or_insert((0, 0));
        month.0 += 1;
        month.1 += closed;

        *by_department_week
            .entry(report.department.clone())
            .or_default()
            .entry(iso_week_key(created))
            .or_insert(0) += 1;
    }

    let reference_date = query.reference_time.date_naive();
    let daily_trends = (0..DAILY_TREND_DAYS)
        .rev()
        .map(|offset| {
            let date = reference_date - Days::new(offset);
            let (reports, resolved) = by_day.get(&date).copied().unwrap_or((0, 0));
            DailyTrend {
                date: date.format("%Y-%m-%d").to_string(),
                reports,
                resolved,
            }
        })
        .collect();

    // Fixed 30-day steps, not true calendar months: twelve anchors walking
    // back from the reference instant, so anchor keys can repeat a month
    // near year boundaries. The series length never varies.
    let monthly_trends = (0..MONTHLY_TREND_STEPS)
        .rev()
        .map(|step| {
            let anchor = query.reference_time - Duration::days(30 * step);
            let month_key = anchor.format("%Y-%m").to_string();
            let (reports, resolved) = by_month.get(&month_key).copied().unwrap_or((0, 0));
            MonthlyTrend {
                month: anchor.format("%b %Y").to_string(),
                month_key,
                reports,
                resolved,
            }
        })
        .collect();

    TrendStats {
        daily_trends,
        monthly_trends,
        department_weekly_trends: by_department_week,
    }
}

/// Per-department rollup. Departments with zero records after filtering
/// are omitted, not zero-filled.
#[must_use]
pub fn department_breakdown(reports: &[Report]) -> BTreeMap<String, DepartmentStats> {
    let mut breakdown: BTreeMap<String, DepartmentStats> = BTreeMap::new();

    for report in reports {
        let stats = breakdown
            .entry(report.department.clone())
            .or_insert_with(|| DepartmentStats {
                total_reports: 0,
                pending: 0,
                in_progress: 0,
                resolved: 0,
                high_priority: 0,
                medium_priority: 0,
                low_priority: 0,
                cities: BTreeMap::new(),
                resolution_rate: 0.0,
                pending_rate: 0.0,
            });

        stats.total_reports += 1;
        let status = report.status.trim();
        if status.eq_ignore_ascii_case("pending") {
            stats.pending += 1;
        } else if status.eq_ignore_ascii_case("in_progress") {
            stats.in_progress += 1;
        }
        if report.is_closed() {
            stats.resolved += 1;
        }

        let priority = report.priority.trim();
        if priority.eq_ignore_ascii_case("high") {
            stats.high_priority += 1;
        } else if priority.eq_ignore_ascii_case("medium") {
            stats.medium_priority += 1;
        } else if priority.eq_ignore_ascii_case("low") {
            stats.low_priority += 1;
        }

        *stats.cities.entry(report.city.clone()).or_insert(0) += 1;
    }

    for stats in breakdown.values_mut() {
        stats.resolution_rate = percentage(stats.resolved, stats.total_reports);
        stats.pending_rate = percentage(stats.pending, stats.total_reports);
    }

    breakdown
}

/// Response-time distribution.
///
/// Bucket boundaries are half-open `[low, high)` in hours; the final
/// bucket is open-ended. All four buckets are always present.
#[must_use]
pub fn response_times(reports: &[Report], query: &QueryDescriptor) -> ResponseTimeStats {
    let mut overall: (f64, u64) = (0.0, 0);
    let mut by_department: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    let mut by_priority: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    let mut histogram: BTreeMap<String, u64> = [
        (BUCKET_UNDER_DAY.to_string(), 0),
        (BUCKET_1_3_DAYS.to_string(), 0),
        (BUCKET_3_7_DAYS.to_string(), 0),
        (BUCKET_OVER_WEEK.to_string(), 0),
    ]
    .into_iter()
    .collect();

    for report in reports {
        let Some(hours) = elapsed_hours(report, query.reference_time) else {
            continue;
        };

        overall.0 += hours;
        overall.1 += 1;

        let dept = by_department
            .entry(report.department.clone())
            .or_insert((0.0, 0));
        dept.0 += hours;
        dept.1 += 1;

        let priority = by_priority
            .entry(report.priority.clone())
            .or_insert((0.0, 0));
        priority.0 += hours;
        priority.1 += 1;

        let bucket = if hours < 24.0 {
            BUCKET_UNDER_DAY
        } else if hours < 72.0 {
            BUCKET_1_3_DAYS
        } else if hours < 168.0 {
            BUCKET_3_7_DAYS
        } else {
            BUCKET_OVER_WEEK
        };
        *histogram.entry(bucket.to_string()).or_insert(0) += 1;
    }

    let mean = |(sum, count): (f64, u64)| {
        if count == 0 {
            0.0
        } else {
            round2(sum / count as f64)
        }
    };

    ResponseTimeStats {
        overall_avg_hours: mean(overall),
        department_avg_hours: by_department.into_iter().map(|(k, v)| (k, mean(v))).collect(),
        priority_avg_hours: by_priority.into_iter().map(|(k, v)| (k, mean(v))).collect(),
        response_time_distribution: histogram,
    }
}

/// Per-city rollup for map rendering. Cities
/// are grouped purely by string, never merged by coordinate proximity.
#[must_use]
pub fn geographic_distribution(reports: &[Report]) -> BTreeMap<String, CityStats> {
    let mut cities: BTreeMap<String, CityStats> = BTreeMap::new();

    for report in reports {
        let stats = cities
            .entry(report.city.clone())
            .or_insert_with(|| CityStats {
                total_reports: 0,
                resolved: 0,
                resolution_rate: 0.0,
                departments: BTreeMap::new(),
                priorities: BTreeMap::new(),
                coordinates: Vec::new(),
            });

        stats.total_reports += 1;
        if report.is_closed() {
            stats.resolved += 1;
        }
        *stats
            .departments
            .entry(report.department.clone())
            .or_insert(0) += 1;
        *stats
            .priorities
            .entry(report.priority.clone())
            .or_insert(0) += 1;
        if let (Some(lat), Some(lng)) = (report.lat, report.lng) {
            stats.coordinates.push(Coordinate { lat, lng });
        }
    }

    for stats in cities.values_mut() {
        stats.resolution_rate = percentage(stats.resolved, stats.total_reports);
    }

    cities
}
