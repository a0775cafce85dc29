#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation engine for civic-issue dashboard queries.
//!
//! Takes a snapshot of raw report documents plus a query descriptor and
//! produces one of five UI-ready aggregates: overview KPIs, trend series,
//! per-department breakdown, response-time distribution, or geographic
//! distribution. The whole pipeline — normalize, filter, calculate — is a
//! pure function of its inputs and the query's `reference_time`; the
//! engine performs no I/O, holds no state, and never mutates a record.

pub mod calculators;
pub mod filter;

use std::str::FromStr as _;

use civic_connect_analytics_models::{AggregateKind, AggregateResult, QueryDescriptor, Role};
use civic_connect_report::Normalizer;
use civic_connect_report_models::RawReport;
use thiserror::Error;

/// Query-shape problems surfaced to the caller.
///
/// Per-record anomalies (bad timestamps, unknown categories, garbled
/// locations) are absorbed during normalization and never reach here; the
/// engine only fails fast on queries it cannot honor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    /// A `department_head` query arrived without the caller's department.
    #[error("department_head queries require a caller department")]
    MissingCallerDepartment,

    /// The time window was negative.
    #[error("window_days must be non-negative, got {days}")]
    NegativeWindowDays {
        /// The rejected value.
        days: i64,
    },

    /// The requested aggregate kind is not one the engine computes.
    #[error("unknown aggregate kind: {kind}")]
    UnknownKind {
        /// The rejected kind string.
        kind: String,
    },
}

/// Parses an aggregate kind string, mapping failures to
/// [`AnalyticsError::UnknownKind`].
///
/// # Errors
///
/// Returns [`AnalyticsError::UnknownKind`] if `kind` is not one of
/// `overview`, `trends`, `department`, `response_time`, `geographic`.
pub fn parse_kind(kind: &str) -> Result<AggregateKind, AnalyticsError> {
    AggregateKind::from_str(kind.trim()).map_err(|_| AnalyticsError::UnknownKind {
        kind: kind.to_string(),
    })
}

/// Validates the shape of a query before any computation.
///
/// # Errors
///
/// Returns [`AnalyticsError::NegativeWindowDays`] or
/// [`AnalyticsError::MissingCallerDepartment`] for malformed queries.
pub fn validate_query(query: &QueryDescriptor) -> Result<(), AnalyticsError> {
    if query.window_days < 0 {
        return Err(AnalyticsError::NegativeWindowDays {
            days: query.window_days,
        });
    }
    if query.role == Role::DepartmentHead
        && query
            .caller_department
            .as_deref()
            .is_none_or(|d| d.trim().is_empty())
    {
        return Err(AnalyticsError::MissingCallerDepartment);
    }
    Ok(())
}

/// The aggregation facade: normalize, filter once, dispatch to one
/// calculator.
///
/// Stateless apart from the normalizer's configured default offset;
/// concurrent callers can share one engine freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregationEngine {
    normalizer: Normalizer,
}

impl AggregationEngine {
    /// Creates an engine that normalizes raw records with the given
    /// normalizer before filtering and aggregation.
    #[must_use]
    pub const fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    /// Computes one aggregate over a raw snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the query shape is invalid; data
    /// problems inside individual records never produce an error.
    pub fn compute(
        &self,
        records: &[RawReport],
        query: &QueryDescriptor,
        kind: AggregateKind,
    ) -> Result<AggregateResult, AnalyticsError> {
        validate_query(query)?;

        let normalized = self.normalizer.normalize_all(records);
        let filtered = filter::apply(&normalized, query);
        log::debug!(
            "computing {kind} over {} of {} records",
            filtered.len(),
            normalized.len()
        );

        Ok(match kind {
            AggregateKind::Overview => {
                AggregateResult::Overview(calculators::overview(&filtered, query))
            }
            AggregateKind::Trends => AggregateResult::Trends(calculators::trends(&filtered, query)),
            AggregateKind::Department => {
                AggregateResult::Department(calculators::department_breakdown(&filtered))
            }
            AggregateKind::ResponseTime => {
                AggregateResult::ResponseTime(calculators::response_times(&filtered, query))
            }
            AggregateKind::Geographic => {
                AggregateResult::Geographic(calculators::geographic_distribution(&filtered))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use civic_connect_analytics_models::{AggregateResult, QueryDescriptor, Role};
    use civic_connect_report_models::RawReport;

    use super::*;

    fn reference() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap()
    }

    #[test]
    fn rejects_negative_window() {
        let mut query = QueryDescriptor::admin(reference());
        query.window_days = -1;
        let err = AggregationEngine::default()
            .compute(&[], &query, AggregateKind::Overview)
            .unwrap_err();
        assert_eq!(err, AnalyticsError::NegativeWindowDays { days: -1 });
    }

    #[test]
    fn rejects_department_head_without_department() {
        let mut query = QueryDescriptor::admin(reference());
        query.role = Role::DepartmentHead;
        let err = AggregationEngine::default()
            .compute(&[], &query, AggregateKind::Trends)
            .unwrap_err();
        assert_eq!(err, AnalyticsError::MissingCallerDepartment);

        query.caller_department = Some("   ".to_string());
        let err = AggregationEngine::default()
            .compute(&[], &query, AggregateKind::Trends)
            .unwrap_err();
        assert_eq!(err, AnalyticsError::MissingCallerDepartment);
    }

    #[test]
    fn unknown_kind_string_is_typed() {
        let err = parse_kind("heatmap").unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::UnknownKind {
                kind: "heatmap".to_string()
            }
        );
        assert_eq!(parse_kind(" overview ").unwrap(), AggregateKind::Overview);
    }

    #[test]
    fn empty_snapshot_is_not_an_error() {
        let query = QueryDescriptor::admin(reference());
        let result = AggregationEngine::default()
            .compute(&[], &query, AggregateKind::Overview)
            .unwrap();
        match result {
            AggregateResult::Overview(stats) => {
                assert_eq!(stats.total_reports, 0);
                assert!((stats.resolution_rate - 0.0).abs() < f64::EPSILON);
            }
            other => panic!("expected overview, got {other:?}"),
        }
    }

    #[test]
    fn malformed_records_are_absorbed() {
        let raw = RawReport {
            created_at: Some("not a timestamp".to_string()),
            priority: Some("critical!!".to_string()),
            location: Some(serde_json::Value::String("nowhere".to_string())),
            ..RawReport::default()
        };
        let query = QueryDescriptor::admin(reference());
        let result = AggregationEngine::default()
            .compute(&[raw], &query, AggregateKind::Overview)
            .unwrap();
        match result {
            AggregateResult::Overview(stats) => assert_eq!(stats.total_reports, 1),
            other => panic!("expected overview, got {other:?}"),
        }
    }
}
