#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw and canonical civic-issue report record types.
//!
//! Reports arrive as loose key/value documents from the report store; the
//! [`RawReport`] type accepts that shape permissively (every field optional,
//! unknown keys ignored). [`Report`] is the canonical form produced by the
//! normalizer in `civic_connect_report` and consumed by the aggregation
//! engine. `status` and `priority` stay open-ended strings rather than
//! closed enums: older report documents carry values outside today's
//! vocabulary, and the calculators key off whatever they find.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel used when a report carries no department or city.
pub const UNKNOWN: &str = "Unknown";

/// Default status assigned to reports that carry none.
pub const STATUS_PENDING: &str = "pending";

/// A report document exactly as the report store hands it over.
///
/// Mirrors the stored document shape: every field is optional and the
/// `location` value may be a `"lat,lng"` string, a geopoint-style object
/// exposing `latitude`/`longitude`, or absent entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawReport {
    /// Unique report identifier (document id).
    pub id: Option<String>,
    /// Identifier as stored inside the document body; some documents carry
    /// both this and `id`.
    pub report_id: Option<String>,
    /// Identifier of the citizen who filed the report.
    pub user_id: Option<String>,
    /// Department the report was routed to.
    pub department: Option<String>,
    /// City the issue was reported in.
    pub city: Option<String>,
    /// Workflow status (open vocabulary; `resolved` and `completed` both
    /// mean closed).
    pub status: Option<String>,
    /// Priority (open vocabulary; derived from status when absent).
    pub priority: Option<String>,
    /// Submission timestamp as stored (ISO 8601, possibly naive).
    pub created_at: Option<String>,
    /// Resolution timestamp as stored, absent for open reports.
    pub resolved_at: Option<String>,
    /// Free-form location: `"lat,lng"` string or geopoint object.
    pub location: Option<serde_json::Value>,
    /// Latitude, present on records that were already normalized once.
    pub lat: Option<f64>,
    /// Longitude, present on records that were already normalized once.
    pub lng: Option<f64>,
    /// Display title, if one was ever derived.
    pub title: Option<String>,
    /// Keywords extracted at submission time.
    pub keywords: Vec<String>,
    /// Citizen-entered description.
    pub user_description: Option<String>,
    /// Legacy alias for `user_description`.
    pub description: Option<String>,
    /// Attached photo URL.
    pub image_url: Option<String>,
    /// Legacy alias for `image_url`.
    pub image: Option<String>,
}

/// A normalized report, the only shape the aggregation engine reads.
///
/// Invariants upheld by the normalizer:
/// * `status` is never empty (defaults to [`STATUS_PENDING`]).
/// * `priority` is never empty (defaulted from status when absent).
/// * `department` and `city` fall back to [`UNKNOWN`].
/// * `lat` and `lng` are present together or absent together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Unique report identifier.
    pub id: String,
    /// Department the report was routed to.
    pub department: String,
    /// City the issue was reported in.
    pub city: String,
    /// Workflow status (open vocabulary).
    pub status: String,
    /// Priority (open vocabulary).
    pub priority: String,
    /// Submission instant, `None` when the stored value was absent or
    /// unparsable.
    pub created_at: Option<DateTime<Utc>>,
    /// Resolution instant, `None` for open reports.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Latitude derived from the stored location.
    pub lat: Option<f64>,
    /// Longitude derived from the stored location.
    pub lng: Option<f64>,
    /// Display title (derived from keywords or department when absent).
    pub title: String,
    /// Citizen-entered description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_description: Option<String>,
    /// Attached photo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Report {
    /// Returns `true` if this report's status means "closed".
    ///
    /// `resolved` and `completed` are equivalent for closed semantics.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        status_is_closed(&self.status)
    }
}

/// Returns `true` if the given status string means "closed".
#[must_use]
pub fn status_is_closed(status: &str) -> bool {
    let s = status.trim();
    s.eq_ignore_ascii_case("resolved") || s.eq_ignore_ascii_case("completed")
}

/// Derives the default priority for a report with none recorded:
/// `high` when the report is still pending, `medium` otherwise.
#[must_use]
pub fn default_priority(status: &str) -> &'static str {
    if status.trim().eq_ignore_ascii_case(STATUS_PENDING) {
        "high"
    } else {
        "medium"
    }
}

/// A latitude/longitude pair attached to a city for map rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_and_completed_are_closed() {
        assert!(status_is_closed("resolved"));
        assert!(status_is_closed("Completed"));
        assert!(status_is_closed(" RESOLVED "));
        assert!(!status_is_closed("pending"));
        assert!(!status_is_closed("in_progress"));
    }

    #[test]
    fn default_priority_follows_status() {
        assert_eq!(default_priority("pending"), "high");
        assert_eq!(default_priority("Pending"), "high");
        assert_eq!(default_priority("in_progress"), "medium");
        assert_eq!(default_priority("resolved"), "medium");
    }

    #[test]
    fn raw_report_accepts_sparse_documents() {
        let raw: RawReport = serde_json::from_str(r#"{"report_id": "r1"}"#).unwrap();
        assert_eq!(raw.report_id.as_deref(), Some("r1"));
        assert!(raw.department.is_none());
        assert!(raw.keywords.is_empty());
    }

    #[test]
    fn raw_report_accepts_geopoint_location() {
        let raw: RawReport = serde_json::from_str(
            r#"{"id": "r2", "location": {"latitude": 14.6, "longitude": 121.0}}"#,
        )
        .unwrap();
        assert!(raw.location.is_some());
    }
}
