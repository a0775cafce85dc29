//! The shared filter pipeline applied once before any calculator runs.
//!
//! Order: role scope, explicit department filter, explicit priority
//! filter, time window. Every predicate short-circuits to exclusion, the
//! input order is preserved, and no record is mutated — the same
//! normalized snapshot can be re-filtered with different queries.

use chrono::Duration;
use civic_connect_analytics_models::{QueryDescriptor, Role};
use civic_connect_report_models::Report;

/// Applies role scoping, explicit filters, and the time window.
///
/// A record with no normalized `created_at` is treated as created at
/// `reference_time`, so the window never excludes it.
#[must_use]
pub fn apply(reports: &[Report], query: &QueryDescriptor) -> Vec<Report> {
    let cutoff = (query.window_days > 0)
        .then(|| query.reference_time - Duration::days(query.window_days));

    reports
        .iter()
        .filter(|report| {
            if query.role == Role::DepartmentHead {
                let caller = query.caller_department.as_deref().unwrap_or_default();
                if !eq_fold(&report.department, caller) {
                    return false;
                }
            }
            if let Some(department) = query.department_filter.as_deref()
                && !eq_fold(&report.department, department)
            {
                return false;
            }
            if let Some(priority) = query.priority_filter.as_deref()
                && !eq_fold(&report.priority, priority)
            {
                return false;
            }
            if let Some(cutoff) = cutoff
                && report.created_at.is_some_and(|created| created < cutoff)
            {
                return false;
            }
            true
        })
        .cloned()
        .collect()
}

/// Trimmed, ASCII-case-insensitive equality used for all category
/// comparisons.
fn eq_fold(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
