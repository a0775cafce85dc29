//! Canonicalizes raw report documents.
//!
//! The normalizer fills the gaps that accumulated in the report store over
//! time: missing priorities, naive timestamps, free-text locations, and
//! absent display titles. It never rejects a record; anything unparsable
//! degrades to an unset field.

use chrono::FixedOffset;
use civic_connect_report_models::{RawReport, Report, STATUS_PENDING, UNKNOWN, default_priority};

use crate::parsing::{parse_geopoint, parse_lat_lng_str, parse_timestamp};

/// Converts raw report documents into canonical [`Report`]s.
///
/// Normalization is idempotent: a serialized [`Report`] read back as a
/// [`RawReport`] normalizes to the same [`Report`]. Derived `lat`/`lng`
/// fields on a document take precedence over re-parsing its `location`.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    /// Offset applied to naive stored timestamps before converting to UTC.
    default_offset: FixedOffset,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            default_offset: FixedOffset::east_opt(0).unwrap_or_else(|| unreachable!()),
        }
    }
}

impl Normalizer {
    /// Creates a normalizer that interprets naive timestamps in the given
    /// offset.
    #[must_use]
    pub const fn new(default_offset: FixedOffset) -> Self {
        Self { default_offset }
    }

    /// Normalizes a single raw document into a canonical [`Report`].
    #[must_use]
    pub fn normalize(&self, raw: &RawReport) -> Report {
        let id = raw
            .id
            .clone()
            .or_else(|| raw.report_id.clone())
            .unwrap_or_default();

        let department = non_empty(raw.department.as_deref()).unwrap_or(UNKNOWN);
        let city = non_empty(raw.city.as_deref()).unwrap_or(UNKNOWN);
        let status = non_empty(raw.status.as_deref()).unwrap_or(STATUS_PENDING);
        let priority = non_empty(raw.priority.as_deref())
            .map_or_else(|| default_priority(status).to_string(), str::to_string);

        let created_at = raw
            .created_at
            .as_deref()
            .and_then(|s| parse_timestamp(s, self.default_offset));
        if raw.created_at.is_some() && created_at.is_none() {
            log::debug!("report {id}: unparsable created_at {:?}", raw.created_at);
        }
        let resolved_at = raw
            .resolved_at
            .as_deref()
            .and_then(|s| parse_timestamp(s, self.default_offset));

        let coords = derive_coords(raw);

        let title = non_empty(raw.title.as_deref()).map_or_else(
            || {
                if raw.keywords.is_empty() {
                    format!("{department} report")
                } else {
                    raw.keywords.join(", ")
                }
            },
            str::to_string,
        );

        let user_description = non_empty(raw.user_description.as_deref())
            .or_else(|| non_empty(raw.description.as_deref()))
            .map(str::to_string);
        let image_url = non_empty(raw.image_url.as_deref())
            .or_else(|| non_empty(raw.image.as_deref()))
            .map(str::to_string);

        Report {
            id,
            department: department.to_string(),
            city: city.to_string(),
            status: status.to_string(),
            priority,
            created_at,
            resolved_at,
            lat: coords.map(|(lat, _)| lat),
            lng: coords.map(|(_, lng)| lng),
            title,
            user_description,
            image_url,
        }
    }

    /// Normalizes a whole snapshot, preserving order.
    #[must_use]
    pub fn normalize_all(&self, raws: &[RawReport]) -> Vec<Report> {
        raws.iter().map(|raw| self.normalize(raw)).collect()
    }
}

/// Derived coordinates: explicit `lat`/`lng` fields win, then a
/// `"lat,lng"` location string, then a geopoint-style object. Both
/// components must be present or the pair is dropped.
fn derive_coords(raw: &RawReport) -> Option<(f64, f64)> {
    if let (Some(lat), Some(lng)) = (raw.lat, raw.lng) {
        return Some((lat, lng));
    }
    match raw.location.as_ref()? {
        serde_json::Value::String(s) => parse_lat_lng_str(s),
        value @ serde_json::Value::Object(_) => parse_geopoint(value),
        _ => None,
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone as _, Utc};

    fn raw(department: &str, status: &str) -> RawReport {
        RawReport {
            id: Some("r1".to_string()),
            department: Some(department.to_string()),
            city: Some("Quezon City".to_string()),
            status: Some(status.to_string()),
            created_at: Some("2025-09-30T12:00:00+00:00".to_string()),
            ..RawReport::default()
        }
    }

    #[test]
    fn fills_priority_from_status() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize(&raw("Roads", "pending")).priority, "high");
        assert_eq!(
            normalizer.normalize(&raw("Roads", "in_progress")).priority,
            "medium"
        );
    }

    #[test]
    fn explicit_priority_passes_through_unvalidated() {
        let normalizer = Normalizer::default();
        let mut r = raw("Roads", "pending");
        r.priority = Some("urgent-ish".to_string());
        assert_eq!(normalizer.normalize(&r).priority, "urgent-ish");
    }

    #[test]
    fn defaults_missing_department_city_and_status() {
        let normalizer = Normalizer::default();
        let report = normalizer.normalize(&RawReport::default());
        assert_eq!(report.department, UNKNOWN);
        assert_eq!(report.city, UNKNOWN);
        assert_eq!(report.status, STATUS_PENDING);
        assert_eq!(report.priority, "high");
    }

    #[test]
    fn unparsable_timestamp_left_unset() {
        let normalizer = Normalizer::default();
        let mut r = raw("Roads", "pending");
        r.created_at = Some("yesterday sometime".to_string());
        assert!(normalizer.normalize(&r).created_at.is_none());
    }

    #[test]
    fn parses_location_string() {
        let normalizer = Normalizer::default();
        let mut r = raw("Roads", "pending");
        r.location = Some(serde_json::Value::String("14.5995,120.9842".to_string()));
        let report = normalizer.normalize(&r);
        assert!((report.lat.unwrap() - 14.5995).abs() < f64::EPSILON);
        assert!((report.lng.unwrap() - 120.9842).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_geopoint_location() {
        let normalizer = Normalizer::default();
        let mut r = raw("Roads", "pending");
        r.location = Some(serde_json::json!({"latitude": 14.6, "longitude": 121.0}));
        let report = normalizer.normalize(&r);
        assert_eq!(report.lat, Some(14.6));
        assert_eq!(report.lng, Some(121.0));
    }

    #[test]
    fn free_text_location_leaves_coords_unset() {
        let normalizer = Normalizer::default();
        let mut r = raw("Roads", "pending");
        r.location = Some(serde_json::Value::String("corner of 5th and Main".to_string()));
        let report = normalizer.normalize(&r);
        assert!(report.lat.is_none());
        assert!(report.lng.is_none());
    }

    #[test]
    fn title_falls_back_to_keywords_then_department() {
        let normalizer = Normalizer::default();
        let mut r = raw("Roads", "pending");
        r.keywords = vec!["pothole".to_string(), "flooding".to_string()];
        assert_eq!(normalizer.normalize(&r).title, "pothole, flooding");

        let r2 = raw("Water", "pending");
        assert_eq!(normalizer.normalize(&r2).title, "Water report");
    }

    #[test]
    fn description_and_image_aliases_resolve() {
        let normalizer = Normalizer::default();
        let mut r = raw("Roads", "pending");
        r.description = Some("burst pipe".to_string());
        r.image = Some("https://img.example/p.jpg".to_string());
        let report = normalizer.normalize(&r);
        assert_eq!(report.user_description.as_deref(), Some("burst pipe"));
        assert_eq!(report.image_url.as_deref(), Some("https://img.example/p.jpg"));
    }

    #[test]
    fn naive_timestamps_use_configured_offset() {
        let normalizer = Normalizer::new(FixedOffset::east_opt(8 * 3600).unwrap());
        let mut r = raw("Roads", "pending");
        r.created_at = Some("2025-09-30T12:00:00".to_string());
        assert_eq!(
            normalizer.normalize(&r).created_at.unwrap(),
            Utc.with_ymd_and_hms(2025, 9, 30, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let normalizer = Normalizer::default();
        let mut r = raw("Roads", "resolved");
        r.resolved_at = Some("2025-10-02T08:30:00+00:00".to_string());
        r.location = Some(serde_json::Value::String("14.6,121.0".to_string()));
        let once = normalizer.normalize(&r);

        let round_tripped: RawReport =
            serde_json::from_value(serde_json::to_value(&once).unwrap()).unwrap();
        let twice = normalizer.normalize(&round_tripped);
        assert_eq!(once, twice);
    }
}
