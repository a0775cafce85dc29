//! Shared timestamp and coordinate parsing for report documents.
//!
//! The report store hands timestamps back as strings in several shapes
//! (RFC 3339 with offset, naive ISO 8601 with or without fractional
//! seconds, bare dates) depending on which client wrote the document.
//! All parsing here is lossy-tolerant: a value that cannot be parsed
//! yields `None` rather than an error.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Parses a stored timestamp string into a UTC instant.
///
/// Offset-carrying strings are honored as written; naive strings are
/// interpreted in `default_offset` and converted to UTC.
#[must_use]
pub fn parse_timestamp(s: &str, default_offset: FixedOffset) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return localize(naive, default_offset);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return localize(date.and_hms_opt(0, 0, 0).unwrap_or_default(), default_offset);
    }
    None
}

fn localize(naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    naive
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses a `"lat,lng"` string into a coordinate pair. Returns `None`
/// unless the string splits into exactly two parseable floats.
#[must_use]
pub fn parse_lat_lng_str(s: &str) -> Option<(f64, f64)> {
    let mut parts = s.split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lng = parts.next()?.trim().parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((lat, lng))
}

/// Extracts a coordinate pair from a geopoint-style JSON object exposing
/// `latitude`/`longitude` numbers.
#[must_use]
pub fn parse_geopoint(value: &serde_json::Value) -> Option<(f64, f64)> {
    let lat = value.get("latitude")?.as_f64()?;
    let lng = value.get("longitude")?.as_f64()?;
    Some((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn utc_offset() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_timestamp("2025-09-30T12:00:00+08:00", utc_offset()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 9, 30, 4, 0, 0).unwrap());
    }

    #[test]
    fn parses_naive_in_default_offset() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let dt = parse_timestamp("2025-09-30T12:00:00", offset).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 9, 30, 4, 0, 0).unwrap());
    }

    #[test]
    fn parses_naive_with_fractional_seconds() {
        let dt = parse_timestamp("2025-09-30T12:00:00.123456", utc_offset()).unwrap();
        assert_eq!(dt.timestamp(), 1_759_233_600);
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let dt = parse_timestamp("2025-09-30", utc_offset()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(parse_timestamp("not-a-date", utc_offset()).is_none());
        assert!(parse_timestamp("", utc_offset()).is_none());
    }

    #[test]
    fn parses_lat_lng_string() {
        let (lat, lng) = parse_lat_lng_str("14.5995, 120.9842").unwrap();
        assert!((lat - 14.5995).abs() < f64::EPSILON);
        assert!((lng - 120.9842).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_lat_lng_with_extra_components() {
        assert!(parse_lat_lng_str("14.5,120.9,7.3").is_none());
    }

    #[test]
    fn rejects_unparseable_lat_lng() {
        assert!(parse_lat_lng_str("somewhere downtown").is_none());
        assert!(parse_lat_lng_str("14.5,").is_none());
    }

    #[test]
    fn parses_geopoint_object() {
        let value = serde_json::json!({"latitude": 14.6, "longitude": 121.0});
        let (lat, lng) = parse_geopoint(&value).unwrap();
        assert!((lat - 14.6).abs() < f64::EPSILON);
        assert!((lng - 121.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_geopoint_missing_longitude() {
        let value = serde_json::json!({"latitude": 14.6});
        assert!(parse_geopoint(&value).is_none());
    }
}
