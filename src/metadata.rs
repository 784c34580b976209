use chrono::{DateTime, NaiveDate};

pub use crate::constants::metadata::{META_FIELD_QUESTION, META_FIELD_SEGMENT, META_FIELD_TIMESTAMP};
use crate::types::SegmentValue;

/// Canonical identifier for response metadata fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetadataKey {
    name: &'static str,
}

impl MetadataKey {
    /// Create a metadata key with a canonical static name.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// Return the raw key name.
    pub const fn as_str(&self) -> &'static str {
        self.name
    }
}

/// Parse a timestamp-like metadata value into a calendar day.
///
/// Accepts RFC 3339 timestamps (`2025-02-25T09:30:00Z`), `YYYY-MM-DD HH:MM:SS`
/// and bare ISO dates (`2025-02-25`). The date of an RFC 3339 value is taken
/// in its own offset, not converted to UTC.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Render a metadata timestamp as its ISO day bucket (`2025-02-25`).
pub fn day_bucket(value: &str) -> Option<SegmentValue> {
    parse_day(value).map(|day| day.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_keys_expose_names() {
        assert_eq!(META_FIELD_SEGMENT.as_str(), "segment");
        assert_eq!(META_FIELD_QUESTION.as_str(), "question_id");
        assert_eq!(META_FIELD_TIMESTAMP.as_str(), "timestamp");

        const CUSTOM: MetadataKey = MetadataKey::new("plan_tier");
        assert_eq!(CUSTOM.as_str(), "plan_tier");
    }

    #[test]
    fn parse_day_accepts_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 2, 25).unwrap();
        assert_eq!(parse_day("2025-02-25T09:30:00Z"), Some(expected));
        assert_eq!(parse_day("2025-02-25T23:30:00-05:00"), Some(expected));
        assert_eq!(parse_day("2025-02-25 09:30:00"), Some(expected));
        assert_eq!(parse_day(" 2025-02-25 "), Some(expected));
        assert_eq!(parse_day("Feb 25"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn day_bucket_renders_iso_date() {
        assert_eq!(
            day_bucket("2024-10-15T12:00:00+02:00").as_deref(),
            Some("2024-10-15")
        );
        assert_eq!(day_bucket("not a date"), None);
    }
}
