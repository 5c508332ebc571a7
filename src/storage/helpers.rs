//! Shared storage helper functions.
//!
//! Timestamp normalisation and text encodings used by every backend, so that
//! a record read back from SQLite, PostgreSQL or memory compares equal.

use chrono::{DateTime, SubsecRound, Utc};

use super::Result;
use crate::models::Timestamp;

/// Fixed-width RFC3339 layout; sorts lexicographically in TEXT columns.
const TEXT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Current time at microsecond precision (what PostgreSQL stores).
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}

/// Truncate a caller-supplied timestamp to storable precision.
pub fn normalize(ts: Timestamp) -> Timestamp {
    ts.trunc_subsecs(6)
}

/// Encode a timestamp for a TEXT column.
pub fn ts_to_text(ts: &Timestamp) -> String {
    ts.format(TEXT_TIMESTAMP_FORMAT).to_string()
}

/// Decode a timestamp written by [`ts_to_text`] (or any RFC3339 string).
pub fn ts_from_text(text: &str) -> Result<Timestamp> {
    Ok(DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc))
}

pub fn opt_ts_from_text(text: Option<String>) -> Result<Option<Timestamp>> {
    text.as_deref().map(ts_from_text).transpose()
}

/// Encode a list of strings as a JSON array for a TEXT column.
pub fn strings_to_json(values: &[String]) -> Result<String> {
    Ok(serde_json::to_string(values)?)
}

pub fn strings_from_json(text: &str) -> Result<Vec<String>> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text_round_trip() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let text = ts_to_text(&ts);
        assert_eq!(text, "2024-03-09T14:05:07.000000Z");
        assert_eq!(ts_from_text(&text).unwrap(), ts);
    }

    #[test]
    fn test_text_sorts_chronologically() {
        let early = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 11, 2, 3, 4, 5).unwrap();
        assert!(ts_to_text(&early) < ts_to_text(&late));
    }

    #[test]
    fn test_now_has_micro_precision() {
        let ts = now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000, 0);
        assert_eq!(ts_from_text(&ts_to_text(&ts)).unwrap(), ts);
    }

    #[test]
    fn test_strings_json_round_trip() {
        let perms = vec!["orders:write".to_string(), "impact:write".to_string()];
        let text = strings_to_json(&perms).unwrap();
        assert_eq!(strings_from_json(&text).unwrap(), perms);
    }

    #[test]
    fn test_bad_timestamp_is_serialization_error() {
        assert!(matches!(
            ts_from_text("yesterday"),
            Err(crate::storage::StorageError::Serialization(_))
        ));
    }
}
