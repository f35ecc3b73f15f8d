//! Timestamp parsing and formatting for series files and config windows.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats tried in order when a timestamp carries a time of day.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Formats tried in order for plain calendar dates (midnight is assumed).
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse a timestamp string.
///
/// Accepts RFC 3339 (converted to UTC and stripped of its offset), the
/// date-time formats in [`DATETIME_FORMATS`] and the plain dates in
/// [`DATE_FORMATS`].
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }

    for &fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt);
        }
    }

    for &fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }

    bail!("unrecognized timestamp {value:?}");
}

/// Format a timestamp the way the dashboard labels its axes.
///
/// Midnight timestamps are shown as plain dates.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.time() == chrono::NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Serde adapter for timestamps written as strings in config and series files.
pub mod serde_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(|e| D::Error::custom(format!("{e:#}")))
    }
}

/// Serde adapter for lists of timestamps, written like [`serde_timestamp`].
pub mod serde_timestamps {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        ts: &[NaiveDateTime],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(ts.iter().map(super::format_timestamp))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NaiveDateTime>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|raw| super::parse_timestamp(raw).map_err(|e| D::Error::custom(format!("{e:#}"))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates_as_midnight() {
        let ts = parse_timestamp("2024-03-05").unwrap();
        assert_eq!(ts, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(parse_timestamp("03/05/2024").unwrap(), ts);
    }

    #[test]
    fn parses_rfc3339_in_utc() {
        let ts = parse_timestamp("2026-02-10T22:26:28+02:00").unwrap();
        assert_eq!(format_timestamp(&ts), "2026-02-10 20:26:28");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Stamps {
        #[serde(with = "serde_timestamp")]
        at: NaiveDateTime,
        #[serde(with = "serde_timestamps")]
        all: Vec<NaiveDateTime>,
    }

    #[test]
    fn single_and_list_adapters_agree() {
        let at = parse_timestamp("2024-07-01").unwrap();
        let later = parse_timestamp("2024-07-01 06:30:00").unwrap();
        let stamps = Stamps { at, all: vec![at, later] };

        let json = serde_json::to_string(&stamps).unwrap();
        assert_eq!(json, r#"{"at":"2024-07-01","all":["2024-07-01","2024-07-01 06:30:00"]}"#);
        assert_eq!(serde_json::from_str::<Stamps>(&json).unwrap(), stamps);
    }

    #[test]
    fn formats_midnight_as_date() {
        let ts = parse_timestamp("2024-01-02 00:00:00").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02");
    }
}
