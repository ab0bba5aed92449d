//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::utils::errors::{BaropotError, Result};

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date pattern"))
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2}:\d{2}$").expect("static time pattern"))
}

/// Parse a `yyyy-MM-dd` calendar date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    if !date_pattern().is_match(value) {
        return Err(BaropotError::validation(format!("date must be yyyy-MM-dd: {value}")));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| BaropotError::validation(format!("invalid date: {value}")))
}

/// Parse an `HH:mm` wall-clock time
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    if !time_pattern().is_match(value) {
        return Err(BaropotError::validation(format!("time must be HH:mm: {value}")));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| BaropotError::validation(format!("invalid time: {value}")))
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Combine a date and time into a naive local timestamp
pub fn combine(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

/// Trim and drop empty or duplicate tag names, keeping first-seen order
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.iter()
        .map(|t| normalize_whitespace(t))
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@') && email.contains('.') && email.len() > 5
}

/// Validate phone number format (basic validation)
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
        && phone.len() >= 9
}

/// `HH:mm` (de)serialization for `NaiveTime` fields
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }

    /// Same format for optional fields
    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => serializer.serialize_some(&super::super::format_time(*t)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::super::parse_time(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// Accept a query-string list given as a comma-separated value
pub fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-06-22").unwrap(), NaiveDate::from_ymd_opt(2025, 6, 22).unwrap());
        assert_matches!(parse_date("2025-6-22"), Err(BaropotError::Validation(_)));
        assert_matches!(parse_date("2025-02-30"), Err(BaropotError::Validation(_)));
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("12:00").unwrap(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_matches!(parse_time("9:00"), Err(BaropotError::Validation(_)));
        assert_matches!(parse_time("25:00"), Err(BaropotError::Validation(_)));
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![" 곱창 ".to_string(), "".to_string(), "곱창".to_string(), "순대".to_string()];
        assert_eq!(normalize_tags(&tags), vec!["곱창", "순대"]);
    }

    #[test]
    fn test_split_csv() {
        assert_eq!(split_csv(Some("OPEN, FULL,")), vec!["OPEN", "FULL"]);
        assert!(split_csv(None).is_empty());
    }

    #[test]
    fn test_hh_mm_serde() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Slot {
            #[serde(with = "hh_mm")]
            at: NaiveTime,
        }

        let slot: Slot = serde_json::from_str(r#"{"at":"18:30"}"#).unwrap();
        assert_eq!(serde_json::to_string(&slot).unwrap(), r#"{"at":"18:30"}"#);
        assert!(serde_json::from_str::<Slot>(r#"{"at":"18:30:00"}"#).is_err());
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("diner@example.com"));
        assert!(!is_valid_email("diner"));
    }
}
