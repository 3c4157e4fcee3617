//! Decoders for the live feed's native encodings
//!
//! The feed encodes start times as `/Date(1405971945000+0200)/` (epoch
//! milliseconds plus an informational UTC offset) and durations as
//! `PT6M10S`-style tokens.

use crate::error::{ParseError, ParseResult};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static START_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/Date\((-?\d+)(?:[+-]\d{4})?\)/$").expect("start time pattern is valid")
});

/// Parses a feed start time, truncated to whole seconds
///
/// The epoch value is absolute; the trailing offset only describes the
/// broadcaster's local time zone and does not shift the instant.
pub fn parse_start_time(raw: &str) -> ParseResult<DateTime<Utc>> {
    let invalid = || ParseError::InvalidStartTime(raw.to_string());

    let captures = START_TIME_RE.captures(raw.trim()).ok_or_else(invalid)?;
    let millis: i64 = captures[1].parse().map_err(|_| invalid())?;

    DateTime::from_timestamp(millis.div_euclid(1000), 0).ok_or_else(invalid)
}

/// Parses a feed duration such as `PT6M10S`, `PT6M`, `PT10S` or `PT1H2M3.5S`
///
/// The `PT` prefix is optional and matching is case-insensitive. Fractional
/// values are rounded to the millisecond.
pub fn parse_duration(raw: &str) -> ParseResult<Duration> {
    let invalid = || ParseError::InvalidDuration(raw.to_string());

    let lower = raw.trim().to_ascii_lowercase();
    let body = lower.strip_prefix("pt").unwrap_or(&lower);
    if body.is_empty() {
        return Err(invalid());
    }

    let mut seconds = 0.0_f64;
    let mut number = String::new();

    for ch in body.chars() {
        match ch {
            '0'..='9' | '.' => number.push(ch),
            'h' | 'm' | 's' => {
                let value: f64 = number.parse().map_err(|_| invalid())?;
                let factor = match ch {
                    'h' => 3600.0,
                    'm' => 60.0,
                    _ => 1.0,
                };
                seconds += value * factor;
                number.clear();
            }
            _ => return Err(invalid()),
        }
    }

    // A trailing number without a unit ("PT6M10") is malformed.
    if !number.is_empty() {
        return Err(invalid());
    }

    Ok(Duration::from_millis((seconds * 1000.0).round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_time() {
        let start = parse_start_time("/Date(1405971945000+0200)/").unwrap();
        assert_eq!(start, DateTime::from_timestamp(1405971945, 0).unwrap());
    }

    #[test]
    fn test_parse_start_time_truncates_millis() {
        let start = parse_start_time("/Date(1405971945999+0200)/").unwrap();
        assert_eq!(start.timestamp(), 1405971945);
    }

    #[test]
    fn test_parse_start_time_without_offset() {
        let start = parse_start_time("/Date(1405971945000)/").unwrap();
        assert_eq!(start.timestamp(), 1405971945);
    }

    #[test]
    fn test_parse_start_time_rejects_garbage() {
        for raw in ["", "1405971945000", "/Date(abc+0200)/", "2014-07-21T19:45:45Z"] {
            assert!(
                matches!(parse_start_time(raw), Err(ParseError::InvalidStartTime(_))),
                "{raw} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_duration_minutes_and_seconds() {
        assert_eq!(parse_duration("PT6M10S").unwrap(), Duration::from_secs(370));
    }

    #[test]
    fn test_parse_duration_without_seconds() {
        assert_eq!(parse_duration("PT6M").unwrap(), Duration::from_secs(360));
    }

    #[test]
    fn test_parse_duration_without_minutes() {
        assert_eq!(parse_duration("PT10S").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_duration_hours_and_fraction() {
        assert_eq!(
            parse_duration("pt1h2m3.5s").unwrap(),
            Duration::from_millis(3_723_500)
        );
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        for raw in ["", "PT", "PT6X", "PT6M10", "six minutes", "PT..S"] {
            assert!(
                matches!(parse_duration(raw), Err(ParseError::InvalidDuration(_))),
                "{raw} should not parse"
            );
        }
    }
}
