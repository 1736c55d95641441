//! Timestamp utilities

use chrono::{Local, NaiveDateTime};

/// Format used for emitted timestamps: local date-time without offset,
/// fractional seconds printed as 3, 6 or 9 digits (omitted when zero).
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Current local wall-clock time
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Render a local date-time in the emitted line format
pub fn format_local(timestamp: &NaiveDateTime) -> String {
    timestamp.format(LOCAL_TIMESTAMP_FORMAT).to_string()
}

/// Current local time, already rendered
pub fn local_timestamp() -> String {
    format_local(&now_local())
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn at(h: u32, m: u32, s: u32, nanos: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_nano_opt(h, m, s, nanos)
            .unwrap()
    }

    #[test]
    fn test_format_whole_seconds_has_no_fraction() {
        assert_eq!(format_local(&at(14, 3, 7, 0)), "2026-10-19T14:03:07");
    }

    #[test]
    fn test_format_millisecond_precision() {
        assert_eq!(format_local(&at(14, 3, 7, 120_000_000)), "2026-10-19T14:03:07.120");
    }

    #[test]
    fn test_format_microsecond_precision() {
        assert_eq!(format_local(&at(9, 0, 0, 123_456_000)), "2026-10-19T09:00:00.123456");
    }

    #[test]
    fn test_format_nanosecond_precision() {
        assert_eq!(format_local(&at(23, 59, 59, 1)), "2026-10-19T23:59:59.000000001");
    }

    #[test]
    fn test_local_timestamp_round_trips_through_parser() {
        let rendered = local_timestamp();
        let parsed = NaiveDateTime::parse_from_str(&rendered, LOCAL_TIMESTAMP_FORMAT);
        assert!(parsed.is_ok(), "unparseable timestamp: {}", rendered);
        assert!(!rendered.contains('\n'));
    }

    #[tokio::test]
    async fn test_now_local_successive_calls_advance() {
        let time1 = now_local();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let time2 = now_local();
        assert!(time2 > time1);
    }

    #[test]
    fn test_millis_to_duration() {
        assert_eq!(millis_to_duration(50), Duration::from_millis(50));
        assert_eq!(millis_to_duration(0), Duration::ZERO);
    }
}
