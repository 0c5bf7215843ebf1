use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{NaiveDateTime, TimeDelta};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
];

const MINUTE: u64 = 60;
const HOUR: u64 = 3_600;
const DAY: u64 = 86_400;

/// Parse duration strings like "10s", "500ms", "1.5s", "2m"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.parse()?;
            if val < 0.0 || !val.is_finite() {
                bail!("Duration must be a non-negative number: {}", s);
            }
            return Ok(Duration::from_nanos((val * multiplier) as u64));
        }
    }

    bail!("Unknown duration format: {}", s)
}

/// Format a number of seconds compactly (e.g. "2h 05m", "45s").
pub fn format_seconds(secs: u64) -> String {
    if secs >= DAY {
        format!("{}d {:02}h", secs / DAY, (secs % DAY) / HOUR)
    } else if secs >= HOUR {
        format!("{}h {:02}m", secs / HOUR, (secs % HOUR) / MINUTE)
    } else if secs >= MINUTE {
        format!("{}m {:02}s", secs / MINUTE, secs % MINUTE)
    } else {
        format!("{}s", secs)
    }
}

/// Human-readable completion estimate, `remaining_secs` from `now`.
///
/// The wording coarsens with the horizon: minutes and a clock time within
/// the hour, hours and a clock time plus day within the day, days and a
/// date beyond that. A date past the calendar's range is left out.
pub fn format_eta(remaining_secs: u64, now: NaiveDateTime) -> String {
    let eta = i64::try_from(remaining_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| now.checked_add_signed(delta));

    match eta {
        Some(eta) if remaining_secs < HOUR => {
            format!("{} minutes ({})", remaining_secs / MINUTE, eta.format("%H:%M"))
        }
        Some(eta) if remaining_secs < DAY => {
            format!("{} hours ({})", remaining_secs / HOUR, eta.format("%H:%M on %d/%m"))
        }
        Some(eta) => format!("{} days ({})", remaining_secs / DAY, eta.format("%d/%m/%Y")),
        None => format!("{} days", remaining_secs / DAY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_seconds() {
        let d = parse_duration("10s").unwrap();
        assert_eq!(d, Duration::from_secs(10));
    }

    #[test]
    fn test_parse_milliseconds() {
        let d = parse_duration("988.82775ms").unwrap();
        assert!((d.as_secs_f64() - 0.98882775).abs() < 0.0001);
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0), "0s");
        assert_eq!(format_seconds(59), "59s");
        assert_eq!(format_seconds(61), "1m 01s");
        assert_eq!(format_seconds(7_500), "2h 05m");
        assert_eq!(format_seconds(90_000), "1d 01h");
    }

    #[test]
    fn test_eta_within_the_hour() {
        assert_eq!(format_eta(1_800, noon()), "30 minutes (12:30)");
        assert_eq!(format_eta(3_599, noon()), "59 minutes (12:59)");
    }

    #[test]
    fn test_eta_within_the_day() {
        assert_eq!(format_eta(3_600, noon()), "1 hours (13:00 on 09/03)");
        assert_eq!(format_eta(43_200, noon()), "12 hours (00:00 on 10/03)");
    }

    #[test]
    fn test_eta_beyond_a_day() {
        assert_eq!(format_eta(86_400, noon()), "1 days (10/03/2024)");
        assert_eq!(format_eta(3 * 86_400 + 5, noon()), "3 days (12/03/2024)");
    }

    #[test]
    fn test_eta_past_calendar_range_has_no_date() {
        assert_eq!(format_eta(u64::MAX, noon()), format!("{} days", u64::MAX / DAY));
        // Representable as a delta, but the date would overflow
        let far = 300_000 * 365 * DAY;
        assert_eq!(format_eta(far, noon()), format!("{} days", far / DAY));
    }
}
