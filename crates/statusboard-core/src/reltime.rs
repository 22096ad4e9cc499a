//! Human-relative phrasing of timestamps ("3 minutes ago", "in 2 hours").

use chrono::{DateTime, Utc};

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3600.0;
const DAY: f64 = 86400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
}

impl Unit {
    fn name(self) -> &'static str {
        match self {
            Unit::Second => "second",
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::Day => "day",
        }
    }
}

/// Round half towards positive infinity, matching how browsers round.
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Phrase `timestamp` relative to `now`. Past and future are symmetric.
pub fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let offset_ms = (timestamp - now).num_milliseconds() as f64;
    let seconds = round_half_up(offset_ms / 1000.0);
    let abs = seconds.unsigned_abs() as f64;
    let seconds = seconds as f64;

    let (value, unit) = if abs < MINUTE {
        (seconds as i64, Unit::Second)
    } else if abs < HOUR {
        (round_half_up(seconds / MINUTE), Unit::Minute)
    } else if abs < DAY {
        (round_half_up(seconds / HOUR), Unit::Hour)
    } else {
        (round_half_up(seconds / DAY), Unit::Day)
    };

    phrase(value, unit)
}

/// Parse an RFC 3339 timestamp and phrase it; `None` if it does not parse.
pub fn format_relative_str(timestamp: &str, now: DateTime<Utc>) -> Option<String> {
    DateTime::parse_from_rfc3339(timestamp.trim())
        .ok()
        .map(|ts| format_relative(ts.with_timezone(&Utc), now))
}

fn phrase(value: i64, unit: Unit) -> String {
    match (value, unit) {
        (0, Unit::Second) => return "now".to_string(),
        (0, Unit::Day) => return "today".to_string(),
        (0, other) => return format!("this {}", other.name()),
        (1, Unit::Day) => return "tomorrow".to_string(),
        (-1, Unit::Day) => return "yesterday".to_string(),
        _ => {}
    }

    let count = value.unsigned_abs();
    let plural = if count == 1 { "" } else { "s" };
    if value > 0 {
        format!("in {} {}{}", count, unit.name(), plural)
    } else {
        format!("{} {}{} ago", count, unit.name(), plural)
    }
}
