//! Timestamp resolution for chat export headers
//!
//! Export dialects disagree on date order, year width, seconds, and 12/24
//! hour clocks. The raw text is always kept by the caller; this module only
//! produces a comparable point in time.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// `d/m/y, h:mm[:ss][ am|pm]` with `/` or `.` separators and optional brackets
const STRUCTURED_PATTERN: &str = r"(?i)^\s*\[?\s*(\d{1,2})[/.](\d{1,2})[/.](\d{2,4}),?\s+(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s?([ap])\.?\s?m\.?)?\s*\]?\s*$";

const GENERIC_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d, %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%b %d, %Y %I:%M:%S %p",
    "%b %d, %Y %I:%M %p",
];

const GENERIC_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d %b %Y"];

/// Which numeric field comes first in a `x/y/z` date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `31/12/24`
    #[default]
    DayFirst,
    /// `12/31/24`
    MonthFirst,
}

/// How a timestamp was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Matched the export date/time layout
    Structured,
    /// Matched one of the generic date-time layouts
    Generic,
    /// Nothing matched; the current local time was substituted
    WallClock,
}

/// Converts raw header timestamps into local date-times
#[derive(Debug, Clone)]
pub struct TimestampResolver {
    pattern: Regex,
    date_order: DateOrder,
}

impl TimestampResolver {
    /// Create a resolver for the given date order
    pub fn new(date_order: DateOrder) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(STRUCTURED_PATTERN)?,
            date_order,
        })
    }

    /// Resolve a raw timestamp, never failing
    ///
    /// Falls back from the export layout to generic layouts and finally to
    /// the current time. The returned [`Resolution`] tells the caller which
    /// path was taken so it can report the last one.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> (NaiveDateTime, Resolution) {
        if let Some(resolved) = self.resolve_structured(raw) {
            return (resolved, Resolution::Structured);
        }
        if let Some(resolved) = resolve_generic(raw) {
            debug!(timestamp = raw, "Resolved timestamp with generic layout");
            return (resolved, Resolution::Generic);
        }
        (Local::now().naive_local(), Resolution::WallClock)
    }

    /// Resolve using only the export date/time layout
    #[must_use]
    pub fn resolve_structured(&self, raw: &str) -> Option<NaiveDateTime> {
        let caps = self.pattern.captures(raw)?;
        let field = |index: usize| {
            caps.get(index)
                .and_then(|m| m.as_str().parse::<u32>().ok())
        };

        let first = field(1)?;
        let second = field(2)?;
        let year = caps.get(3)?.as_str().parse::<i32>().ok()?;
        let year = if year < 100 { 2000 + year } else { year };

        let hour = to_24_hour(field(4)?, caps.get(7).map(|m| m.as_str()));
        let minute = field(5)?;
        let seconds = field(6).unwrap_or(0);

        let (day, month) = match self.date_order {
            DateOrder::DayFirst => (first, second),
            DateOrder::MonthFirst => (second, first),
        };

        // An impossible date in the configured order is usually the other order
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .or_else(|| NaiveDate::from_ymd_opt(year, day, month))?;

        date.and_hms_opt(hour, minute, seconds)
    }
}

fn to_24_hour(hour: u32, meridiem: Option<&str>) -> u32 {
    match meridiem.map(str::to_ascii_lowercase).as_deref() {
        Some("p") if hour < 12 => hour + 12,
        Some("a") if hour == 12 => 0,
        _ => hour,
    }
}

/// Try RFC 3339 and a fixed list of common layouts
#[must_use]
pub fn resolve_generic(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']').trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Local).naive_local());
    }

    GENERIC_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            GENERIC_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
