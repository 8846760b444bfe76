//! Event windows: a named event's center time widened into `[start, end)`.

use crate::error::{Error, Result};
use crate::types::TimestampSecs;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const SECS_PER_HOUR: i64 = 3_600;

/// Naive layouts accepted for event times, read as UTC.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Widen a center timestamp by `window_hours` on both sides.
#[inline]
pub fn resolve(center: TimestampSecs, window_hours: i64) -> (TimestampSecs, TimestampSecs) {
    let offset = window_hours * SECS_PER_HOUR;
    (center - offset, center + offset)
}

/// Parse an event time into unix seconds.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM` and a bare `YYYY-MM-DD` (midnight).
pub fn parse_event_time(text: &str) -> Result<TimestampSecs> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.timestamp());
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc().timestamp());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().timestamp());
        }
    }

    Err(Error::parse(format!("unrecognized event time `{text}`")))
}

/// A resolved event window. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    /// Event name, used in file names and panel rows.
    pub event_name: String,
    /// Event center time as configured.
    pub event_time: String,
    /// Center timestamp.
    pub center: TimestampSecs,
    /// Inclusive lower bound.
    pub start: TimestampSecs,
    /// Exclusive upper bound.
    pub end: TimestampSecs,
}

impl EventWindow {
    /// Resolve an event's window from its configured time text.
    pub fn resolve(
        event_name: impl Into<String>,
        event_time: impl Into<String>,
        window_hours: i64,
    ) -> Result<Self> {
        if window_hours <= 0 {
            return Err(Error::config(format!(
                "window must be positive, got {window_hours}h"
            )));
        }

        let event_time = event_time.into();
        let center = parse_event_time(&event_time)?;
        let (start, end) = resolve(center, window_hours);

        Ok(Self {
            event_name: event_name.into(),
            event_time,
            center,
            start,
            end,
        })
    }

    /// Build a window from explicit bounds.
    pub fn from_bounds(
        event_name: impl Into<String>,
        event_time: impl Into<String>,
        start: TimestampSecs,
        end: TimestampSecs,
    ) -> Self {
        Self {
            event_name: event_name.into(),
            event_time: event_time.into(),
            center: start + (end - start) / 2,
            start,
            end,
        }
    }

    /// Whether `ts` falls in `[start, end)`.
    #[inline]
    pub fn contains(&self, ts: TimestampSecs) -> bool {
        ts >= self.start && ts < self.end
    }
}
