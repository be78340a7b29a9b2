//! Duration computation and latency classification.

use crate::models::Severity;
use chrono::{NaiveTime, TimeDelta};

pub const DEFAULT_WARNING_MINUTES: u32 = 5;
pub const DEFAULT_ERROR_MINUTES: u32 = 10;

/// Elapsed time between two times of day.
///
/// Timestamps carry no date, so an end earlier than the start is taken to
/// mean the job ran across midnight.
pub fn calculate_duration(start: NaiveTime, end: NaiveTime) -> TimeDelta {
    let duration = end.signed_duration_since(start);
    if duration < TimeDelta::zero() {
        duration + TimeDelta::hours(24)
    } else {
        duration
    }
}

/// Compact elapsed-time rendering: `0s`, `45s`, `2m15s`, `1h30m0s`.
pub fn format_duration(duration: TimeDelta) -> String {
    let total_secs = duration.num_seconds().max(0);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Latency limits, in whole minutes, above which a job is flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub warning_minutes: u32,
    pub error_minutes: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning_minutes: DEFAULT_WARNING_MINUTES,
            error_minutes: DEFAULT_ERROR_MINUTES,
        }
    }
}

impl Thresholds {
    pub fn new(warning_minutes: u32, error_minutes: u32) -> Self {
        Self {
            warning_minutes,
            error_minutes,
        }
    }

    pub fn warning(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.warning_minutes))
    }

    pub fn error(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.error_minutes))
    }

    /// Strictly greater-than: a job of exactly the limit is not flagged.
    pub fn classify(&self, duration: TimeDelta) -> Severity {
        if duration > self.error() {
            Severity::Error
        } else if duration > self.warning() {
            Severity::Warning
        } else {
            Severity::Info
        }
    }
}
