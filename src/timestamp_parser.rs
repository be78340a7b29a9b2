use anyhow::Result;
use chrono::{NaiveTime, Timelike};

/// 24-hour wall-clock layout used by job activity logs.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Handles parsing the time-of-day stamps written at the start of each log line
pub struct TimestampParser;

impl TimestampParser {
    /// Parse an `HH:MM:SS` string into a time of day with no date attached
    pub fn parse(timestamp_str: &str) -> Result<NaiveTime> {
        if !Self::has_clock_shape(timestamp_str) {
            anyhow::bail!("expected HH:MM:SS");
        }

        let time = NaiveTime::parse_from_str(timestamp_str, TIME_FORMAT)
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        // chrono accepts ":60" as a leap second; a job log never means that
        if time.nanosecond() >= 1_000_000_000 {
            anyhow::bail!("second out of range");
        }

        Ok(time)
    }

    /// One or two hour digits, exactly two minute and second digits.
    ///
    /// chrono alone would accept single-digit minutes and seconds.
    fn has_clock_shape(timestamp_str: &str) -> bool {
        let digits = |s: &str, min: usize, max: usize| {
            (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
        };

        let mut parts = timestamp_str.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(m), Some(s), None) => {
                digits(h, 1, 2) && digits(m, 2, 2) && digits(s, 2, 2)
            }
            _ => false,
        }
    }

    pub fn format(time: &NaiveTime) -> String {
        time.format(TIME_FORMAT).to_string()
    }
}
