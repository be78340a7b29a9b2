//! Line Parser
//!
//! Turns one raw log line of the form `HH:MM:SS,description,STATUS,job_id`
//! into a [`JobEvent`]. Fields are trimmed; commas cannot be escaped, so a
//! description containing a comma produces a field-count error.

use crate::models::{EventStatus, JobEvent};
use crate::timestamp_parser::TimestampParser;
use thiserror::Error;

/// Number of comma-separated fields in a well-formed line.
pub const FIELD_COUNT: usize = 4;

pub const DELIMITER: char = ',';

/// Why a line could not be turned into an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("Invalid log line: {line}")]
    FieldCount { line: String, found: usize },
    #[error("Error parsing timestamp '{raw}': {reason}")]
    Timestamp { raw: String, reason: String },
    #[error("Status Unknown '{status}'")]
    UnknownStatus { status: String },
}

impl LineError {
    /// Unknown statuses are tolerated; everything else is a hard skip.
    pub fn is_warning(&self) -> bool {
        matches!(self, LineError::UnknownStatus { .. })
    }
}

pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(DELIMITER).map(str::trim).collect()
}

pub fn parse_line(line: &str) -> Result<JobEvent, LineError> {
    let fields = split_fields(line);
    if fields.len() != FIELD_COUNT {
        return Err(LineError::FieldCount {
            line: line.to_string(),
            found: fields.len(),
        });
    }

    let (raw_timestamp, description, raw_status, job_id) =
        (fields[0], fields[1], fields[2], fields[3]);

    let timestamp = TimestampParser::parse(raw_timestamp).map_err(|e| LineError::Timestamp {
        raw: raw_timestamp.to_string(),
        reason: e.to_string(),
    })?;

    let status = raw_status
        .parse::<EventStatus>()
        .map_err(|status| LineError::UnknownStatus { status })?;

    Ok(JobEvent {
        timestamp,
        description: description.to_string(),
        status,
        job_id: job_id.to_string(),
    })
}
