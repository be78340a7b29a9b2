//! Core Data Models
//!
//! The data structures shared by every stage of the reconciliation pipeline.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`JobEvent`] - one well-formed log line
//! 2. **Accumulation**: [`JobStatus`] - the START/END times observed for a job
//! 3. **Output**: [`JobReport`] - the classified outcome for a job
//!
//! [`Severity`] is shared by job classification and line diagnostics so the
//! report writer can color both the same way.

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two lifecycle markers a job emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Start,
    End,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Start => "START",
            EventStatus::End => "END",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    /// Status values are case-sensitive, matching what job runners emit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "START" => Ok(EventStatus::Start),
            "END" => Ok(EventStatus::End),
            other => Err(other.to_string()),
        }
    }
}

/// A single parsed log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub timestamp: NaiveTime,
    pub description: String,
    pub status: EventStatus,
    pub job_id: String,
}

/// The START/END times observed so far for one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStatus {
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl JobStatus {
    /// Record a timestamp for the given marker, returning the value it replaced.
    pub fn record(&mut self, status: EventStatus, timestamp: NaiveTime) -> Option<NaiveTime> {
        let slot = match status {
            EventStatus::Start => &mut self.start,
            EventStatus::End => &mut self.end,
        };
        slot.replace(timestamp)
    }

    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// The marker still missing, or `None` once both are present.
    ///
    /// A status is only ever created by recording an event, so at least one
    /// side is always populated.
    pub fn missing(&self) -> Option<EventStatus> {
        match (self.start, self.end) {
            (Some(_), None) => Some(EventStatus::End),
            (None, Some(_)) => Some(EventStatus::Start),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// The outcome reported for one job id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobReport {
    Completed {
        job_id: String,
        duration: TimeDelta,
        severity: Severity,
    },
    Incomplete {
        job_id: String,
        missing: EventStatus,
    },
}

impl JobReport {
    pub fn job_id(&self) -> &str {
        match self {
            JobReport::Completed { job_id, .. } | JobReport::Incomplete { job_id, .. } => job_id,
        }
    }
}

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub lines_read: usize,
    pub blank_lines: usize,
    pub events_applied: usize,
    pub lines_skipped: usize,
    pub jobs: usize,
    pub completed_jobs: usize,
    pub incomplete_jobs: usize,
    pub read_error: bool,
}
