//! Reconciler
//!
//! Pairs START and END events by job id and turns each pair into a classified
//! [`JobReport`]. The registry is owned by the [`Reconciler`] for the length of
//! one run; nothing is shared between runs.
//!
//! ## Reporting strategies
//!
//! - [`ReportMode::Incremental`]: a job is reported the moment its second
//!   marker arrives. [`Reconciler::finish`] then only reports jobs that never
//!   completed.
//! - [`ReportMode::Final`]: nothing is reported until [`Reconciler::finish`],
//!   which reports every job once.
//!
//! Both strategies classify with the same [`Thresholds`].
//!
//! The registry is a `BTreeMap`, so final-pass output is ordered by job id and
//! identical across reruns of the same input.

use crate::duration::{calculate_duration, Thresholds};
use crate::models::{EventStatus, JobEvent, JobReport, JobStatus};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    Incremental,
    #[default]
    Final,
}

/// What to do when a job reports the same marker twice.
///
/// The later timestamp always wins; the policy only controls whether the
/// overwrite is surfaced to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    #[default]
    Overwrite,
    Warn,
}

/// A marker that replaced an earlier value for the same job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced {
    pub job_id: String,
    pub status: EventStatus,
    pub previous: NaiveTime,
    pub current: NaiveTime,
}

/// Result of applying one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    pub replaced: Option<Replaced>,
    /// Only ever set in incremental mode.
    pub report: Option<JobReport>,
}

pub struct Reconciler {
    registry: BTreeMap<String, JobStatus>,
    mode: ReportMode,
    thresholds: Thresholds,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReportMode::default(), Thresholds::default())
    }
}

impl Reconciler {
    pub fn new(mode: ReportMode, thresholds: Thresholds) -> Self {
        Self {
            registry: BTreeMap::new(),
            mode,
            thresholds,
        }
    }

    pub fn apply(&mut self, event: &JobEvent) -> Update {
        let status = self.registry.entry(event.job_id.clone()).or_default();
        let previous = status.record(event.status, event.timestamp);

        let replaced = previous.map(|previous| {
            debug!(
                job_id = %event.job_id,
                status = %event.status,
                %previous,
                current = %event.timestamp,
                "Overwriting earlier marker"
            );
            Replaced {
                job_id: event.job_id.clone(),
                status: event.status,
                previous,
                current: event.timestamp,
            }
        });

        let report = match self.mode {
            ReportMode::Incremental if status.is_complete() => {
                Some(Self::report_for(&self.thresholds, &event.job_id, status))
            }
            _ => None,
        };

        Update { replaced, report }
    }

    /// Consume the reconciler and emit the end-of-run reports.
    pub fn finish(self) -> Vec<JobReport> {
        let thresholds = self.thresholds;
        let mode = self.mode;

        self.registry
            .iter()
            .filter(|(_, status)| mode == ReportMode::Final || !status.is_complete())
            .map(|(job_id, status)| Self::report_for(&thresholds, job_id, status))
            .collect()
    }

    pub fn get(&self, job_id: &str) -> Option<&JobStatus> {
        self.registry.get(job_id)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.registry.values().filter(|s| s.is_complete()).count()
    }

    fn report_for(thresholds: &Thresholds, job_id: &str, status: &JobStatus) -> JobReport {
        match (status.start, status.end) {
            (Some(start), Some(end)) => {
                let duration = calculate_duration(start, end);
                JobReport::Completed {
                    job_id: job_id.to_string(),
                    duration,
                    severity: thresholds.classify(duration),
                }
            }
            _ => JobReport::Incomplete {
                job_id: job_id.to_string(),
                missing: status.missing().unwrap_or(EventStatus::Start),
            },
        }
    }
}
