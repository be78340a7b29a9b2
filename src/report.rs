//! Output Formatting
//!
//! Renders diagnostics and job reports, one record per line, either as the
//! human-readable text lines users grep for or as JSON lines for tooling.
//!
//! ### Text lines
//! - `Invalid log line: <line>`
//! - `Error parsing timestamp '<raw>': <reason>`
//! - `Status Unknown '<status>'`
//! - `Incomplete job <id>: missing <START|END>`
//! - `Error: Job <id> took longer than 10 minutes: <duration>`
//! - `Warning: Job <id> took longer than 5 minutes: <duration>`
//! - `Job <id> duration: <duration>`
//!
//! Diagnostics tied to an input line are prefixed with `line <n>: ` when line
//! numbers are enabled. Color is applied per line by severity.

use crate::duration::{format_duration, Thresholds};
use crate::models::{EventStatus, JobReport, Severity};
use crate::parser::LineError;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::{self, IsTerminal, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(&self) -> bool {
        match self {
            ColorChoice::Auto => io::stdout().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub json: bool,
    pub color: bool,
    pub line_numbers: bool,
    pub thresholds: Thresholds,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            json: false,
            color: false,
            line_numbers: true,
            thresholds: Thresholds::default(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record<'a> {
    Job {
        job_id: &'a str,
        severity: Severity,
        duration: String,
        duration_secs: i64,
        message: String,
    },
    Incomplete {
        job_id: &'a str,
        missing: EventStatus,
        message: String,
    },
    Diagnostic {
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<usize>,
        severity: Severity,
        message: &'a str,
    },
}

/// Text for a job report, without color or line prefix.
pub fn render_report(report: &JobReport, thresholds: &Thresholds) -> String {
    match report {
        JobReport::Completed {
            job_id,
            duration,
            severity,
        } => {
            let duration = format_duration(*duration);
            match severity {
                Severity::Error => format!(
                    "Error: Job {} took longer than {} minutes: {}",
                    job_id, thresholds.error_minutes, duration
                ),
                Severity::Warning => format!(
                    "Warning: Job {} took longer than {} minutes: {}",
                    job_id, thresholds.warning_minutes, duration
                ),
                Severity::Info => format!("Job {} duration: {}", job_id, duration),
            }
        }
        JobReport::Incomplete { job_id, missing } => {
            format!("Incomplete job {}: missing {}", job_id, missing)
        }
    }
}

pub struct ReportWriter<W: Write> {
    out: W,
    options: ReportOptions,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W, options: ReportOptions) -> Self {
        Self { out, options }
    }

    pub fn write_line_error(&mut self, line_number: usize, error: &LineError) -> io::Result<()> {
        let severity = if error.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        };
        self.write_diagnostic(Some(line_number), severity, &error.to_string())
    }

    pub fn write_diagnostic(
        &mut self,
        line_number: Option<usize>,
        severity: Severity,
        message: &str,
    ) -> io::Result<()> {
        if self.options.json {
            return self.write_json(&Record::Diagnostic {
                line: line_number,
                severity,
                message,
            });
        }

        let text = match line_number {
            Some(n) if self.options.line_numbers => format!("line {}: {}", n, message),
            _ => message.to_string(),
        };
        self.write_text(&text, severity)
    }

    pub fn write_report(&mut self, report: &JobReport) -> io::Result<()> {
        let message = render_report(report, &self.options.thresholds);

        if self.options.json {
            let record = match report {
                JobReport::Completed {
                    job_id,
                    duration,
                    severity,
                } => Record::Job {
                    job_id,
                    severity: *severity,
                    duration: format_duration(*duration),
                    duration_secs: duration.num_seconds(),
                    message,
                },
                JobReport::Incomplete { job_id, missing } => Record::Incomplete {
                    job_id,
                    missing: *missing,
                    message,
                },
            };
            return self.write_json(&record);
        }

        let severity = match report {
            JobReport::Completed { severity, .. } => *severity,
            JobReport::Incomplete { .. } => Severity::Warning,
        };
        self.write_text(&message, severity)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_text(&mut self, text: &str, severity: Severity) -> io::Result<()> {
        if !self.options.color {
            return writeln!(self.out, "{}", text);
        }
        match severity {
            Severity::Error => writeln!(self.out, "{}", text.red()),
            Severity::Warning => writeln!(self.out, "{}", text.yellow()),
            Severity::Info => writeln!(self.out, "{}", text),
        }
    }

    fn write_json(&mut self, record: &Record<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn completed(id: &str, minutes: i64, severity: Severity) -> JobReport {
        JobReport::Completed {
            job_id: id.to_string(),
            duration: TimeDelta::minutes(minutes),
            severity,
        }
    }

    fn render_all(options: ReportOptions, f: impl FnOnce(&mut ReportWriter<Vec<u8>>)) -> String {
        let mut writer = ReportWriter::new(Vec::new(), options);
        f(&mut writer);
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_render_report_lines() {
        let thresholds = Thresholds::default();
        assert_eq!(
            render_report(&completed("7", 11, Severity::Error), &thresholds),
            "Error: Job 7 took longer than 10 minutes: 11m0s"
        );
        assert_eq!(
            render_report(&completed("7", 6, Severity::Warning), &thresholds),
            "Warning: Job 7 took longer than 5 minutes: 6m0s"
        );
        assert_eq!(
            render_report(&completed("7", 3, Severity::Info), &thresholds),
            "Job 7 duration: 3m0s"
        );
        assert_eq!(
            render_report(
                &JobReport::Incomplete {
                    job_id: "7".to_string(),
                    missing: EventStatus::End
                },
                &thresholds
            ),
            "Incomplete job 7: missing END"
        );
    }

    #[test]
    fn test_render_report_uses_configured_thresholds() {
        let thresholds = Thresholds::new(2, 4);
        assert_eq!(
            render_report(&completed("x", 5, Severity::Error), &thresholds),
            "Error: Job x took longer than 4 minutes: 5m0s"
        );
    }

    #[test]
    fn test_diagnostic_line_numbers() {
        let error = LineError::UnknownStatus {
            status: "PAUSE".to_string(),
        };
        let output = render_all(ReportOptions::default(), |w| {
            w.write_line_error(3, &error).unwrap();
        });
        assert_eq!(output, "line 3: Status Unknown 'PAUSE'\n");

        let options = ReportOptions {
            line_numbers: false,
            ..ReportOptions::default()
        };
        let output = render_all(options, |w| {
            w.write_line_error(3, &error).unwrap();
        });
        assert_eq!(output, "Status Unknown 'PAUSE'\n");
    }

    #[test]
    fn test_json_records() {
        let options = ReportOptions {
            json: true,
            ..ReportOptions::default()
        };
        let output = render_all(options, |w| {
            w.write_report(&completed("a", 6, Severity::Warning)).unwrap();
            w.write_diagnostic(None, Severity::Error, "Error reading log file: boom")
                .unwrap();
        });

        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["kind"], "job");
        assert_eq!(lines[0]["job_id"], "a");
        assert_eq!(lines[0]["severity"], "warning");
        assert_eq!(lines[0]["duration_secs"], 360);
        assert_eq!(lines[0]["duration"], "6m0s");
        assert_eq!(lines[1]["kind"], "diagnostic");
        assert!(lines[1].get("line").is_none());
    }

    #[test]
    fn test_json_incomplete_record() {
        let options = ReportOptions {
            json: true,
            ..ReportOptions::default()
        };
        let output = render_all(options, |w| {
            w.write_report(&JobReport::Incomplete {
                job_id: "b".to_string(),
                missing: EventStatus::Start,
            })
            .unwrap();
        });
        let value: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(value["kind"], "incomplete");
        assert_eq!(value["missing"], "START");
    }

    #[test]
    fn test_color_choice_never() {
        assert!(!ColorChoice::Never.enabled());
        assert!(ColorChoice::Always.enabled());
    }
}
