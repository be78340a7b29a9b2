//! Log Analysis Engine
//!
//! Drives one run over one log file: streams the file line by line, parses
//! each line, feeds events to the [`Reconciler`] and writes every diagnostic
//! and report through a [`ReportWriter`] in arrival order.
//!
//! ## Error tiers
//!
//! - Opening the file is fatal and surfaces as an `Err` from [`LogAnalyzer::run`].
//! - Malformed lines are reported and skipped.
//! - A read failure mid-scan stops the scan; lines already processed are kept,
//!   the failure is reported once, and end-of-run reporting still happens.
//!
//! ## Usage Example
//!
//! ```rust
//! use joblog::analyzer::LogAnalyzer;
//!
//! let log = "09:15:30,Backup,START,1\n09:17:45,Backup,END,1\n";
//! let mut out = Vec::new();
//! let summary = LogAnalyzer::default().process(log.as_bytes(), &mut out).unwrap();
//!
//! assert_eq!(summary.completed_jobs, 1);
//! assert_eq!(String::from_utf8(out).unwrap(), "Job 1 duration: 2m15s\n");
//! ```

use crate::config::Config;
use crate::models::{RunSummary, Severity};
use crate::parser::parse_line;
use crate::reconciler::{DuplicatePolicy, Reconciler, Replaced, ReportMode};
use crate::report::{ReportOptions, ReportWriter};
use crate::timestamp_parser::TimestampParser;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogAnalyzer {
    mode: ReportMode,
    duplicates: DuplicatePolicy,
    report: ReportOptions,
}

impl LogAnalyzer {
    pub fn new(mode: ReportMode, duplicates: DuplicatePolicy, report: ReportOptions) -> Self {
        Self {
            mode,
            duplicates,
            report,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.report.mode,
            config.report.duplicates,
            ReportOptions {
                json: config.report.json,
                color: config.report.color.enabled(),
                line_numbers: config.report.line_numbers,
                thresholds: config.thresholds.to_thresholds(),
            },
        )
    }

    /// Reconcile the log at `path`, writing all output to `out`.
    pub fn run<W: Write>(&self, path: &Path, out: W) -> Result<RunSummary> {
        let span = info_span!("reconcile", run_id = %Uuid::new_v4(), file = %path.display());
        let _enter = span.enter();

        let file = File::open(path)
            .with_context(|| format!("Error opening file {}", path.display()))?;

        self.process(BufReader::new(file), out)
    }

    pub fn process<R: BufRead, W: Write>(&self, mut reader: R, out: W) -> Result<RunSummary> {
        let mut writer = ReportWriter::new(out, self.report);
        let mut reconciler = Reconciler::new(self.mode, self.report.thresholds);
        let mut summary = RunSummary::default();

        let mut buf = Vec::new();
        let mut line_number = 0usize;
        let mut read_error = None;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    read_error = Some(e);
                    break;
                }
            }
            line_number += 1;
            summary.lines_read += 1;

            let line = String::from_utf8_lossy(trim_line_ending(&buf));
            if line.trim().is_empty() {
                summary.blank_lines += 1;
                debug!(line_number, "Skipping blank line");
                continue;
            }

            let event = match parse_line(&line) {
                Ok(event) => event,
                Err(e) => {
                    summary.lines_skipped += 1;
                    debug!(line_number, error = %e, "Skipping line");
                    writer
                        .write_line_error(line_number, &e)
                        .context("Failed to write diagnostic")?;
                    continue;
                }
            };

            let update = reconciler.apply(&event);
            summary.events_applied += 1;

            if let (Some(replaced), DuplicatePolicy::Warn) = (&update.replaced, self.duplicates) {
                writer
                    .write_diagnostic(
                        Some(line_number),
                        Severity::Warning,
                        &duplicate_message(replaced),
                    )
                    .context("Failed to write diagnostic")?;
            }

            if let Some(report) = &update.report {
                writer.write_report(report).context("Failed to write report")?;
            }
        }

        if let Some(e) = read_error {
            warn!(error = %e, lines_processed = line_number, "Read failed mid-scan");
            summary.read_error = true;
            writer
                .write_diagnostic(
                    None,
                    Severity::Error,
                    &format!("Error reading log file: {}", e),
                )
                .context("Failed to write diagnostic")?;
        }

        summary.jobs = reconciler.len();
        summary.completed_jobs = reconciler.completed_count();
        summary.incomplete_jobs = summary.jobs - summary.completed_jobs;

        for report in reconciler.finish() {
            writer.write_report(&report).context("Failed to write report")?;
        }
        writer.flush().context("Failed to flush output")?;

        info!(
            lines_read = summary.lines_read,
            blank_lines = summary.blank_lines,
            events_applied = summary.events_applied,
            lines_skipped = summary.lines_skipped,
            jobs = summary.jobs,
            completed_jobs = summary.completed_jobs,
            incomplete_jobs = summary.incomplete_jobs,
            read_error = summary.read_error,
            "Reconciliation finished"
        );

        Ok(summary)
    }
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

fn duplicate_message(replaced: &Replaced) -> String {
    format!(
        "Duplicate {} for job {}: {} replaced by {}",
        replaced.status,
        replaced.job_id,
        TimestampParser::format(&replaced.previous),
        TimestampParser::format(&replaced.current)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Read};

    fn run(analyzer: LogAnalyzer, input: &str) -> (RunSummary, String) {
        let mut out = Vec::new();
        let summary = analyzer.process(input.as_bytes(), &mut out).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_final_mode_output() {
        let input = "\
09:00:00,Backup,START,b
09:06:00,Backup,END,b
09:00:00,Export,START,a
09:11:00,Export,END,a
10:00:00,Cleanup,START,c
";
        let (summary, output) = run(LogAnalyzer::default(), input);
        assert_eq!(
            output,
            "Error: Job a took longer than 10 minutes: 11m0s\n\
             Warning: Job b took longer than 5 minutes: 6m0s\n\
             Incomplete job c: missing END\n"
        );
        assert_eq!(summary.jobs, 3);
        assert_eq!(summary.completed_jobs, 2);
        assert_eq!(summary.incomplete_jobs, 1);
    }

    #[test]
    fn test_incremental_mode_interleaves_diagnostics() {
        let analyzer = LogAnalyzer::new(
            ReportMode::Incremental,
            DuplicatePolicy::Overwrite,
            ReportOptions::default(),
        );
        let input = "\
09:00:00,Backup,START,1
bad line
09:03:00,Backup,END,1
09:04:00,Backup,END,2
";
        let (summary, output) = run(analyzer, input);
        assert_eq!(
            output,
            "line 2: Invalid log line: bad line\n\
             Job 1 duration: 3m0s\n\
             Incomplete job 2: missing START\n"
        );
        assert_eq!(summary.lines_skipped, 1);
        assert_eq!(summary.events_applied, 3);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let input = "09:00:00,Backup,START,1\r\n\r\n   \n09:01:00,Backup,END,1\r\n";
        let (summary, output) = run(LogAnalyzer::default(), input);
        assert_eq!(output, "Job 1 duration: 1m0s\n");
        assert_eq!(summary.blank_lines, 2);
        assert_eq!(summary.lines_read, 4);
    }

    #[test]
    fn test_duplicate_warning_policy() {
        let analyzer = LogAnalyzer::new(
            ReportMode::Final,
            DuplicatePolicy::Warn,
            ReportOptions::default(),
        );
        let input = "\
09:00:00,Backup,START,1
09:02:00,Backup,START,1
09:03:00,Backup,END,1
";
        let (_, output) = run(analyzer, input);
        assert_eq!(
            output,
            "line 2: Duplicate START for job 1: 09:00:00 replaced by 09:02:00\n\
             Job 1 duration: 1m0s\n"
        );
    }

    #[test]
    fn test_duplicate_overwrite_is_silent() {
        let input = "\
09:00:00,Backup,START,1
09:02:00,Backup,START,1
09:03:00,Backup,END,1
";
        let (_, output) = run(LogAnalyzer::default(), input);
        assert_eq!(output, "Job 1 duration: 1m0s\n");
    }

    #[test]
    fn test_unknown_status_not_registered() {
        let input = "09:00:00,Backup,PAUSE,1\n";
        let (summary, output) = run(LogAnalyzer::default(), input);
        assert_eq!(output, "line 1: Status Unknown 'PAUSE'\n");
        assert_eq!(summary.jobs, 0);
    }

    /// Yields its data, then fails on the next read.
    struct FailingReader {
        data: io::Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "device gone"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_keeps_processed_lines() {
        let reader = io::BufReader::new(FailingReader {
            data: io::Cursor::new(b"09:00:00,Backup,START,1\n".to_vec()),
        });
        let mut out = Vec::new();
        let summary = LogAnalyzer::default().process(reader, &mut out).unwrap();

        assert!(summary.read_error);
        assert_eq!(summary.events_applied, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Error reading log file: device gone\nIncomplete job 1: missing END\n"
        );
    }

    #[derive(Clone, Default)]
    struct SharedBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_summary_is_logged() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            run(LogAnalyzer::default(), "\n09:00:00,Backup,START,1\n");
        });

        let logged = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("Reconciliation finished"));
        assert!(logged.contains("blank_lines=1"));
        assert!(logged.contains("read_error=false"));
        assert!(logged.contains("incomplete_jobs=1"));
    }

    #[test]
    fn test_run_missing_file_is_fatal() {
        let result = LogAnalyzer::default().run(Path::new("/nonexistent/joblog.log"), Vec::new());
        assert!(result.is_err());
    }
}
