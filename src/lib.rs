//! Job Log Reconciler
//!
//! Reads a line-oriented job activity log, pairs each job's START and END
//! events, and reports how long every job took, flagging jobs that ran past
//! the warning or error latency thresholds.
//!
//! ## Input Format
//!
//! One event per line, four comma-separated fields, each trimmed:
//!
//! ```text
//! 09:15:30,Database Backup,START,PID001
//! 09:17:45,Database Backup,END,PID001
//! ```
//!
//! Timestamps are times of day with no date; a job whose END is earlier than
//! its START is taken to have crossed midnight.
//!
//! ## Architecture Overview
//!
//! - [`parser`] - Splits and validates a single line into a [`JobEvent`]
//! - [`timestamp_parser`] - `HH:MM:SS` parsing
//! - [`reconciler`] - Job registry and incremental/final reporting strategies
//! - [`duration`] - Midnight-aware duration math and threshold classification
//! - [`report`] - Text, colored text, and JSON-lines output
//! - [`analyzer`] - Streaming read loop tying the stages together
//! - [`config`] - TOML file and environment configuration
//! - [`logging`] - tracing subscriber setup
//!
//! ## Main Entry Point
//!
//! ```rust
//! use joblog::LogAnalyzer;
//!
//! let log = "23:45:00,Nightly,START,n1\n01:15:00,Nightly,END,n1\n";
//! let mut out = Vec::new();
//! LogAnalyzer::default().process(log.as_bytes(), &mut out).unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "Error: Job n1 took longer than 10 minutes: 1h30m0s\n"
//! );
//! ```

pub mod analyzer;
pub mod config;
pub mod duration;
pub mod logging;
pub mod models;
pub mod parser;
pub mod reconciler;
pub mod report;
pub mod timestamp_parser;

pub use analyzer::LogAnalyzer;
pub use models::*;
