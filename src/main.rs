use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use joblog::config::Config;
use joblog::logging::init_logging;
use joblog::reconciler::{DuplicatePolicy, ReportMode};
use joblog::report::ColorChoice;
use joblog::LogAnalyzer;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

const USAGE: &str = "Usage: joblog <log_file>";

#[derive(Parser)]
#[command(name = "joblog")]
#[command(about = "Reconcile START/END job events into duration reports")]
#[command(version)]
struct Cli {
    /// Job activity log to reconcile
    #[arg(value_name = "LOG_FILE")]
    log_file: PathBuf,

    /// Report jobs as soon as they complete, or all at once after the scan
    #[arg(long, value_enum)]
    mode: Option<ReportMode>,

    /// Whether a repeated START/END for the same job is reported
    #[arg(long, value_enum)]
    duplicates: Option<DuplicatePolicy>,

    /// Warn about jobs running longer than this many minutes
    #[arg(long, value_name = "MINUTES")]
    warn_after: Option<u32>,

    /// Flag jobs running longer than this many minutes as errors
    #[arg(long, value_name = "MINUTES")]
    error_after: Option<u32>,

    /// Output one JSON object per line
    #[arg(long)]
    json: bool,

    /// Colorize warnings and errors
    #[arg(long, value_enum)]
    color: Option<ColorChoice>,

    /// Omit the `line <n>:` prefix on diagnostics
    #[arg(long)]
    no_line_numbers: bool,

    /// Configuration file (defaults to joblog.toml or the user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            ErrorKind::MissingRequiredArgument | ErrorKind::UnknownArgument => {
                println!("{}", USAGE);
                process::exit(1);
            }
            _ => {
                eprint!("{}", e);
                println!("{}", USAGE);
                process::exit(1);
            }
        },
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    let _guard = init_logging(&config.logging);

    let analyzer = LogAnalyzer::from_config(&config);
    colored::control::set_override(config.report.color.enabled());

    let stdout = io::stdout();
    analyzer.run(&cli.log_file, BufWriter::new(stdout.lock()))?;

    Ok(())
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(mode) = cli.mode {
        config.report.mode = mode;
    }
    if let Some(duplicates) = cli.duplicates {
        config.report.duplicates = duplicates;
    }
    if let Some(minutes) = cli.warn_after {
        config.thresholds.warning_minutes = minutes;
    }
    if let Some(minutes) = cli.error_after {
        config.thresholds.error_minutes = minutes;
    }
    if let Some(color) = cli.color {
        config.report.color = color;
    }
    if cli.json {
        config.report.json = true;
    }
    if cli.no_line_numbers {
        config.report.line_numbers = false;
    }
}
