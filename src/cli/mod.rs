//! CLI subcommand definitions and handlers.
//!
//! - `portsweep scan <host>` - Scan a port range on one host
//! - `portsweep settings` - Show or initialise the settings file

mod scan;
mod settings;

pub use scan::ScanCommand;
pub use settings::SettingsCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// portsweep - a fast single-host TCP connect scanner.
///
/// Probes a contiguous port range with a bounded pool of concurrent
/// connections, retrying timeouts and grabbing a short banner from every
/// open port.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A fast single-host TCP connect scanner", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a settings file (defaults to the XDG config directory)
    #[arg(long, global = true, value_name = "PATH", env = "PORTSWEEP_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Load settings from `--config`, or the default location.
    pub fn load_settings(&self) -> CliResult<AppSettings> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        Ok(settings)
    }

    /// Dispatch to the selected subcommand.
    pub async fn execute(&self) -> CliResult<()> {
        match &self.command {
            Commands::Scan(cmd) => {
                let settings = self.load_settings()?;
                cmd.execute(&settings, self.verbose, self.quiet).await
            }
            Commands::Settings(cmd) => cmd.execute(self.config.as_deref()),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a port range on a single host
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Show or initialise the settings file
    Settings(SettingsCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_defaults() {
        let cli = Cli::try_parse_from(["portsweep", "scan", "127.0.0.1"]).unwrap();
        let Commands::Scan(scan) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(scan.host, "127.0.0.1");
        assert_eq!(scan.start, 1);
        assert_eq!(scan.end, 1024);
        assert!(scan.concurrency.is_none());
        assert!(!scan.no_adaptive);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_scan_flags() {
        let cli = Cli::try_parse_from([
            "portsweep", "-vv", "scan", "example.com", "--start", "9990", "--end", "10000",
            "-c", "64", "-t", "800", "-r", "3", "--no-adaptive", "-o", "json", "--show-closed",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Scan(scan) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!((scan.start, scan.end), (9990, 10000));
        assert_eq!(scan.concurrency, Some(64));
        assert_eq!(scan.timeout, Some(800));
        assert_eq!(scan.retries, Some(3));
        assert!(scan.no_adaptive);
        assert_eq!(scan.output, Some(OutputFormat::Json));
        assert!(scan.show_closed);
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Plain.to_string(), "plain");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }
}
