//! Scan subcommand implementation.
//!
//! Handles the `portsweep scan <host>` command.

use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output;
use crate::scanner::{Orchestrator, ScanConfig};
use crate::types::{PortRange, TargetSpec};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Scan a port range on a single host.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Host to scan (IP address or hostname; the first resolved address is used)
    #[arg(value_name = "HOST")]
    pub host: String,

    /// First port of the range (raised to 1 if lower)
    #[arg(long, default_value_t = 1)]
    pub start: u32,

    /// Last port of the range (lowered to 65535 if higher)
    #[arg(long, default_value_t = 1024)]
    pub end: u32,

    /// Maximum concurrent connection attempts [default: 500]
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Connect timeout in milliseconds; upper bound in adaptive mode [default: 300]
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Extra attempts after a timed-out connect [default: 1]
    #[arg(short = 'r', long)]
    pub retries: Option<u32>,

    /// Use the timeout as given instead of estimating it from RTT
    #[arg(long)]
    pub no_adaptive: bool,

    /// Output format for results [default: plain]
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Show closed ports in output
    #[arg(long)]
    pub show_closed: bool,
}

impl ScanCommand {
    /// Merge command-line flags over loaded settings.
    pub fn scan_config(&self, settings: &AppSettings) -> ScanConfig {
        let mut config = settings.scan_config();
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(timeout_ms) = self.timeout {
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(retries) = self.retries {
            config = config.with_retries(retries);
        }
        if self.no_adaptive {
            config = config.with_adaptive(false);
        }
        config.normalized()
    }

    /// Output format from the flag, the settings file, or plain.
    pub fn output_format(&self, settings: &AppSettings) -> OutputFormat {
        self.output.unwrap_or_else(|| {
            OutputFormat::from_str(&settings.default_output_format, true).unwrap_or_else(|_| {
                warn!(
                    format = %settings.default_output_format,
                    "unknown output format in settings, using plain"
                );
                OutputFormat::Plain
            })
        })
    }

    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, verbose: u8, quiet: bool) -> CliResult<()> {
        // Fatal configuration errors surface before any connection is made.
        let range = PortRange::clamped(self.start, self.end)?;
        let target = TargetSpec::parse(&self.host)?.resolve().await?;

        let config = self.scan_config(settings);
        let format = self.output_format(settings);
        let show_closed = self.show_closed || settings.show_closed;
        let plain = !quiet && format == OutputFormat::Plain;

        if plain {
            output::print_scan_header(
                &target.original,
                &target.ip.to_string(),
                &range.to_string(),
                range.len(),
            );
        }

        let cancel = CancellationToken::new();
        let cancel_ctrlc = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping scan");
                cancel_ctrlc.cancel();
            }
        });

        let mut orchestrator =
            Orchestrator::new(target, range, config).with_cancellation(cancel.clone());

        let progress = (plain && verbose > 0).then(|| progress_bar(range.len() as u64));
        if let Some(pb) = &progress {
            orchestrator = orchestrator.with_progress(pb.clone());
        }

        let report = orchestrator.run().await;

        if let Some(pb) = progress {
            pb.finish_with_message("Scan complete");
        }

        let report = if show_closed {
            report
        } else {
            report.into_open_only()
        };

        if report.cancelled && !quiet {
            output::print_warning("scan interrupted; showing partial results");
        }

        output::print_results(&report, format)?;
        Ok(())
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .map(|s| s.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
