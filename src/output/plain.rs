//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::{PortStatus, ScanReport};
use console::{style, Style};
use std::io::{self, Write};

/// Banner characters shown per row.
const BANNER_DISPLAY_WIDTH: usize = 80;

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Write a report in human-readable plain text format.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Scan Results",
        style("portsweep").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Target:").bold(), report.target)?;
    writeln!(out, "  {} {}", style("IP Address:").bold(), report.ip_address)?;
    writeln!(out, "  {} {}", style("Ports:").bold(), report.port_range)?;
    writeln!(
        out,
        "  {} {}ms{}",
        style("Timeout:").bold(),
        report.effective_timeout_ms,
        if report.adaptive { " (adaptive)" } else { "" }
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} ports scanned in {:.2}s ({:.1} ports/sec)",
        style("Statistics:").bold(),
        report.ports_scanned,
        report.duration_ms as f64 / 1000.0,
        report.rate()
    )?;
    writeln!(
        out,
        "               {} open, {} closed",
        style(report.open_ports).green().bold(),
        style(report.closed_ports).red(),
    )?;
    if report.cancelled {
        writeln!(
            out,
            "               {}",
            style("scan interrupted, results are partial").yellow()
        )?;
    }
    writeln!(out)?;

    if report.results.is_empty() {
        writeln!(
            out,
            "  {}",
            style(format!(
                "No open ports found on {} ({}) in range {}",
                report.target, report.ip_address, report.port_range
            ))
            .dim()
        )?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:>6}  {:^8}  {}",
            style("PORT").bold(),
            style("STATE").bold(),
            style("BANNER").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for result in &report.results {
            let status_style = match result.status {
                PortStatus::Open => Style::new().green().bold(),
                PortStatus::Closed => Style::new().red(),
            };

            let banner_display = result
                .banner
                .as_ref()
                .map(|b| truncate_string(&b.sanitized(), BANNER_DISPLAY_WIDTH))
                .unwrap_or_default();

            writeln!(
                out,
                "  {:>6}  {:^8}  {}",
                result.port,
                status_style.apply_to(result.status.to_string()),
                style(banner_display).dim()
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &str, ip: &str, ports: &str, count: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("portsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {} ({})",
        style("•").dim(),
        style(target).white().bold(),
        ip
    );
    println!(
        "{} Scanning {} ports ({})...",
        style("•").dim(),
        style(count).white().bold(),
        ports
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to at most `max_len` characters, adding an ellipsis.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
