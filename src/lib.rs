//! # portsweep - a fast single-host TCP connect scanner
//!
//! portsweep probes a contiguous range of TCP ports on one host and reports,
//! for every port, whether a connection succeeded and what the service sent
//! first.
//!
//! ## Features
//!
//! - **Bounded concurrency**: a fixed pool of workers, one connection each
//! - **Retry on timeout**: only timed-out attempts are retried
//! - **Adaptive timeouts**: derived from measured RTT before the scan starts
//! - **Banner capture**: up to 256 bytes read from every open port
//! - **Deterministic output**: results always sorted by port
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::scanner::{run_scan, ScanConfig};
//! use portsweep::types::{PortRange, TargetSpec};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let target = TargetSpec::parse("127.0.0.1")?.resolve().await?;
//!     let range = PortRange::clamped(1, 1024)?;
//!
//!     let report = run_scan(target, range, ScanConfig::default()).await;
//!     for outcome in report.open() {
//!         println!("{} is {}", outcome.port, outcome.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated ports, ranges and targets
//! - [`scanner`] - Timeout estimation, probing, the worker pool and orchestration
//! - [`banner`] - Banner capture and display
//! - [`config`] - Settings file management
//! - [`error`] - Error types
//! - [`output`] - Output formatting

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use scanner::{Orchestrator, PortStatus, ProbeOutcome, ScanConfig, ScanReport};
pub use types::{Port, PortRange, ScanTarget, TargetSpec};
