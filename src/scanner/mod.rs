//! Scanner module - the concurrent connect-scan engine.
//!
//! [`Orchestrator`] runs one scan of one host: it optionally estimates a
//! timeout, starts the worker pool over the port range, waits for the pool
//! and the collector, and returns a [`ScanReport`] sorted by port.

pub mod estimator;
pub mod pool;
pub mod tcp;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use estimator::{derive_timeout, estimate_timeout};
pub use pool::{ResultCollector, WorkerPool};
pub use tcp::{ConnectProbe, TcpConnector};
pub use traits::{Connector, PortStatus, ProbeOutcome};

use crate::types::{PortRange, ScanTarget};
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default number of concurrent workers.
pub const DEFAULT_CONCURRENCY: usize = 500;

/// Worker count used when the caller asks for fewer than one.
pub const FALLBACK_CONCURRENCY: usize = 100;

/// Default per-attempt connect timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(300);

/// Default number of extra attempts after a timeout.
pub const DEFAULT_RETRIES: u32 = 1;

/// Tuning for a single scan. Read-only once the scan starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Maximum simultaneous connection attempts.
    pub concurrency: usize,
    /// Per-attempt connect timeout, and the ceiling for adaptive estimates.
    pub timeout: Duration,
    /// Extra attempts allowed after a timed-out attempt.
    pub retries: u32,
    /// Derive the timeout from measured RTT before scanning.
    pub adaptive: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            adaptive: true,
        }
    }
}

impl ScanConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency limit.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry count.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Enable or disable adaptive timeout estimation.
    pub fn with_adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Replace out-of-range values: a concurrency below one becomes
    /// [`FALLBACK_CONCURRENCY`] and a zero timeout becomes [`DEFAULT_TIMEOUT`].
    pub fn normalized(mut self) -> Self {
        if self.concurrency < 1 {
            self.concurrency = FALLBACK_CONCURRENCY;
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        self
    }
}

/// Where an [`Orchestrator`] is in its single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScanPhase {
    Idle,
    Estimating,
    Scanning,
    Draining,
    Done,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Estimating => write!(f, "estimating"),
            Self::Scanning => write!(f, "scanning"),
            Self::Draining => write!(f, "draining"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Complete results of one scan, sorted by port.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub target: String,
    pub ip_address: String,
    pub port_range: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub effective_timeout_ms: u64,
    pub adaptive: bool,
    pub cancelled: bool,
    pub ports_scanned: usize,
    pub open_ports: usize,
    pub closed_ports: usize,
    pub results: Vec<ProbeOutcome>,
}

impl ScanReport {
    /// Iterate over open ports only.
    pub fn open(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.results.iter().filter(|r| r.is_open())
    }

    /// Drop closed outcomes from `results`, keeping the counters intact.
    pub fn into_open_only(mut self) -> Self {
        self.results.retain(ProbeOutcome::is_open);
        self
    }

    /// Ports per second over the whole scan.
    pub fn rate(&self) -> f64 {
        let secs = (self.duration_ms as f64 / 1000.0).max(1e-9);
        self.ports_scanned as f64 / secs
    }
}

/// Runs one scan of one host. Consumed by [`Orchestrator::run`], so a
/// finished orchestrator can never be run again.
pub struct Orchestrator<C> {
    connector: Arc<C>,
    target: ScanTarget,
    range: PortRange,
    config: ScanConfig,
    cancel: CancellationToken,
    progress: Option<ProgressBar>,
    phase: ScanPhase,
}

impl Orchestrator<TcpConnector> {
    /// An orchestrator that dials real TCP connections.
    pub fn new(target: ScanTarget, range: PortRange, config: ScanConfig) -> Self {
        Self::with_connector(TcpConnector, target, range, config)
    }
}

impl<C: Connector + 'static> Orchestrator<C> {
    /// An orchestrator that opens connections through `connector`.
    pub fn with_connector(
        connector: C,
        target: ScanTarget,
        range: PortRange,
        config: ScanConfig,
    ) -> Self {
        Self {
            connector: Arc::new(connector),
            target,
            range,
            config: config.normalized(),
            cancel: CancellationToken::new(),
            progress: None,
            phase: ScanPhase::Idle,
        }
    }

    /// Stop early when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Tick `progress` once per probed port.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn enter(&mut self, next: ScanPhase) {
        debug_assert!(next > self.phase, "{} -> {}", self.phase, next);
        debug!(from = %self.phase, to = %next, "scan phase");
        self.phase = next;
    }

    /// Run the scan to completion, or until cancelled.
    ///
    /// Per-port failures become closed outcomes; nothing in here is fatal.
    pub async fn run(mut self) -> ScanReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        let ip = self.target.ip;

        let timeout = if self.config.adaptive {
            self.enter(ScanPhase::Estimating);
            estimate_timeout(&*self.connector, ip, self.config.timeout).await
        } else {
            self.config.timeout
        };

        self.enter(ScanPhase::Scanning);
        let workers = self.config.concurrency.min(self.range.len());
        info!(
            target = %self.target,
            ports = %self.range,
            workers,
            timeout_ms = timeout.as_millis() as u64,
            retries = self.config.retries,
            "starting scan"
        );

        let probe = Arc::new(ConnectProbe::new(
            Arc::clone(&self.connector),
            ip,
            timeout,
            self.config.retries,
        ));
        let (queue, feeder) = pool::spawn_feeder(self.range, self.cancel.clone());
        let (outcomes_tx, collector) = ResultCollector::spawn(self.range.len());
        let pool = WorkerPool::spawn(
            workers,
            probe,
            queue,
            outcomes_tx,
            self.cancel.clone(),
            self.progress.clone(),
        );

        pool.join().await;
        // The feeder only exits on exhaustion or cancellation, both already seen.
        let _ = feeder.await;

        self.enter(ScanPhase::Draining);
        let mut results = collector.finish().await;
        results.sort_by_key(|r| r.port);

        self.enter(ScanPhase::Done);
        let cancelled = self.cancel.is_cancelled();
        let open_ports = results.iter().filter(|r| r.is_open()).count();
        let report = ScanReport {
            target: self.target.original.clone(),
            ip_address: ip.to_string(),
            port_range: self.range.to_string(),
            started_at,
            duration_ms: clock.elapsed().as_millis() as u64,
            effective_timeout_ms: timeout.as_millis() as u64,
            adaptive: self.config.adaptive,
            cancelled,
            ports_scanned: results.len(),
            open_ports,
            closed_ports: results.len() - open_ports,
            results,
        };

        info!(
            open = report.open_ports,
            scanned = report.ports_scanned,
            duration_ms = report.duration_ms,
            cancelled,
            "scan finished"
        );
        report
    }
}

/// Scan `range` on `target` over real TCP.
pub async fn run_scan(target: ScanTarget, range: PortRange, config: ScanConfig) -> ScanReport {
    Orchestrator::new(target, range, config).run().await
}
