//! TCP connect probing.
//!
//! Performs standard TCP connect scans using the operating system's socket
//! API. This completes the full handshake, so it needs no privileges and is
//! easily logged by the target.

use crate::banner::read_banner;
use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{Connector, ProbeOutcome};
use crate::types::Port;
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Dials real TCP connections through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, addr: SocketAddr, limit: Duration) -> ScanResult<TcpStream> {
        match timeout(limit, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(ScanError::from_connect_error(&e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }
}

/// Probes single ports on one host with a fixed timeout and retry budget.
///
/// Holds only immutable scan parameters, so one instance is shared by every
/// worker in the pool.
pub struct ConnectProbe<C> {
    connector: C,
    target: IpAddr,
    timeout: Duration,
    max_retries: u32,
}

impl<C: Connector> ConnectProbe<C> {
    /// Create a new probe.
    ///
    /// # Arguments
    /// * `connector` - How connections are opened
    /// * `target` - Target IP address
    /// * `timeout` - Bound on each individual connect attempt
    /// * `max_retries` - Extra attempts allowed after a timed-out first attempt
    pub fn new(connector: C, target: IpAddr, timeout: Duration, max_retries: u32) -> Self {
        Self {
            connector,
            target,
            timeout,
            max_retries,
        }
    }

    pub fn target(&self) -> IpAddr {
        self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe one port.
    ///
    /// Only a timed-out attempt is retried, with the same timeout and no
    /// backoff. Any other failure closes the port on the spot. On connect
    /// the banner is read and the stream dropped before returning.
    pub async fn probe(&self, port: Port) -> ProbeOutcome {
        let addr = SocketAddr::new(self.target, port.as_u16());
        let max_attempts = self.max_retries.saturating_add(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.connector.connect(addr, self.timeout).await {
                Ok(stream) => {
                    let banner = read_banner(stream).await;
                    debug!(%port, attempts, banner_len = banner.len(), "port open");
                    return ProbeOutcome::open(port, banner, attempts);
                }
                Err(e) if e.is_retryable() && attempts < max_attempts => {
                    debug!(%port, attempt = attempts, "connect timed out, retrying");
                }
                Err(e) => {
                    trace!(%port, attempts, error = %e, "port closed");
                    return ProbeOutcome::closed(port, attempts);
                }
            }
        }
    }
}
