//! Scanner trait abstraction.
//!
//! [`Connector`] is the seam between the scan engine and the network. The
//! engine only ever asks for "a stream to this address within this time";
//! production code dials real TCP, tests substitute scripted connectors.

use crate::banner::Banner;
use crate::error::ScanResult;
use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;

/// Status of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// A connection was established.
    Open,
    /// Every attempt failed (refused, unreachable, or timed out).
    Closed,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Result of probing a single port.
///
/// Created once by the probe and moved to the collector; never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    /// The port that was probed.
    pub port: Port,
    /// Status determined by the probe.
    pub status: PortStatus,
    /// Bytes the service sent first. Present (possibly empty) only when open.
    #[serde(skip_serializing_if = "banner_is_blank")]
    pub banner: Option<Banner>,
    /// Connect attempts spent on this port.
    #[serde(skip)]
    pub attempts: u32,
}

fn banner_is_blank(banner: &Option<Banner>) -> bool {
    banner.as_ref().map_or(true, Banner::is_empty)
}

impl ProbeOutcome {
    /// An open port with whatever banner was read.
    pub fn open(port: Port, banner: Banner, attempts: u32) -> Self {
        Self {
            port,
            status: PortStatus::Open,
            banner: Some(banner),
            attempts,
        }
    }

    /// A closed port. Closed outcomes never carry a banner.
    pub fn closed(port: Port, attempts: u32) -> Self {
        Self {
            port,
            status: PortStatus::Closed,
            banner: None,
            attempts,
        }
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

/// Opens outbound connections on behalf of the scan engine.
///
/// Implementations must bound each call by `timeout` and report an elapsed
/// bound as [`ScanError::Timeout`](crate::error::ScanError::Timeout); the
/// retry policy depends on that classification.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The connected stream. Dropping it closes the connection.
    type Stream: AsyncRead + Unpin + Send + 'static;

    /// Attempt one connection.
    async fn connect(&self, addr: SocketAddr, timeout: Duration) -> ScanResult<Self::Stream>;
}

#[async_trait]
impl<'a, C: Connector + ?Sized> Connector for &'a C {
    type Stream = C::Stream;

    async fn connect(&self, addr: SocketAddr, timeout: Duration) -> ScanResult<Self::Stream> {
        (**self).connect(addr, timeout).await
    }
}

#[async_trait]
impl<C: Connector + ?Sized> Connector for Arc<C> {
    type Stream = C::Stream;

    async fn connect(&self, addr: SocketAddr, timeout: Duration) -> ScanResult<Self::Stream> {
        (**self).connect(addr, timeout).await
    }
}
