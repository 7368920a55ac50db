//! Scripted connectors for exercising the engine without a network.

use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::Connector;
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, DuplexStream};

/// A stream whose peer sends `banner` and hangs up.
async fn stream_with_banner(banner: &[u8]) -> DuplexStream {
    let (client, mut server) = tokio::io::duplex(1024);
    if !banner.is_empty() {
        let _ = server.write_all(banner).await;
    }
    client
}

/// Every attempt times out.
#[derive(Default)]
pub(crate) struct TimeoutConnector {
    attempts: AtomicU32,
}

impl TimeoutConnector {
    pub(crate) fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for TimeoutConnector {
    type Stream = DuplexStream;

    async fn connect(&self, _addr: SocketAddr, _timeout: Duration) -> ScanResult<DuplexStream> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ScanError::Timeout)
    }
}

/// Every attempt is refused.
#[derive(Default)]
pub(crate) struct RefusedConnector {
    attempts: AtomicU32,
}

impl RefusedConnector {
    pub(crate) fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for RefusedConnector {
    type Stream = DuplexStream;

    async fn connect(&self, _addr: SocketAddr, _timeout: Duration) -> ScanResult<DuplexStream> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ScanError::ConnectionRefused)
    }
}

/// Times out `fail_first` times, then connects.
pub(crate) struct FlakyConnector {
    fail_first: u32,
    attempts: AtomicU32,
}

impl FlakyConnector {
    pub(crate) fn new(fail_first: u32) -> Self {
        Self {
            fail_first,
            attempts: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl Connector for FlakyConnector {
    type Stream = DuplexStream;

    async fn connect(&self, _addr: SocketAddr, _timeout: Duration) -> ScanResult<DuplexStream> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_first {
            Err(ScanError::Timeout)
        } else {
            Ok(stream_with_banner(b"").await)
        }
    }
}

/// Sleeps `delay` per connect, then opens the scripted ports and refuses
/// the rest. Tracks how many connects were in flight at once.
pub(crate) struct ScriptedConnector {
    open: HashMap<u16, &'static [u8]>,
    delay: Duration,
    jitter: bool,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    attempts: AtomicU32,
}

impl ScriptedConnector {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            open: HashMap::new(),
            delay,
            jitter: false,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            attempts: AtomicU32::new(0),
        }
    }

    pub(crate) fn with_open(mut self, port: u16, banner: &'static [u8]) -> Self {
        self.open.insert(port, banner);
        self
    }

    /// Vary the delay by port so completions arrive out of order.
    pub(crate) fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Stream = DuplexStream;

    async fn connect(&self, addr: SocketAddr, _timeout: Duration) -> ScanResult<DuplexStream> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = if self.jitter {
            self.delay * (u32::from(u16::MAX - addr.port()) % 7 + 1)
        } else {
            self.delay
        };
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.open.get(&addr.port()) {
            Some(banner) => Ok(stream_with_banner(banner).await),
            None => Err(ScanError::ConnectionRefused),
        }
    }
}
