//! Banner capture for open TCP ports.
//!
//! A banner is whatever a service sends unprompted right after the
//! handshake. We never write to the socket; one bounded read is all.

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

/// Maximum bytes kept for a banner.
pub const MAX_BANNER_SIZE: usize = 256;

/// How long to wait for the service to speak first.
pub const BANNER_TIMEOUT: Duration = Duration::from_millis(200);

/// Raw bytes read from an open port, at most [`MAX_BANNER_SIZE`] long.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banner(Vec<u8>);

impl Banner {
    /// Wrap raw bytes, truncating anything past the size limit.
    pub fn new(mut bytes: Vec<u8>) -> Self {
        bytes.truncate(MAX_BANNER_SIZE);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Lossy UTF-8 view of the raw bytes.
    pub fn to_lossy_string(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// Single-line, printable rendering for terminal tables.
    pub fn sanitized(&self) -> String {
        sanitize_banner(&self.0)
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sanitized())
    }
}

impl Serialize for Banner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_lossy_string())
    }
}

/// Read whatever the peer sends first, then drop the stream.
///
/// Read errors, timeouts and EOF all produce an empty banner; the port is
/// open either way.
pub async fn read_banner<S>(mut stream: S) -> Banner
where
    S: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; MAX_BANNER_SIZE];

    let n = match timeout(BANNER_TIMEOUT, stream.read(&mut buffer)).await {
        Ok(Ok(n)) => n,
        _ => 0,
    };

    buffer.truncate(n);
    Banner::new(buffer)
}

/// Replace control bytes, collapse whitespace runs and trim.
fn sanitize_banner(data: &[u8]) -> String {
    let s: String = data
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else if b == b'\r' || b == b'\n' || b == b'\t' {
                ' '
            } else {
                '.'
            }
        })
        .collect();

    let mut result = String::with_capacity(s.len());
    let mut prev_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !prev_space {
                result.push(c);
            }
            prev_space = true;
        } else {
            result.push(c);
            prev_space = false;
        }
    }

    result.trim().to_string()
}
