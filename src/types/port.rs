//! Port types with validation.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` is the contiguous, inclusive range a scan covers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value as u32))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: end ({1}) must be >= start ({0})")]
    InvalidRange(u32, u32),
}

/// An inclusive, non-empty range of ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range.
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start.0 > end.0 {
            Err(PortError::InvalidRange(start.0 as u32, end.0 as u32))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Build a range from raw user input.
    ///
    /// `start` is raised to 1 and `end` lowered to 65535 before the
    /// `end >= start` check, so `0-70000` becomes the full range.
    pub fn clamped(start: u32, end: u32) -> Result<Self, PortError> {
        let start = start.clamp(Port::MIN as u32, Port::MAX as u32);
        let end = end.min(Port::MAX as u32);
        if end < start {
            return Err(PortError::InvalidRange(start, end));
        }
        // Both bounds are within 1..=65535 here.
        Self::new(Port(start as u16), Port(end as u16))
    }

    /// Create a range containing a single port.
    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// First port of the range.
    pub const fn start(&self) -> Port {
        self.start
    }

    /// Last port of the range.
    pub const fn end(&self) -> Port {
        self.end
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Check whether `port` falls inside the range.
    pub fn contains(&self, port: Port) -> bool {
        self.start <= port && port <= self.end
    }

    /// Iterate over all ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for PortRange {
    type Err = PortError;

    /// Parses `"80"` or `"1-1024"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| -> Result<u32, PortError> {
            part.trim()
                .parse()
                .map_err(|_| PortError::InvalidFormat(part.trim().to_string()))
        };

        let s = s.trim();
        match s.split_once('-') {
            Some((start, end)) => Self::clamped(parse(start)?, parse(end)?),
            None => {
                let port = parse(s)?;
                let port = u16::try_from(port)
                    .ok()
                    .and_then(Port::new)
                    .ok_or(PortError::OutOfRange(port))?;
                Ok(Self::single(port))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(65535).is_some());
    }

    #[test]
    fn test_port_range_len() {
        let range = PortRange::new(Port::new(1).unwrap(), Port::new(100).unwrap()).unwrap();
        assert_eq!(range.len(), 100);
        assert_eq!(range.iter().count(), 100);

        let full = PortRange::clamped(1, 65535).unwrap();
        assert_eq!(full.len(), 65535);
    }

    #[test]
    fn test_clamped_bounds() {
        let range = PortRange::clamped(0, 70000).unwrap();
        assert_eq!(range.start().as_u16(), 1);
        assert_eq!(range.end().as_u16(), 65535);
    }

    #[test]
    fn test_clamped_rejects_inverted() {
        assert!(matches!(
            PortRange::clamped(100, 50),
            Err(PortError::InvalidRange(100, 50))
        ));
        // end of 0 can never reach a clamped start of 1
        assert!(PortRange::clamped(0, 0).is_err());
    }

    #[test]
    fn test_parse_range() {
        let range: PortRange = "9990-10000".parse().unwrap();
        assert_eq!(range.len(), 11);
        assert_eq!(range.to_string(), "9990-10000");

        let single: PortRange = "22".parse().unwrap();
        assert_eq!(single.len(), 1);
        assert!(single.contains(Port::new(22).unwrap()));

        assert!("abc".parse::<PortRange>().is_err());
        assert!("0".parse::<PortRange>().is_err());
    }
}
