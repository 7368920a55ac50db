//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-attempt connect
//! failures ([`ScanError`]) never leave the probe; only configuration and
//! resolution errors reach the caller.

use crate::types::{PortError, TargetError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of a single failed connect attempt.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Connection timed out")]
    Timeout,

    #[error("Connection refused")]
    ConnectionRefused,

    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Host unreachable")]
    HostUnreachable,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

impl ScanError {
    /// Classify an I/O error returned by `connect()`.
    pub fn from_connect_error(e: &io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut => return Self::Timeout,
            io::ErrorKind::ConnectionRefused => return Self::ConnectionRefused,
            _ => {}
        }

        let error_str = e.to_string().to_lowercase();
        if error_str.contains("refused") {
            Self::ConnectionRefused
        } else if error_str.contains("unreachable") {
            if error_str.contains("host") {
                Self::HostUnreachable
            } else {
                Self::NetworkUnreachable(e.to_string())
            }
        } else if error_str.contains("timed out") {
            Self::Timeout
        } else {
            Self::ConnectionFailed(e.to_string())
        }
    }

    /// Only timeouts are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Result type alias for connect attempts.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors loading or saving settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidFormat(e.to_string())
    }
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal errors surfaced by CLI commands before or after a scan.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_refused() {
        let e = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(matches!(
            ScanError::from_connect_error(&e),
            ScanError::ConnectionRefused
        ));
    }

    #[test]
    fn test_classify_timed_out() {
        let e = io::Error::from(io::ErrorKind::TimedOut);
        let classified = ScanError::from_connect_error(&e);
        assert!(matches!(classified, ScanError::Timeout));
        assert!(classified.is_retryable());
    }

    #[test]
    fn test_classify_unreachable_by_message() {
        let e = io::Error::new(io::ErrorKind::Other, "No route to host: host unreachable");
        assert!(matches!(
            ScanError::from_connect_error(&e),
            ScanError::HostUnreachable
        ));

        let e = io::Error::new(io::ErrorKind::Other, "Network is unreachable");
        assert!(matches!(
            ScanError::from_connect_error(&e),
            ScanError::NetworkUnreachable(_)
        ));
    }

    #[test]
    fn test_only_timeout_retryable() {
        assert!(!ScanError::ConnectionRefused.is_retryable());
        assert!(!ScanError::HostUnreachable.is_retryable());
        assert!(!ScanError::NetworkUnreachable("x".into()).is_retryable());
        assert!(!ScanError::ConnectionFailed("x".into()).is_retryable());
    }
}
