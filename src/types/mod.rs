//! Core type definitions using newtype patterns for type safety.
//!
//! These types make invalid ports, inverted ranges and multi-host targets
//! unrepresentable once input has been validated.

mod port;
mod target;

pub use port::{Port, PortError, PortRange};
pub use target::{ScanTarget, TargetError, TargetSpec};
