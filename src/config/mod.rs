//! Configuration management for portsweep.
//!
//! Provides XDG-compliant storage of default scan settings.

mod settings;

pub use settings::{AppSettings, Paths};
