//! # Skirmish Match Server
//!
//! Headless host for skirmish matches.
//!
//! Runs the simulation without rendering, exchanging snapshots and
//! commands with decision agents over typed channels.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod agent;
pub mod error;
pub mod host;
pub mod registry;
pub mod report;

use std::time::Duration;

/// Host settings shared by every match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Frames per second of the host loop.
    pub fps: u32,
    /// Snapshots buffered per subscriber before it lags.
    pub snapshot_capacity: usize,
    /// Commands buffered before senders wait.
    pub inbox_capacity: usize,
}

impl ServerConfig {
    /// Wall-clock gap between frames.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            fps: 120,
            snapshot_capacity: 256,
            inbox_capacity: 1024,
        }
    }
}
