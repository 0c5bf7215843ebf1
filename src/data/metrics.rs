//! Derived sync metrics.
//!
//! Pure functions over heights and sample times; the coordinator combines
//! them into a [`SyncReport`](super::SyncReport) every cycle.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Upper bounds (inclusive) on blocks behind for each non-final status.
const ALMOST_SYNCHRONIZED_MAX: u64 = 10;
const CLOSE_TO_SYNCHRONIZED_MAX: u64 = 100;
const SYNCHRONIZING_MAX: u64 = 1000;

/// Coarse sync state derived from blocks behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SyncStatus {
    #[serde(rename = "Synchronized")]
    Synchronized,
    #[serde(rename = "Almost Synchronized")]
    AlmostSynchronized,
    #[serde(rename = "Close to Synchronized")]
    CloseToSynchronized,
    #[serde(rename = "Synchronizing")]
    Synchronizing,
    #[serde(rename = "Far Behind")]
    FarBehind,
}

impl SyncStatus {
    pub fn from_blocks_behind(blocks_behind: u64) -> Self {
        match blocks_behind {
            0 => SyncStatus::Synchronized,
            n if n <= ALMOST_SYNCHRONIZED_MAX => SyncStatus::AlmostSynchronized,
            n if n <= CLOSE_TO_SYNCHRONIZED_MAX => SyncStatus::CloseToSynchronized,
            n if n <= SYNCHRONIZING_MAX => SyncStatus::Synchronizing,
            _ => SyncStatus::FarBehind,
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::Synchronized => "Synchronized",
            SyncStatus::AlmostSynchronized => "Almost Synchronized",
            SyncStatus::CloseToSynchronized => "Close to Synchronized",
            SyncStatus::Synchronizing => "Synchronizing",
            SyncStatus::FarBehind => "Far Behind",
        }
    }

    /// Health bucket used for coloring.
    pub fn health(&self) -> HealthStatus {
        match self {
            SyncStatus::Synchronized | SyncStatus::AlmostSynchronized => HealthStatus::Healthy,
            SyncStatus::CloseToSynchronized | SyncStatus::Synchronizing => HealthStatus::Warning,
            SyncStatus::FarBehind => HealthStatus::Critical,
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Health status for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }
}

/// Blocks the local node still has to catch up. Never negative.
pub fn blocks_behind(global_height: u64, local_height: u64) -> u64 {
    global_height.saturating_sub(local_height)
}

/// Local height as a percentage of global height, rounded to 2 decimals.
///
/// Zero when the global height is unknown. Not capped at 100: a local node
/// ahead of a lagging reference reads above 100.
pub fn sync_percentage(global_height: u64, local_height: u64) -> f64 {
    if global_height == 0 {
        return 0.0;
    }
    round2(local_height as f64 / global_height as f64 * 100.0)
}

/// Blocks per second between two observations of the local height.
///
/// `None` when no time has elapsed or the samples are out of order.
pub fn blocks_per_second(
    previous_height: u64,
    previous_at: Instant,
    current_height: u64,
    current_at: Instant,
) -> Option<f64> {
    let elapsed = current_at.checked_duration_since(previous_at)?.as_secs_f64();
    if elapsed <= 0.0 {
        return None;
    }
    let delta = current_height as f64 - previous_height as f64;
    Some(delta / elapsed)
}

/// Seconds left at the given rate, truncated.
///
/// Only defined while the node is behind and catching up.
pub fn remaining_sync_seconds(blocks_behind: u64, blocks_per_second: f64) -> Option<u64> {
    if blocks_per_second > 0.0 && blocks_behind > 0 {
        Some((blocks_behind as f64 / blocks_per_second) as u64)
    } else {
        None
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
