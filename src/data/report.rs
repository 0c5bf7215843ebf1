//! Samples and the published report.

use std::time::Instant;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::duration::format_eta;
use super::metrics::{
    blocks_behind, blocks_per_second, remaining_sync_seconds, round2, sync_percentage, SyncStatus,
};

/// One observation of all three endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub local_height: u64,
    pub global_height: u64,
    pub price_usd: f64,
    /// Monotonic time the cycle that produced this sample started.
    pub taken_at: Instant,
}

/// The published result of a successful refresh cycle.
///
/// Serializes as a flat mapping with camelCase keys. Rate-based values
/// are omitted until two samples exist and the node is catching up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub global_height: u64,
    pub local_height: u64,
    pub blocks_behind: u64,
    pub price_usd: f64,
    pub sync_percentage: f64,
    pub sync_status: SyncStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_speed_blocks_per_minute: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_sync_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_eta: Option<String>,
}

impl SyncReport {
    /// Derive every metric from the current sample and, for the rate-based
    /// ones, the previous sample. `now` is the wall-clock time the ETA is
    /// projected from.
    pub fn compute(current: &Sample, previous: Option<&Sample>, now: NaiveDateTime) -> Self {
        let behind = blocks_behind(current.global_height, current.local_height);

        let rate = previous.and_then(|prev| {
            blocks_per_second(
                prev.local_height,
                prev.taken_at,
                current.local_height,
                current.taken_at,
            )
        });

        let remaining = rate.and_then(|bps| remaining_sync_seconds(behind, bps));
        let eta = remaining
            .filter(|&secs| secs > 0)
            .map(|secs| format_eta(secs, now));

        Self {
            global_height: current.global_height,
            local_height: current.local_height,
            blocks_behind: behind,
            price_usd: current.price_usd,
            sync_percentage: sync_percentage(current.global_height, current.local_height),
            sync_status: SyncStatus::from_blocks_behind(behind),
            sync_speed_blocks_per_minute: rate.map(|bps| round2(bps * 60.0)),
            remaining_sync_seconds: remaining,
            sync_eta: eta,
        }
    }

    /// The report as a flat key/value mapping.
    pub fn to_map(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}
