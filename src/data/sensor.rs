//! Read-only projections over a [`SyncReport`].
//!
//! Each [`Sensor`] exposes one key of the published mapping together with
//! the display metadata a dashboard needs. Some sensors also carry the
//! sync status and blocks behind as supplementary context.

use std::fmt;

use serde::Serialize;

use super::metrics::SyncStatus;
use super::report::SyncReport;

/// A single published value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    GlobalHeight,
    LocalHeight,
    BlocksBehind,
    PriceUsd,
    SyncPercentage,
    SyncStatus,
    SyncSpeed,
    RemainingSyncTime,
    SyncEta,
}

/// A sensor's current value.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Integer(u64),
    Float(f64),
    Text(String),
    /// Not computable yet (e.g. rates before the second sample).
    Unavailable,
}

impl Reading {
    pub fn is_available(&self) -> bool {
        !matches!(self, Reading::Unavailable)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Integer(n) => write!(f, "{}", n),
            Reading::Float(v) => write!(f, "{:.2}", v),
            Reading::Text(s) => f.write_str(s),
            Reading::Unavailable => f.write_str("-"),
        }
    }
}

/// Supplementary context attached to some sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorAttributes {
    pub sync_status: SyncStatus,
    pub blocks_behind: u64,
}

impl Sensor {
    pub const ALL: [Sensor; 9] = [
        Sensor::GlobalHeight,
        Sensor::LocalHeight,
        Sensor::BlocksBehind,
        Sensor::PriceUsd,
        Sensor::SyncPercentage,
        Sensor::SyncStatus,
        Sensor::SyncSpeed,
        Sensor::RemainingSyncTime,
        Sensor::SyncEta,
    ];

    /// Key in the published mapping.
    pub fn key(&self) -> &'static str {
        match self {
            Sensor::GlobalHeight => "globalHeight",
            Sensor::LocalHeight => "localHeight",
            Sensor::BlocksBehind => "blocksBehind",
            Sensor::PriceUsd => "priceUsd",
            Sensor::SyncPercentage => "syncPercentage",
            Sensor::SyncStatus => "syncStatus",
            Sensor::SyncSpeed => "syncSpeedBlocksPerMinute",
            Sensor::RemainingSyncTime => "remainingSyncSeconds",
            Sensor::SyncEta => "syncEta",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sensor::GlobalHeight => "Global Height",
            Sensor::LocalHeight => "Local Height",
            Sensor::BlocksBehind => "Blocks Behind",
            Sensor::PriceUsd => "Price",
            Sensor::SyncPercentage => "Sync Percentage",
            Sensor::SyncStatus => "Sync Status",
            Sensor::SyncSpeed => "Sync Speed",
            Sensor::RemainingSyncTime => "Remaining Sync Time",
            Sensor::SyncEta => "Sync ETA",
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Sensor::GlobalHeight | Sensor::LocalHeight | Sensor::BlocksBehind => Some("blocks"),
            Sensor::PriceUsd => Some("USD"),
            Sensor::SyncPercentage => Some("%"),
            Sensor::SyncSpeed => Some("blocks/min"),
            Sensor::RemainingSyncTime => Some("s"),
            Sensor::SyncStatus | Sensor::SyncEta => None,
        }
    }

    /// Look a sensor up by its mapping key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn value(&self, report: &SyncReport) -> Reading {
        match self {
            Sensor::GlobalHeight => Reading::Integer(report.global_height),
            Sensor::LocalHeight => Reading::Integer(report.local_height),
            Sensor::BlocksBehind => Reading::Integer(report.blocks_behind),
            Sensor::PriceUsd => Reading::Float(report.price_usd),
            Sensor::SyncPercentage => Reading::Float(report.sync_percentage),
            Sensor::SyncStatus => Reading::Text(report.sync_status.label().to_string()),
            Sensor::SyncSpeed => report
                .sync_speed_blocks_per_minute
                .map_or(Reading::Unavailable, Reading::Float),
            Sensor::RemainingSyncTime => report
                .remaining_sync_seconds
                .map_or(Reading::Unavailable, Reading::Integer),
            Sensor::SyncEta => report
                .sync_eta
                .clone()
                .map_or(Reading::Unavailable, Reading::Text),
        }
    }

    /// Sync status and blocks behind, for the sensors that carry them.
    pub fn attributes(&self, report: &SyncReport) -> Option<SensorAttributes> {
        match self {
            Sensor::LocalHeight
            | Sensor::SyncPercentage
            | Sensor::RemainingSyncTime
            | Sensor::SyncEta => Some(SensorAttributes {
                sync_status: report.sync_status,
                blocks_behind: report.blocks_behind,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SyncReport {
        SyncReport {
            global_height: 3_100_000,
            local_height: 3_099_950,
            blocks_behind: 50,
            price_usd: 161.5,
            sync_percentage: 100.0,
            sync_status: SyncStatus::CloseToSynchronized,
            sync_speed_blocks_per_minute: Some(12.5),
            remaining_sync_seconds: Some(240),
            sync_eta: Some("4 minutes (12:04)".to_string()),
        }
    }

    #[test]
    fn test_keys_match_published_mapping() {
        let map = report().to_map();
        for sensor in Sensor::ALL {
            assert!(map.contains_key(sensor.key()), "missing {}", sensor.key());
            assert_eq!(Sensor::from_key(sensor.key()), Some(sensor));
        }
        assert_eq!(map.len(), Sensor::ALL.len());
        assert_eq!(Sensor::from_key("hashrate"), None);
    }

    #[test]
    fn test_values() {
        let report = report();
        assert_eq!(Sensor::GlobalHeight.value(&report), Reading::Integer(3_100_000));
        assert_eq!(Sensor::PriceUsd.value(&report), Reading::Float(161.5));
        assert_eq!(
            Sensor::SyncStatus.value(&report),
            Reading::Text("Close to Synchronized".to_string())
        );
        assert_eq!(Sensor::RemainingSyncTime.value(&report), Reading::Integer(240));
        assert_eq!(Sensor::SyncSpeed.value(&report).to_string(), "12.50");
    }

    #[test]
    fn test_unavailable_rates() {
        let report = SyncReport {
            sync_speed_blocks_per_minute: None,
            remaining_sync_seconds: None,
            sync_eta: None,
            ..report()
        };
        assert_eq!(Sensor::SyncSpeed.value(&report), Reading::Unavailable);
        assert_eq!(Sensor::RemainingSyncTime.value(&report), Reading::Unavailable);
        assert!(!Sensor::SyncEta.value(&report).is_available());
        assert_eq!(Sensor::SyncEta.value(&report).to_string(), "-");
    }

    #[test]
    fn test_attributes() {
        let report = report();
        let expected = Some(SensorAttributes {
            sync_status: SyncStatus::CloseToSynchronized,
            blocks_behind: 50,
        });

        for sensor in [
            Sensor::LocalHeight,
            Sensor::SyncPercentage,
            Sensor::RemainingSyncTime,
            Sensor::SyncEta,
        ] {
            assert_eq!(sensor.attributes(&report), expected, "{}", sensor);
        }
        assert_eq!(Sensor::GlobalHeight.attributes(&report), None);
        assert_eq!(Sensor::PriceUsd.attributes(&report), None);
    }

    #[test]
    fn test_units() {
        assert_eq!(Sensor::SyncPercentage.unit(), Some("%"));
        assert_eq!(Sensor::SyncSpeed.unit(), Some("blocks/min"));
        assert_eq!(Sensor::SyncEta.unit(), None);
    }
}
