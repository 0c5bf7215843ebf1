//! Sync metric model.
//!
//! ## Submodules
//!
//! - [`duration`]: Duration parsing for settings, ETA and countdown formatting
//! - [`metrics`]: Pure metric functions and [`SyncStatus`] thresholds
//! - [`report`]: [`Sample`] and the published [`SyncReport`]
//! - [`sensor`]: [`Sensor`] projections over a report
//!
//! ## Data Flow
//!
//! ```text
//! Sample (current) ─┐
//!                   ├──▶ SyncReport::compute() ──▶ Sensor::value()
//! Sample (previous)─┘
//! ```

pub mod duration;
pub mod metrics;
pub mod report;
pub mod sensor;

pub use metrics::{HealthStatus, SyncStatus};
pub use report::{Sample, SyncReport};
pub use sensor::{Reading, Sensor, SensorAttributes};
