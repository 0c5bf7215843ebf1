//! # syncwatch
//!
//! Watches how far a local Monero node is behind the network.
//!
//! Every refresh cycle fetches three JSON endpoints (the network's best
//! block height, the local node's height and the XMR/USD price) and
//! derives sync metrics from them: blocks behind, sync percentage, a
//! coarse sync status and, once two samples exist, the sync speed,
//! remaining time and ETA.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  ┌───────────┐   ┌─────────────┐   ┌───────────┐   ┌──────────┐  │
//! │  │ scheduler │──▶│ coordinator │──▶│   fetch   │──▶│ HTTP APIs│  │
//! │  │  (timer)  │   │   (cycle)   │   │ (reqwest) │   │          │  │
//! │  └─────┬─────┘   └──────┬──────┘   └───────────┘   └──────────┘  │
//! │        │ watch          ▼                                        │
//! │        │         ┌─────────────┐                                 │
//! │        │         │    data     │ Sample ─▶ SyncReport ─▶ Sensor  │
//! │        ▼         └─────────────┘                                 │
//! │  ┌───────────┐   ┌─────────────┐                                 │
//! │  │  source   │──▶│  app / ui   │──▶ Terminal                     │
//! │  └───────────┘   └─────────────┘                                 │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`settings`]**: Layered configuration and endpoint validation
//! - **[`fetch`]**: HTTP client with per-endpoint timeouts and response checks
//! - **[`coordinator`]**: One refresh cycle, previous-sample bookkeeping
//! - **[`scheduler`]**: Periodic and on-demand cycles, state broadcast
//! - **[`data`]**: Metric functions, the published report, sensors
//! - **[`source`]**, **[`app`]**, **[`ui`]**: The terminal dashboard
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Interactive dashboard with the default endpoints
//! syncwatch
//!
//! # One cycle, report printed as JSON
//! syncwatch --once --local-height-url http://node:18089/get_height
//!
//! # JSON lines, one per cycle
//! syncwatch --headless --refresh 30
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use syncwatch::{scheduler, Coordinator, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let interval = settings.refresh_interval();
//! let handle = scheduler::spawn(Coordinator::new(settings)?, interval)?;
//!
//! let mut rx = handle.subscribe();
//! rx.changed().await.ok();
//! if let Some(report) = &rx.borrow().report {
//!     println!("{:?}", report.to_map());
//! }
//! handle.shutdown().await;
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! # });
//! ```

pub mod app;
pub mod coordinator;
pub mod data;
pub mod error;
pub mod events;
pub mod fetch;
pub mod scheduler;
pub mod settings;
pub mod source;
pub mod ui;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use app::App;
pub use coordinator::Coordinator;
pub use data::{HealthStatus, Reading, Sample, Sensor, SyncReport, SyncStatus};
pub use error::{ErrorKind, FetchError, UpdateFailed, ValidationError};
pub use scheduler::{RefreshState, SchedulerHandle};
pub use settings::{Endpoint, GlobalHeightFormat, Settings};
pub use source::{ChannelSource, DataSource};
