//! The refresh coordinator.
//!
//! Owns the settings, one HTTP client, the previous sample and the last
//! published report. [`Coordinator::refresh`] takes `&mut self`, so at most
//! one cycle can be in flight and the previous sample has a single writer.

use std::time::Instant;

use chrono::Local;
use tracing::{info, warn};

use crate::data::{Sample, SyncReport};
use crate::error::{FetchError, UpdateFailed};
use crate::fetch::Fetcher;
use crate::settings::{Endpoint, Settings};

/// Periodically refreshed sync metrics for one node.
///
/// # Example
///
/// ```no_run
/// use syncwatch::{Coordinator, Settings};
///
/// # tokio_test::block_on(async {
/// let mut coordinator = Coordinator::new(Settings::default())?;
/// match coordinator.refresh().await {
///     Ok(report) => println!("{} blocks behind", report.blocks_behind),
///     Err(e) => eprintln!("{}", e),
/// }
/// coordinator.shutdown();
/// # Ok::<_, syncwatch::FetchError>(())
/// # });
/// ```
#[derive(Debug)]
pub struct Coordinator {
    settings: Settings,
    fetcher: Fetcher,
    previous: Option<Sample>,
    data: Option<SyncReport>,
}

impl Coordinator {
    /// Create a coordinator. No request is made until the first refresh.
    pub fn new(settings: Settings) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(&settings.user_agent)?;
        Ok(Self {
            settings,
            fetcher,
            previous: None,
            data: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The last successfully published report.
    ///
    /// Stays unchanged when a cycle fails.
    pub fn data(&self) -> Option<&SyncReport> {
        self.data.as_ref()
    }

    /// The sample rate-based metrics are computed against.
    pub fn previous_sample(&self) -> Option<&Sample> {
        self.previous.as_ref()
    }

    /// Run one refresh cycle.
    ///
    /// Fetches all three endpoints concurrently, derives the metrics and
    /// publishes the new report. Any failure aborts the whole cycle: the
    /// previous sample and report are left untouched.
    pub async fn refresh(&mut self) -> Result<&SyncReport, UpdateFailed> {
        let started = Instant::now();

        let sample = match self.fetch_sample(started).await {
            Ok(sample) => sample,
            Err(e) => {
                warn!(endpoint = %e.endpoint, error = %e.source, "update failed");
                return Err(e);
            }
        };

        let report = SyncReport::compute(
            &sample,
            self.previous.as_ref(),
            Local::now().naive_local(),
        );

        info!(
            node = %self.settings.name,
            local_height = report.local_height,
            global_height = report.global_height,
            blocks_behind = report.blocks_behind,
            status = %report.sync_status,
            speed = ?report.sync_speed_blocks_per_minute,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "refreshed"
        );

        self.previous = Some(sample);
        Ok(self.data.insert(report))
    }

    /// Release the HTTP client and forget all samples.
    pub fn shutdown(self) {
        info!(node = %self.settings.name, "coordinator shut down");
    }

    async fn fetch_sample(&self, taken_at: Instant) -> Result<Sample, UpdateFailed> {
        let settings = &self.settings;

        let global = async {
            self.fetcher
                .global_height(
                    settings.url(Endpoint::GlobalHeight),
                    settings.timeout(Endpoint::GlobalHeight),
                    settings.global_height_format,
                )
                .await
                .map_err(|e| UpdateFailed::new(Endpoint::GlobalHeight, e))
        };
        let local = async {
            self.fetcher
                .local_height(
                    settings.url(Endpoint::LocalHeight),
                    settings.timeout(Endpoint::LocalHeight),
                )
                .await
                .map_err(|e| UpdateFailed::new(Endpoint::LocalHeight, e))
        };
        let price = async {
            self.fetcher
                .price(settings.url(Endpoint::Price), settings.timeout(Endpoint::Price))
                .await
                .map_err(|e| UpdateFailed::new(Endpoint::Price, e))
        };

        let (global_height, local_height, price_usd) = tokio::try_join!(global, local, price)?;

        Ok(Sample {
            local_height,
            global_height,
            price_usd,
            taken_at,
        })
    }
}
