//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};

use crate::data::{Sensor, SyncReport};
use crate::scheduler::RefreshState;
use crate::source::DataSource;
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub state: Option<RefreshState>,

    // Node being watched
    pub node_name: String,
    pub refresh_interval: Duration,

    // Navigation state
    pub selected_sensor_index: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with a theme matching the terminal background.
    pub fn new(source: Box<dyn DataSource>, node_name: &str, refresh_interval: Duration) -> Self {
        Self::with_theme(source, node_name, refresh_interval, Theme::auto_detect())
    }

    pub fn with_theme(
        source: Box<dyn DataSource>,
        node_name: &str,
        refresh_interval: Duration,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            show_help: false,
            source,
            state: None,
            node_name: node_name.to_string(),
            refresh_interval,
            selected_sensor_index: 0,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// The last published report, possibly stale.
    pub fn report(&self) -> Option<&SyncReport> {
        self.state.as_ref().and_then(|s| s.report.as_ref())
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source for new state.
    ///
    /// Returns true if the state changed.
    pub fn reload_data(&mut self) -> bool {
        match self.source.poll() {
            Some(state) => {
                self.state = Some(state);
                true
            }
            None => false,
        }
    }

    /// Ask the source for an immediate refresh cycle.
    pub fn request_refresh(&mut self) {
        if self.source.request_refresh() {
            self.set_status_message("Refresh requested".to_string());
        } else {
            self.set_status_message("Refresh already pending".to_string());
        }
    }

    /// The sensor under the cursor.
    pub fn selected_sensor(&self) -> Sensor {
        Sensor::ALL[self.selected_sensor_index.min(Sensor::ALL.len() - 1)]
    }

    /// Move selection down by one sensor.
    pub fn select_next(&mut self) {
        let max = Sensor::ALL.len() - 1;
        self.selected_sensor_index = (self.selected_sensor_index + 1).min(max);
    }

    /// Move selection up by one sensor.
    pub fn select_prev(&mut self) {
        self.selected_sensor_index = self.selected_sensor_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_sensor_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_sensor_index = Sensor::ALL.len() - 1;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the last published report to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(report) = self.report() else {
            bail!("No data to export");
        };
        write_report(report, path)
    }
}

/// Write a report as pretty-printed JSON.
pub fn write_report(report: &SyncReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
