//! Data source abstraction for the dashboard.
//!
//! The dashboard never talks to the coordinator directly; it reads
//! [`RefreshState`] snapshots from a source and may ask it for an
//! out-of-band refresh.

mod channel;

pub use channel::ChannelSource;

use std::fmt::Debug;

use crate::scheduler::RefreshState;

/// Trait for receiving refresh state.
pub trait DataSource: Send + Debug {
    /// Poll for the latest state.
    ///
    /// Returns `Some(state)` if it changed since the last poll, `None`
    /// otherwise. This method should be non-blocking.
    fn poll(&mut self) -> Option<RefreshState>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the status bar.
    fn description(&self) -> &str;

    /// Ask for a refresh outside the schedule.
    ///
    /// Returns `false` if the request was not accepted (one is already
    /// queued, or the source cannot refresh on demand).
    fn request_refresh(&mut self) -> bool;
}
