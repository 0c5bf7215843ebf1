//! Channel-based data source.
//!
//! Receives refresh state from a running scheduler through a tokio watch
//! channel and forwards refresh requests to its single-slot queue.

use tokio::sync::watch;

use super::DataSource;
use crate::scheduler::{RefreshRequester, RefreshState, SchedulerHandle};

/// A data source backed by a scheduler's state channel.
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<RefreshState>,
    requester: Option<RefreshRequester>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// Without a requester, refresh requests are refused.
    pub fn new(
        receiver: watch::Receiver<RefreshState>,
        requester: Option<RefreshRequester>,
        description: &str,
    ) -> Self {
        Self {
            receiver,
            requester,
            description: description.to_string(),
            initial_returned: false,
        }
    }

    /// Attach to a running scheduler.
    pub fn from_scheduler(handle: &SchedulerHandle, description: &str) -> Self {
        Self::new(handle.subscribe(), Some(handle.requester()), description)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<RefreshState> {
        // Return the initial value on first poll
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        // Check if there's a new value without blocking
        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn request_refresh(&mut self) -> bool {
        self.requester.as_ref().is_some_and(|r| r.request())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_source_poll() {
        let (tx, rx) = watch::channel(RefreshState::default());
        let mut source = ChannelSource::new(rx, None, "test");

        // Initially returns the default (empty) state
        let state = source.poll();
        assert!(state.is_some());
        assert!(state.unwrap().report.is_none());

        // No change, so poll returns None
        assert!(source.poll().is_none());

        tx.send_modify(|s| {
            s.cycles = 1;
            s.last_error = Some("boom".to_string());
        });

        let state = source.poll().unwrap();
        assert_eq!(state.cycles, 1);
        assert_eq!(state.last_error.as_deref(), Some("boom"));
        assert_eq!(source.description(), "test");
    }

    #[test]
    fn test_refresh_refused_without_requester() {
        let (_tx, rx) = watch::channel(RefreshState::default());
        let mut source = ChannelSource::new(rx, None, "test");
        assert!(!source.request_refresh());
    }
}
