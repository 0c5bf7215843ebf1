//! Drives a [`Coordinator`] on a timer.
//!
//! The scheduler task is the coordinator's only owner. It runs one cycle
//! immediately, then one per interval; ticks missed while a slow cycle is
//! running are skipped rather than queued. Out-of-band refreshes go through
//! a single-slot queue, so at most one request waits behind the running
//! cycle and further requests are coalesced into it.
//!
//! Readers observe [`RefreshState`] through a `watch` channel. After a
//! failed cycle the last good report stays in the state next to the error.

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::coordinator::Coordinator;
use crate::data::SyncReport;
use crate::error::ValidationError;

/// What readers of the scheduler see.
#[derive(Debug, Clone, Default)]
pub struct RefreshState {
    /// Last successfully published report.
    pub report: Option<SyncReport>,
    /// Error of the most recent cycle, cleared by the next success.
    pub last_error: Option<String>,
    pub last_success: Option<DateTime<Local>>,
    pub last_attempt: Option<DateTime<Local>>,
    /// A cycle is currently running.
    pub in_flight: bool,
    /// Completed cycles, successful or not.
    pub cycles: u64,
    pub failures: u64,
}

impl RefreshState {
    /// A report is shown but the latest cycle failed.
    pub fn is_stale(&self) -> bool {
        self.report.is_some() && self.last_error.is_some()
    }
}

/// Handle to a running scheduler.
///
/// Call [`shutdown`](SchedulerHandle::shutdown) to stop the loop and release
/// the coordinator.
#[derive(Debug)]
pub struct SchedulerHandle {
    requests: mpsc::Sender<()>,
    state: watch::Receiver<RefreshState>,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Subscribe to state updates.
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.state.clone()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RefreshState {
        self.state.borrow().clone()
    }

    /// A sender for out-of-band refresh requests.
    pub fn requester(&self) -> RefreshRequester {
        RefreshRequester {
            requests: self.requests.clone(),
        }
    }

    /// Ask for a refresh outside the schedule.
    ///
    /// Returns `false` if a request is already queued.
    pub fn request_refresh(&self) -> bool {
        self.requests.try_send(()).is_ok()
    }

    /// Stop the loop after the running cycle (if any) completes.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

/// Cloneable sender side of the refresh request queue.
#[derive(Debug, Clone)]
pub struct RefreshRequester {
    requests: mpsc::Sender<()>,
}

impl RefreshRequester {
    /// Returns `false` if a request is already queued or the scheduler stopped.
    pub fn request(&self) -> bool {
        self.requests.try_send(()).is_ok()
    }
}

/// Spawn the refresh loop on the current tokio runtime.
///
/// A zero interval is rejected and nothing is spawned.
pub fn spawn(
    coordinator: Coordinator,
    interval: Duration,
) -> Result<SchedulerHandle, ValidationError> {
    if interval.is_zero() {
        return Err(ValidationError::InvalidSetting {
            field: "refresh_interval",
            reason: "must be greater than zero".to_string(),
        });
    }

    let (request_tx, request_rx) = mpsc::channel(1);
    let (state_tx, state_rx) = watch::channel(RefreshState::default());
    let (stop_tx, stop_rx) = watch::channel(false);

    let task = tokio::spawn(run(coordinator, interval, request_rx, state_tx, stop_rx));

    Ok(SchedulerHandle {
        requests: request_tx,
        state: state_rx,
        stop_tx,
        task,
    })
}

async fn run(
    mut coordinator: Coordinator,
    interval: Duration,
    mut requests: mpsc::Receiver<()>,
    state: watch::Sender<RefreshState>,
    mut stop_rx: watch::Receiver<bool>,
) {
    // The first tick completes immediately, giving readers data right away.
    let mut timer = tokio::time::interval(interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        node = %coordinator.settings().name,
        interval_secs = interval.as_secs(),
        "scheduler started"
    );

    loop {
        tokio::select! {
            _ = timer.tick() => {}
            Some(()) = requests.recv() => {
                debug!("refresh requested");
            }
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
                continue;
            }
        }

        run_cycle(&mut coordinator, &state).await;
    }

    coordinator.shutdown();
    info!("scheduler stopped");
}

async fn run_cycle(coordinator: &mut Coordinator, state: &watch::Sender<RefreshState>) {
    state.send_modify(|s| {
        s.in_flight = true;
        s.last_attempt = Some(Local::now());
    });

    let result = coordinator.refresh().await.cloned();

    state.send_modify(|s| {
        s.in_flight = false;
        s.cycles += 1;
        match result {
            Ok(report) => {
                s.report = Some(report);
                s.last_error = None;
                s.last_success = Some(Local::now());
            }
            Err(e) => {
                s.failures += 1;
                s.last_error = Some(e.to_string());
            }
        }
    });
}
