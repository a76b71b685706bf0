//! Dashboard stats: polled counts over `/bugs` and `/project`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bugdesk_client::{ApiClient, ClientError};
use bugdesk_core::{ResourceKind, StatsSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What observers of the aggregator see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub snapshot: StatsSnapshot,
    /// True until the first refresh attempt completes.
    pub loading: bool,
    /// Last failure. Cleared by the next fully successful refresh.
    pub error: Option<String>,
    /// When `snapshot` was last recomputed.
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for StatsView {
    fn default() -> Self {
        Self { snapshot: StatsSnapshot::default(), loading: true, error: None, last_updated: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Both fetches succeeded.
    Updated,
    /// One fetch failed; the snapshot was recomputed from the other.
    Partial,
    /// Both fetches failed; the previous snapshot was kept.
    Failed,
    /// Another refresh was already in flight. Nothing was fetched.
    Skipped,
}

/// Resets the in-flight flag however the refresh ends, including when its
/// future is dropped mid-request.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok().map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Converts a configured interval to a poll period. `<= 0` disables polling.
#[must_use]
pub fn poll_period(interval_ms: i64) -> Option<Duration> {
    u64::try_from(interval_ms).ok().filter(|&ms| ms > 0).map(Duration::from_millis)
}

pub struct StatsAggregator {
    client: Arc<ApiClient>,
    period: Option<Duration>,
    in_flight: AtomicBool,
    state: watch::Sender<StatsView>,
}

impl std::fmt::Debug for StatsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsAggregator")
            .field("period", &self.period)
            .field("in_flight", &self.in_flight.load(Ordering::Relaxed))
            .field("view", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl StatsAggregator {
    #[must_use]
    pub fn new(client: Arc<ApiClient>, interval_ms: i64) -> Self {
        let (state, _initial_rx) = watch::channel(StatsView::default());
        Self { client, period: poll_period(interval_ms), in_flight: AtomicBool::new(false), state }
    }

    #[must_use]
    pub const fn period(&self) -> Option<Duration> {
        self.period
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StatsView> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> StatsView {
        self.state.borrow().clone()
    }

    /// Fetches both collections concurrently and publishes a new view.
    ///
    /// Returns [`RefreshOutcome::Skipped`] without fetching when another
    /// refresh is outstanding.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("stats refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };

        let (bugs, projects) = tokio::join!(
            self.client.fetch_collection("/bugs", ResourceKind::Bugs),
            self.client.fetch_collection("/project", ResourceKind::Projects),
        );

        let outcome = match (&bugs, &projects) {
            (Ok(_), Ok(_)) => RefreshOutcome::Updated,
            (Err(_), Err(_)) => RefreshOutcome::Failed,
            _ => RefreshOutcome::Partial,
        };
        let error = first_error(&bugs, &projects);
        if let Some(ref message) = error {
            tracing::warn!(error = %message, ?outcome, "stats refresh failed");
        }

        let snapshot = match (bugs, projects) {
            (Err(_), Err(_)) => None,
            (bugs, projects) => {
                let bugs = bugs.unwrap_or_default();
                let project_count = projects.map_or(0, |p| p.len());
                Some(StatsSnapshot::from_raw(&bugs, project_count))
            },
        };

        self.state.send_modify(|view| {
            view.loading = false;
            view.error = error;
            if let Some(snapshot) = snapshot {
                view.snapshot = snapshot;
                view.last_updated = Some(Utc::now());
            }
        });
        tracing::debug!(?outcome, "stats refreshed");
        outcome
    }

    /// Spawns the poll loop: one refresh immediately, then one per period.
    ///
    /// With polling disabled only the initial refresh runs. Dropping or
    /// stopping the handle cancels the loop and any request in flight.
    #[must_use]
    pub fn start(self: &Arc<Self>) -> PollHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let this = Arc::clone(self);

        let task = tokio::spawn(async move {
            let Some(period) = this.period else {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {},
                    outcome = this.refresh() => tracing::debug!(?outcome, "initial stats refresh"),
                }
                return;
            };

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {},
                }
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    outcome = this.refresh() => tracing::debug!(?outcome, "stats poll"),
                }
            }
            tracing::debug!("stats poll loop stopped");
        });

        PollHandle { shutdown: shutdown_tx, task }
    }
}

fn first_error(bugs: &Result<Vec<Value>, ClientError>, projects: &Result<Vec<Value>, ClientError>) -> Option<String> {
    bugs.as_ref().err().or_else(|| projects.as_ref().err()).map(ToString::to_string)
}

/// Owns a running poll loop.
#[derive(Debug)]
pub struct PollHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancels the loop and waits for it to wind down. Nothing is published
    /// once this returns.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        self.task.abort();
        let _ = (&mut self.task).await;
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        self.task.abort();
    }
}
