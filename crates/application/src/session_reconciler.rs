use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use regiongate_core::{AppResult, UserId};
use regiongate_domain::RegionName;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

mod cache;
mod session;


pub use cache::{RegionCache, RegionSnapshot};
pub use session::{ClientSession, SessionContext};

const NOTIFICATION_CAPACITY: usize = 16;
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Port returning the authoritative effective regions of a user.
#[async_trait]
pub trait EffectiveRegionsSource: Send + Sync {
    /// Fetches the current effective regions for `user_id`.
    async fn fetch_effective_regions(&self, user_id: UserId) -> AppResult<BTreeSet<RegionName>>;
}

/// Timing of reconciler ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerSchedule {
    /// Period between ticks; raised to one millisecond when shorter.
    pub interval: Duration,
    /// Delay between session start and the first tick.
    pub initial_delay: Duration,
}

impl Default for ReconcilerSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            initial_delay: Duration::from_secs(5),
        }
    }
}

/// Observable reconciler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    /// Waiting for the next tick.
    Idle,
    /// Fetching effective regions.
    Checking,
    /// Cache was replaced and a notification emitted.
    Updated,
}

/// Notification emitted when the cached region set changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessChanged {
    /// Regions cached before the check.
    pub previous: BTreeSet<RegionName>,
    /// Regions cached after the check.
    pub current: BTreeSet<RegionName>,
    /// Cache version after the change.
    pub version: u64,
}

impl AccessChanged {
    /// Regions present now but not before.
    #[must_use]
    pub fn added(&self) -> Vec<&RegionName> {
        self.current.difference(&self.previous).collect()
    }

    /// Regions present before but not now.
    #[must_use]
    pub fn removed(&self) -> Vec<&RegionName> {
        self.previous.difference(&self.current).collect()
    }
}

/// Why a tick did not run a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another check was still running.
    InFlight,
    /// The session has ended.
    Unauthenticated,
    /// Nothing is cached yet.
    NoRegions,
}

/// Result of one reconciler tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No check was started.
    Skipped(SkipReason),
    /// The fetched set matched the cache.
    Unchanged,
    /// The cache was replaced.
    Updated(AccessChanged),
    /// The fetch failed; the cache is untouched.
    Failed,
}

struct CheckGuard<'a> {
    in_flight: &'a AtomicBool,
}

impl Drop for CheckGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Keeps a session's cached regions in sync with the grant store.
pub struct SessionReconciler {
    session: Arc<SessionContext>,
    source: Arc<dyn EffectiveRegionsSource>,
    in_flight: AtomicBool,
    dropped_ticks: AtomicU64,
    notifications: broadcast::Sender<AccessChanged>,
    state: watch::Sender<ReconcilerState>,
}

impl SessionReconciler {
    /// Creates a reconciler for `session` reading from `source`.
    #[must_use]
    pub fn new(session: Arc<SessionContext>, source: Arc<dyn EffectiveRegionsSource>) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let (state, _) = watch::channel(ReconcilerState::Idle);

        Self {
            session,
            source,
            in_flight: AtomicBool::new(false),
            dropped_ticks: AtomicU64::new(0),
            notifications,
            state,
        }
    }

    /// Subscribes to access change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AccessChanged> {
        self.notifications.subscribe()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ReconcilerState {
        *self.state.borrow()
    }

    /// Watches state transitions.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ReconcilerState> {
        self.state.subscribe()
    }

    /// Number of ticks dropped because a check was in flight.
    #[must_use]
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks.load(Ordering::Relaxed)
    }

    /// Returns the reconciled session.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Runs one guarded tick immediately.
    pub async fn check_now(&self) -> TickOutcome {
        let Some(_guard) = self.try_begin_check() else {
            let dropped = self.dropped_ticks.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(
                user_id = %self.session.identity().user_id(),
                dropped_ticks = dropped,
                "region check already in flight, dropping tick"
            );
            return TickOutcome::Skipped(SkipReason::InFlight);
        };

        if !self.session.is_authenticated() {
            return TickOutcome::Skipped(SkipReason::Unauthenticated);
        }

        if self.session.cache().is_empty().await {
            return TickOutcome::Skipped(SkipReason::NoRegions);
        }

        self.state.send_replace(ReconcilerState::Checking);
        let outcome = self.check().await;
        self.state.send_replace(ReconcilerState::Idle);

        outcome
    }

    /// Starts the periodic loop and returns its owning handle.
    #[must_use]
    pub fn spawn(self, schedule: ReconcilerSchedule) -> ReconcilerHandle {
        let reconciler = Arc::new(self);
        let (stop, stopped) = oneshot::channel();
        let task = tokio::spawn(Arc::clone(&reconciler).run(schedule, stopped));

        ReconcilerHandle {
            reconciler,
            stop: Some(stop),
            task: Some(task),
        }
    }

    fn try_begin_check(&self) -> Option<CheckGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| CheckGuard {
                in_flight: &self.in_flight,
            })
    }

    async fn check(&self) -> TickOutcome {
        let user_id = self.session.identity().user_id();
        let current = match self.source.fetch_effective_regions(user_id).await {
            Ok(current) => current,
            Err(error) if error.is_transient() => {
                warn!(user_id = %user_id, error = %error, "region check failed, retrying next tick");
                return TickOutcome::Failed;
            }
            Err(error) => {
                error!(user_id = %user_id, error = %error, "region check rejected");
                return TickOutcome::Failed;
            }
        };

        let Some(change) = self.session.cache().replace_if_changed(current).await else {
            debug!(user_id = %user_id, "effective regions unchanged");
            return TickOutcome::Unchanged;
        };

        self.state.send_replace(ReconcilerState::Updated);
        info!(
            user_id = %user_id,
            version = change.version,
            added = change.added().len(),
            removed = change.removed().len(),
            "effective regions changed"
        );

        if self.notifications.send(change.clone()).is_err() {
            debug!(user_id = %user_id, "no subscribers for access change");
        }

        TickOutcome::Updated(change)
    }

    async fn run(self: Arc<Self>, schedule: ReconcilerSchedule, mut stopped: oneshot::Receiver<()>) {
        let start = Instant::now() + schedule.initial_delay;
        let mut interval = tokio::time::interval_at(start, schedule.interval.max(MIN_INTERVAL));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut checks = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = &mut stopped => {
                    checks.shutdown().await;
                    break;
                }
                _ = interval.tick() => {
                    let reconciler = Arc::clone(&self);
                    checks.spawn(async move { reconciler.check_now().await });
                }
                Some(joined) = checks.join_next(), if !checks.is_empty() => {
                    if let Err(error) = joined
                        && !error.is_cancelled()
                    {
                        warn!(error = %error, "region check task failed");
                    }
                }
            }
        }

        debug!(
            user_id = %self.session.identity().user_id(),
            "session reconciler stopped"
        );
    }
}

/// Owning handle of a running reconciler; dropping it stops the loop.
pub struct ReconcilerHandle {
    reconciler: Arc<SessionReconciler>,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ReconcilerHandle {
    /// Returns the running reconciler.
    #[must_use]
    pub fn reconciler(&self) -> &SessionReconciler {
        &self.reconciler
    }

    /// Subscribes to access change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AccessChanged> {
        self.reconciler.subscribe()
    }

    /// Runs one guarded tick immediately.
    pub async fn check_now(&self) -> TickOutcome {
        self.reconciler.check_now().await
    }

    /// Stops the interval, aborts any in-flight check and waits for the loop to exit.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take()
            && stop.send(()).is_err()
        {
            debug!("session reconciler loop already stopped");
        }

        if let Some(task) = self.task.take()
            && let Err(error) = task.await
            && !error.is_cancelled()
        {
            warn!(error = %error, "session reconciler loop failed");
        }
    }
}

impl Drop for ReconcilerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
