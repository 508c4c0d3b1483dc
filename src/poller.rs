//! Change-detecting poll state plus the timer loops that feed it.
//!
//! Each poll loop is a single tokio task driven by a fixed-period ticker. Fetch starts
//! stay on the interval grid regardless of fetch latency, and a manual refresh restarts
//! the grid from the moment it fires. Every fetch announces its start instant and then
//! its result to the main loop as [`AppEvent`]s tagged with the [`Ticket`] that was
//! current when the loop started, so events for an abandoned subject can be dropped.

use crate::events::AppEvent;
use crate::traits::FetchGateway;
use crate::view::Command;
use serde::Serialize;
use std::future::Future;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest accepted poll period.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Content hash of a fetched value, used to suppress identical republishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Hash of the canonical JSON serialization. Struct fields serialize in
    /// declaration order, so equal values always yield equal fingerprints.
    pub fn of<T: Serialize>(value: &T) -> Option<Self> {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                let mut hasher = DefaultHasher::new();
                bytes.hash(&mut hasher);
                Some(Self(hasher.finish()))
            }
            Err(e) => {
                tracing::warn!("Fingerprint serialization failed: {e}");
                None
            }
        }
    }
}

/// Generation stamp for one subject. Results carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// New content was published.
    Changed,
    /// Fetch succeeded but matched the published fingerprint.
    Unchanged,
    /// Fetch failed; the last published value is retained.
    Failed,
    /// Result belonged to an abandoned subject and was dropped.
    Stale,
}

struct CacheEntry<T> {
    value: Arc<T>,
    fingerprint: Option<Fingerprint>,
}

/// Last-known-good value for one poll subject (a repository or a run id).
pub struct PollState<K, T> {
    subject: Option<K>,
    generation: u64,
    entry: Option<CacheEntry<T>>,
    loading: bool,
    error: Option<String>,
    version: u64,
}

impl<K, T> Default for PollState<K, T> {
    fn default() -> Self {
        Self {
            subject: None,
            generation: 0,
            entry: None,
            loading: false,
            error: None,
            version: 0,
        }
    }
}

impl<K: PartialEq, T: Serialize> PollState<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin (or resume) polling `subject`. Resuming the same subject keeps the
    /// published value so the view does not flash a loading state.
    pub fn begin(&mut self, subject: K) -> Ticket {
        let same = self.subject.as_ref() == Some(&subject);
        if !same {
            self.entry = None;
            self.error = None;
            self.subject = Some(subject);
        }
        self.loading = self.entry.is_none();
        self.generation += 1;
        Ticket(self.generation)
    }

    /// Forget the subject and everything published for it.
    pub fn reset(&mut self) {
        self.subject = None;
        self.entry = None;
        self.error = None;
        self.loading = false;
        self.generation += 1;
    }

    /// Apply a fetch result. Only `Changed` replaces the published value.
    pub fn apply(&mut self, ticket: Ticket, result: Result<T, String>) -> PollOutcome {
        if ticket.0 != self.generation || self.subject.is_none() {
            return PollOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(value) => {
                self.error = None;
                let fingerprint = Fingerprint::of(&value);
                if let Some(entry) = &self.entry {
                    if fingerprint.is_some() && entry.fingerprint == fingerprint {
                        return PollOutcome::Unchanged;
                    }
                }
                self.entry = Some(CacheEntry {
                    value: Arc::new(value),
                    fingerprint,
                });
                self.version += 1;
                PollOutcome::Changed
            }
            Err(message) => {
                self.error = Some(message);
                PollOutcome::Failed
            }
        }
    }
}

impl<K, T> PollState<K, T> {
    /// Whether `ticket` belongs to the subject being polled right now.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation && self.subject.is_some()
    }

    pub fn subject(&self) -> Option<&K> {
        self.subject.as_ref()
    }

    pub fn value(&self) -> Option<&Arc<T>> {
        self.entry.as_ref().map(|e| &e.value)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Bumped once per published change; lets callers skip work on unchanged polls.
    pub fn version(&self) -> u64 {
        self.version
    }
}

// ── Poll loop ──

/// A single repeating fetch task. At most one fetch is in flight per loop.
#[derive(Default)]
pub struct PollLoop {
    task: Option<JoinHandle<()>>,
    wake: Option<Arc<Notify>>,
}

impl PollLoop {
    /// Start (or restart) the loop. The first fetch runs immediately, later ones on
    /// multiples of `interval` from the start. The job returns `false` once its
    /// consumer is gone.
    pub fn start<F, Fut>(&mut self, interval: Duration, mut job: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.stop();
        let wake = Arc::new(Notify::new());
        let waker = wake.clone();
        let interval = interval.max(MIN_INTERVAL);
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A fetch longer than the interval pushes the grid back instead of bursting.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = waker.notified() => ticker.reset(),
                    _ = ticker.tick() => {}
                }
                if !job().await {
                    tracing::debug!("Poll consumer closed, stopping loop");
                    break;
                }
            }
        }));
        self.wake = Some(wake);
    }

    /// Fetch as soon as the current fetch (if any) completes. Repeated requests
    /// before then coalesce into one.
    pub fn refresh(&self) {
        if let Some(wake) = &self.wake {
            wake.notify_one();
        }
    }

    /// Cancel the loop. An in-flight fetch is dropped with the task.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.wake = None;
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Command dispatch ──

/// Owns the list and detail loops and turns view commands into loop operations.
pub struct Pollers {
    gateway: Arc<dyn FetchGateway>,
    tx: mpsc::UnboundedSender<AppEvent>,
    interval: Duration,
    limit: usize,
    runs: PollLoop,
    detail: PollLoop,
}

impl Pollers {
    pub fn new(
        gateway: Arc<dyn FetchGateway>,
        tx: mpsc::UnboundedSender<AppEvent>,
        interval: Duration,
        limit: usize,
    ) -> Self {
        Self {
            gateway,
            tx,
            interval,
            limit,
            runs: PollLoop::default(),
            detail: PollLoop::default(),
        }
    }

    pub fn dispatch(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::PollRuns { repo, ticket } => {
                    tracing::debug!(%repo, "Starting list polling");
                    let (gateway, tx, limit) = (self.gateway.clone(), self.tx.clone(), self.limit);
                    self.runs.start(self.interval, move || {
                        let (gateway, tx, repo) = (gateway.clone(), tx.clone(), repo.clone());
                        async move {
                            if !send(&tx, AppEvent::RunsFetchStarted { ticket, at: started_now() }) {
                                return false;
                            }
                            let result = gateway
                                .list_runs(&repo, limit)
                                .await
                                .map_err(|e| format!("{e}"));
                            send(&tx, AppEvent::RunsFetched { ticket, result })
                        }
                    });
                }
                Command::PollDetail {
                    repo,
                    run_id,
                    ticket,
                } => {
                    tracing::debug!(%repo, run_id, "Starting detail polling");
                    let (gateway, tx) = (self.gateway.clone(), self.tx.clone());
                    self.detail.start(self.interval, move || {
                        let (gateway, tx, repo) = (gateway.clone(), tx.clone(), repo.clone());
                        async move {
                            if !send(&tx, AppEvent::DetailFetchStarted { ticket, at: started_now() }) {
                                return false;
                            }
                            let result = gateway
                                .get_run_detail(&repo, run_id)
                                .await
                                .map_err(|e| format!("{e}"));
                            send(&tx, AppEvent::DetailFetched { ticket, result })
                        }
                    });
                }
                Command::StopRuns => self.runs.stop(),
                Command::StopDetail => self.detail.stop(),
                Command::RefreshRuns => self.runs.refresh(),
                Command::RefreshDetail => self.detail.refresh(),
                Command::OpenUrl(url) => {
                    if let Err(e) = self.gateway.open_in_browser(&url) {
                        send(&self.tx, AppEvent::Error(format!("Failed to open browser: {e}")));
                    }
                }
                Command::Quit => {
                    self.runs.stop();
                    self.detail.stop();
                }
            }
        }
    }

    pub fn runs_active(&self) -> bool {
        self.runs.is_running()
    }

    pub fn detail_active(&self) -> bool {
        self.detail.is_running()
    }
}

/// Read through tokio's clock so paused-time tests see virtual instants.
fn started_now() -> Instant {
    tokio::time::Instant::now().into_std()
}

fn send(tx: &mpsc::UnboundedSender<AppEvent>, event: AppEvent) -> bool {
    if tx.send(event).is_err() {
        tracing::warn!("Event channel closed, dropping poll event");
        return false;
    }
    true
}
