use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::types::MonitorError;

use super::super::api::{
    ApiRequest, BatchOutcome, EventStreamQuery, EventsQuery, SyncthingEvent, Transport,
    STATE_CHANGED,
};
use super::super::models::FolderState;
use super::super::notifier::FolderObserver;
use super::super::registry::{FolderRegistry, SharedRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamPhase {
    Idle,
    Starting,
    Polling,
}

/// Timing knobs for the event long-poll.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSettings {
    pub long_poll_timeout: Duration,
    pub request_timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Consecutive failed polls tolerated before giving up; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl StreamSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            long_poll_timeout: config.long_poll_timeout(),
            request_timeout: config.request_timeout(),
            initial_backoff: Duration::from_millis(config.retry_initial_backoff_ms),
            max_backoff: Duration::from_millis(config.retry_max_backoff_ms),
            max_attempts: config.retry_max_attempts,
        }
    }

    /// Delay before retry number `failures` (1-based), doubling up to `max_backoff`.
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_backoff)
    }

    fn poll_request_timeout(&self) -> Duration {
        self.long_poll_timeout.saturating_add(self.request_timeout)
    }
}

/// Apply a batch in daemon order. The cursor follows every event; only
/// `StateChanged` events for registered folders touch the registry.
pub fn apply_batch(
    registry: &mut FolderRegistry,
    cursor: u64,
    events: &[SyncthingEvent],
) -> BatchOutcome {
    let mut outcome = BatchOutcome {
        cursor,
        ..BatchOutcome::default()
    };

    for event in events {
        outcome.cursor = event.id;

        if event.event_type != STATE_CHANGED {
            outcome.ignored += 1;
            debug!(id = event.id, event_type = %event.event_type, "Ignoring unhandled event");
            continue;
        }

        let Some((folder_id, to)) = event.state_change() else {
            debug!(id = event.id, "StateChanged event without folder or target state");
            continue;
        };

        match registry.set_state(folder_id, FolderState::parse(to)) {
            Some(folder) => {
                debug!(
                    id = event.id,
                    folder = %folder_id,
                    state = %to,
                    at = ?event.occurred_at(),
                    "Folder state changed"
                );
                outcome.changed.push(folder);
            }
            None => debug!(folder = %folder_id, "State change for unknown folder"),
        }
    }

    outcome
}

#[derive(Debug)]
struct Control {
    phase: StreamPhase,
    generation: u64,
}

struct Shared {
    transport: Arc<dyn Transport>,
    registry: SharedRegistry,
    observer: Arc<dyn FolderObserver>,
    settings: StreamSettings,
    control: Mutex<Control>,
    cursor: AtomicU64,
    wake: Notify,
}

/// Long-polls the daemon's event log and applies it to the registry.
///
/// A single task runs the loop, so at most one poll is in flight. Stopping is
/// cooperative: an in-flight request is left to finish and its batch only
/// advances the cursor.
pub struct EventStream {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl EventStream {
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: SharedRegistry,
        observer: Arc<dyn FolderObserver>,
        settings: StreamSettings,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                registry,
                observer,
                settings,
                control: Mutex::new(Control {
                    phase: StreamPhase::Idle,
                    generation: 0,
                }),
                cursor: AtomicU64::new(0),
                wake: Notify::new(),
            }),
            task: Mutex::new(None),
        }
    }

    /// Begin listening. Returns `false` if the stream is already running.
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let generation = {
            let mut control = self.shared.control();
            if control.phase != StreamPhase::Idle {
                debug!(phase = ?control.phase, "Event stream already running");
                return false;
            }
            control.phase = StreamPhase::Starting;
            control.generation += 1;
            control.generation
        };

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(shared.run(generation));
        *lock(&self.task) = Some(handle);
        true
    }

    /// Stop listening. The returned handle resolves once the loop has exited,
    /// which may take up to one round-trip.
    pub fn stop(&self) -> Option<JoinHandle<()>> {
        let was_running = {
            let mut control = self.shared.control();
            let was_running = control.phase != StreamPhase::Idle;
            control.phase = StreamPhase::Idle;
            was_running
        };
        if was_running {
            info!("Stopped listening for Syncthing events");
            self.shared.wake.notify_waiters();
        }
        lock(&self.task).take()
    }

    pub fn phase(&self) -> StreamPhase {
        self.shared.control().phase
    }

    pub fn is_running(&self) -> bool {
        self.phase() != StreamPhase::Idle
    }

    pub fn cursor(&self) -> u64 {
        self.shared.cursor.load(Ordering::SeqCst)
    }
}

impl Shared {
    fn control(&self) -> MutexGuard<'_, Control> {
        lock(&self.control)
    }

    fn is_current(&self, generation: u64) -> bool {
        let control = self.control();
        control.generation == generation && control.phase == StreamPhase::Polling
    }

    /// Store a cursor only if no newer start has taken over.
    fn store_cursor(&self, generation: u64, cursor: u64) {
        let control = self.control();
        if control.generation == generation {
            self.cursor.store(cursor, Ordering::SeqCst);
        }
    }

    fn begin_polling(&self, generation: u64, seed: u64) -> bool {
        let mut control = self.control();
        if control.generation != generation || control.phase != StreamPhase::Starting {
            return false;
        }
        self.cursor.store(seed, Ordering::SeqCst);
        control.phase = StreamPhase::Polling;
        true
    }

    fn finish(&self, generation: u64) {
        let mut control = self.control();
        if control.generation == generation {
            control.phase = StreamPhase::Idle;
        }
    }

    async fn run(self: Arc<Self>, generation: u64) {
        let seed = match self.latest_event_id().await {
            Ok(id) => id,
            Err(err) => {
                warn!(error = ?err, "Failed to fetch latest event id");
                self.observer.on_error(&err);
                self.finish(generation);
                return;
            }
        };

        if !self.begin_polling(generation, seed) {
            debug!("Event stream stopped before polling began");
            return;
        }
        info!(cursor = seed, "Listening for Syncthing events");

        let mut failures: u32 = 0;
        loop {
            if !self.is_current(generation) {
                break;
            }

            let since = self.cursor.load(Ordering::SeqCst);
            match self.poll_once(since).await {
                Ok(events) => {
                    failures = 0;
                    if !self.is_current(generation) {
                        if let Some(last) = events.last() {
                            self.store_cursor(generation, last.id);
                        }
                        break;
                    }

                    let outcome = {
                        let mut registry = self.registry.lock().await;
                        apply_batch(&mut registry, since, &events)
                    };
                    self.store_cursor(generation, outcome.cursor);
                    for folder in outcome.changed {
                        self.observer.on_folder_state_changed(folder);
                    }
                }
                Err(err) => {
                    if !self.is_current(generation) {
                        break;
                    }
                    failures = failures.saturating_add(1);
                    self.observer.on_error(&err);

                    if let Some(max) = self.settings.max_attempts {
                        if failures > max {
                            error!(error = ?err, failures, "Giving up on Syncthing event stream");
                            self.finish(generation);
                            break;
                        }
                    }

                    let delay = self.settings.backoff(failures);
                    warn!(
                        error = ?err,
                        failures,
                        retry_in_ms = delay.as_millis() as u64,
                        "Event poll failed"
                    );
                    self.wait_or_stop(generation, delay).await;
                }
            }
        }
        debug!(generation, "Event loop exited");
    }

    /// Sleep for `delay`, returning early when the stream is stopped.
    async fn wait_or_stop(&self, generation: u64, delay: Duration) {
        let notified = self.wake.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if !self.is_current(generation) {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = notified.as_mut() => {}
        }
    }

    /// Id of the newest event in the log, or 0 when the log is empty.
    async fn latest_event_id(&self) -> Result<u64, MonitorError> {
        let request = ApiRequest::new("events").with_query(&EventsQuery { since: 0, limit: 1 })?;
        let events = SyncthingEvent::parse_batch(self.transport.get(request).await?)?;
        Ok(events.last().map(|event| event.id).unwrap_or(0))
    }

    async fn poll_once(&self, since: u64) -> Result<Vec<SyncthingEvent>, MonitorError> {
        let query = EventStreamQuery {
            since,
            timeout: self.settings.long_poll_timeout.as_secs(),
        };
        let request = ApiRequest::new("events")
            .with_query(&query)?
            .with_timeout(self.settings.poll_request_timeout());
        SyncthingEvent::parse_batch(self.transport.get(request).await?)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
