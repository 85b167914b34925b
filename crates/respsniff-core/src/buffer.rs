//! Debounced FIFO of accepted events.
//!
//! Every accepted event restarts a quiet-period timer. The buffer only becomes
//! ready to drain once that timer fires without being superseded, so a burst
//! of related responses is released as a whole instead of piecemeal.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::error::CaptureError;
use crate::types::RawEvent;

/// Handle to the pending quiet-period timer task.
///
/// The generation is checked again when the timer fires, since a cancelled
/// task may already be past its sleep and waiting on the state lock.
struct QuietTimer {
    generation: u64,
    task: JoinHandle<()>,
}

impl QuietTimer {
    fn cancel(self) {
        trace!("Cancelling quiet-period timer #{}", self.generation);
        self.task.abort();
    }
}

struct BufferState {
    queue: VecDeque<RawEvent>,
    timer: Option<QuietTimer>,
    generation: u64,
}

struct Shared {
    /// Queue, timer and generation. Never held across an await.
    state: Mutex<BufferState>,
    /// Readiness flag; only written while `state` is locked.
    ready_tx: watch::Sender<bool>,
    quiet_period: Duration,
    runtime: Handle,
}

/// Readiness-gated FIFO of captured events.
#[derive(Clone)]
pub struct EventBuffer {
    inner: Arc<Shared>,
}

impl EventBuffer {
    /// Create a buffer with the given quiet period.
    ///
    /// Timer tasks are spawned on the current Tokio runtime, so this fails
    /// with [`CaptureError::Runtime`] when called outside one.
    pub fn new(quiet_period: Duration) -> Result<Self, CaptureError> {
        let runtime =
            Handle::try_current().map_err(|e| CaptureError::Runtime(e.to_string()))?;
        let (ready_tx, _) = watch::channel(false);
        Ok(Self {
            inner: Arc::new(Shared {
                state: Mutex::new(BufferState {
                    queue: VecDeque::new(),
                    timer: None,
                    generation: 0,
                }),
                ready_tx,
                quiet_period,
                runtime,
            }),
        })
    }

    pub fn quiet_period(&self) -> Duration {
        self.inner.quiet_period
    }

    /// Append an accepted event and restart the quiet-period timer.
    pub fn on_accepted(&self, event: RawEvent) {
        let mut state = self.inner.state.lock();
        trace!("Buffering response {} ({})", event.request_id, event.url);
        state.queue.push_back(event);

        state.generation += 1;
        let generation = state.generation;
        // Supersede the previous timer before arming the new one.
        if let Some(previous) = state.timer.take() {
            previous.cancel();
        }
        self.inner.ready_tx.send_replace(false);

        let task = self.inner.runtime.spawn(Self::quiet_period_elapsed(
            Arc::downgrade(&self.inner),
            generation,
        ));
        state.timer = Some(QuietTimer { generation, task });
    }

    async fn quiet_period_elapsed(shared: Weak<Shared>, generation: u64) {
        let Some(quiet_period) = shared.upgrade().map(|s| s.quiet_period) else {
            return;
        };
        time::sleep(quiet_period).await;

        let Some(shared) = shared.upgrade() else {
            return;
        };
        let mut state = shared.state.lock();
        if state.generation != generation {
            trace!("Ignoring stale quiet-period timer #{}", generation);
            return;
        }
        if !state.queue.is_empty() {
            debug!("Buffer settled with {} pending responses", state.queue.len());
            shared.ready_tx.send_replace(true);
        }
        // Dropping our own JoinHandle only detaches the task.
        state.timer = None;
    }

    /// Wait until the buffer is ready, then pop its head.
    ///
    /// The timeout is a hard deadline measured from this call. On timeout the
    /// queue is left untouched.
    pub async fn pop_ready(&self, timeout: Duration) -> Result<RawEvent, CaptureError> {
        let deadline = Instant::now() + timeout;
        let mut ready_rx = self.inner.ready_tx.subscribe();

        loop {
            let settled = time::timeout_at(deadline, ready_rx.wait_for(|ready| *ready))
                .await
                .map(|res| res.is_ok());
            if !matches!(settled, Ok(true)) {
                return Err(CaptureError::Timeout(timeout));
            }

            let mut state = self.inner.state.lock();
            if *self.inner.ready_tx.borrow() {
                if let Some(event) = state.queue.pop_front() {
                    if state.queue.is_empty() {
                        self.inner.ready_tx.send_replace(false);
                    }
                    trace!(
                        "Popped response {} ({} still pending)",
                        event.request_id,
                        state.queue.len()
                    );
                    return Ok(event);
                }
                self.inner.ready_tx.send_replace(false);
            }
            drop(state);
            // Another consumer won the race or a new arrival reset the timer.
        }
    }

    /// Whether the buffer has settled and can be drained without waiting.
    pub fn is_ready(&self) -> bool {
        *self.inner.ready_tx.borrow()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().queue.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        !self.is_empty()
    }

    /// Whether a quiet-period timer is currently armed.
    pub fn timer_armed(&self) -> bool {
        self.inner.state.lock().timer.is_some()
    }
}

impl std::fmt::Debug for EventBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBuffer")
            .field("quiet_period", &self.inner.quiet_period)
            .field("pending", &self.pending_count())
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
