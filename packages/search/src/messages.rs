//! Auto-clearing location error messages.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::LocationError;

/// How long a message stays visible.
pub const MESSAGE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Default)]
struct Slot {
    current: Option<LocationError>,
    generation: u64,
    clear_task: Option<JoinHandle<()>>,
}

/// Holds at most one location message.
///
/// Posting replaces the current message and restarts its timer. Must be
/// used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct LocationMessages {
    slot: Arc<Mutex<Slot>>,
    ttl: Duration,
}

impl Default for LocationMessages {
    fn default() -> Self {
        Self::with_ttl(MESSAGE_TTL)
    }
}

impl LocationMessages {
    /// Messages that clear after [`MESSAGE_TTL`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages that clear after `ttl`.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            ttl,
        }
    }

    /// Shows `error`'s message, replacing any current one.
    ///
    /// Errors without a message are ignored.
    pub fn post(&self, error: LocationError) {
        if error.message().is_none() {
            return;
        }

        let mut slot = self.lock();
        if let Some(previous) = slot.clear_task.take() {
            previous.abort();
        }
        slot.generation += 1;
        slot.current = Some(error);

        let generation = slot.generation;
        let shared = Arc::clone(&self.slot);
        let deadline = Instant::now() + self.ttl;
        slot.clear_task = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut slot = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.generation == generation {
                slot.current = None;
                slot.clear_task = None;
            }
        }));
    }

    /// The error currently shown.
    #[must_use]
    pub fn current(&self) -> Option<LocationError> {
        self.lock().current
    }

    /// The message currently shown.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        self.current().and_then(LocationError::message)
    }

    /// Hides the current message immediately.
    pub fn clear(&self) {
        let mut slot = self.lock();
        if let Some(task) = slot.clear_task.take() {
            task.abort();
        }
        slot.generation += 1;
        slot.current = None;
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
