//! Session-wide cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set once when a map session is torn down; never reset.
///
/// Clones share the same flag. Async continuations check it before
/// touching any session state.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the session as cancelled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`CancellationFlag::cancel`] has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
