use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Cancellation and deadline signal for a single call.
///
/// The provider never acts on a `CallContext` itself. It is handed unchanged to the backend SDK,
/// which decides how to honor cancellation and deadlines.
///
/// Clones share the same cancellation flag, so a clone kept by the caller can cancel a call that
/// is in flight on another thread.
///
/// # Examples
/// ```
/// # use std::time::Duration;
/// # use bucketeer_openfeature::CallContext;
/// let ctx = CallContext::with_timeout(Duration::from_secs(1));
/// let handle = ctx.clone();
/// handle.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> CallContext {
        CallContext::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> CallContext {
        CallContext::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> CallContext {
        CallContext {
            deadline: Some(deadline),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal cancellation to every holder of this context.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` if [`CallContext::cancel`] was called on this context or any of its clones.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Deadline of this context, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline. Returns `None` when there is no deadline and
    /// `Some(Duration::ZERO)` once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns `true` if the context was cancelled or its deadline has passed.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.remaining() == Some(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::CallContext;

    #[test]
    fn background_is_never_done() {
        let ctx = CallContext::background();
        assert_eq!(ctx.deadline(), None);
        assert_eq!(ctx.remaining(), None);
        assert!(!ctx.is_done());
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let ctx = CallContext::with_timeout(Duration::from_secs(60));
        let clone = ctx.clone();

        {
            let clone = clone.clone();
            let _ = std::thread::spawn(move || clone.cancel()).join();
        }

        assert!(ctx.is_cancelled());
        assert!(clone.is_done());
    }

    #[test]
    fn expired_deadline_is_done() {
        let ctx = CallContext::with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
        assert!(ctx.is_done());
        assert!(!ctx.is_cancelled());
    }
}
