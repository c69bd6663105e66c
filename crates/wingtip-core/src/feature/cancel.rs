use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Cooperative cancellation flag with interruptible waits.
///
/// Clones share the same flag. Unlike `thread::sleep()`, [`wait`](Self::wait)
/// returns as soon as the token is cancelled.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that is already cancelled
    pub fn cancelled() -> Self {
        let token = Self::new();
        token.cancel();
        token
    }

    /// Cancel, waking all waiting threads.
    pub fn cancel(&self) {
        // Hold the mutex so a waiter cannot miss the notification between
        // its flag check and going to sleep.
        let _guard = self.inner.mutex.lock();
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Wait for `duration` or until cancelled.
    ///
    /// Returns `true` if the token was cancelled, `false` if the wait completed normally.
    pub fn wait(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }

        let guard = match self.inner.mutex.lock() {
            Ok(guard) => guard,
            // Mutex poisoned, treat as cancelled
            Err(_) => return true,
        };

        match self
            .inner
            .condvar
            .wait_timeout_while(guard, duration, |_| !self.is_cancelled())
        {
            Ok((_, timeout)) => !timeout.timed_out(),
            Err(_) => true,
        }
    }
}
