use arc_swap::{ArcSwap, Guard};
use std::sync::Arc;

/// Atomically swappable settings snapshot.
///
/// Readers take a lock-free snapshot once per iteration; writers replace the
/// whole value, so a reader never observes a half-updated struct.
pub struct ConfigHandle<T> {
    inner: Arc<ArcSwap<T>>,
}

impl<T> ConfigHandle<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(value)),
        }
    }

    /// Load the current snapshot. Lock-free.
    pub fn load(&self) -> Guard<Arc<T>> {
        self.inner.load()
    }

    pub fn load_full(&self) -> Arc<T> {
        self.inner.load_full()
    }

    pub fn store(&self, value: T) {
        self.inner.store(Arc::new(value));
    }
}

impl<T> Clone for ConfigHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_swaps_for_all_clones() {
        let handle = ConfigHandle::new(10u64);
        let clone = handle.clone();

        let before = handle.load_full();
        clone.store(20);

        assert_eq!(*before, 10);
        assert_eq!(**handle.load(), 20);
    }
}
