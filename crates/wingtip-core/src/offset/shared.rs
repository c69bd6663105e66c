use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{info, warn};

use super::fetch::{FetchedOffsets, OffsetFetcher};
use super::resolve::ResolvedOffsets;
use super::source::DocumentFetcher;
use crate::config::ConfigStore;

/// Publish point for the resolved offset map.
///
/// Readers hold an `Arc` snapshot; publishing swaps the pointer, so a map a
/// reader already holds is never mutated underneath it.
#[derive(Default)]
pub struct SharedOffsets {
    current: ArcSwapOption<ResolvedOffsets>,
}

impl SharedOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> Option<Arc<ResolvedOffsets>> {
        self.current.load_full()
    }

    pub fn publish(&self, offsets: ResolvedOffsets) {
        self.current.store(Some(Arc::new(offsets)));
    }

    pub fn is_published(&self) -> bool {
        self.current.load().is_some()
    }
}

/// Runs fetch cycles and publishes successful results
pub struct OffsetRefresher<S, F> {
    fetcher: OffsetFetcher<S, F>,
    shared: Arc<SharedOffsets>,
}

impl<S: ConfigStore, F: DocumentFetcher> OffsetRefresher<S, F> {
    pub fn new(fetcher: OffsetFetcher<S, F>, shared: Arc<SharedOffsets>) -> Self {
        Self { fetcher, shared }
    }

    pub fn shared(&self) -> &Arc<SharedOffsets> {
        &self.shared
    }

    /// Fetch once. On failure the previously published map stays in place.
    ///
    /// Returns the fetch result when a new map was published.
    pub fn refresh(&self) -> Option<FetchedOffsets> {
        let Some(fetched) = self.fetcher.fetch_offsets() else {
            if self.shared.is_published() {
                warn!("No offsets available this cycle, keeping previous offsets");
            } else {
                warn!("No offsets available this cycle");
            }
            return None;
        };

        let changed = self
            .shared
            .load()
            .is_none_or(|previous| *previous != fetched.resolved);
        self.shared.publish(fetched.resolved.clone());
        if changed {
            info!(source = %fetched.source_id, "Published new offsets");
        }
        Some(fetched)
    }
}
