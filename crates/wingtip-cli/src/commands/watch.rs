//! Watch command implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};
use wingtip_core::{
    CancellationToken, HttpFetcher, OffsetFetcher, OffsetRefresher, ResolvedOffsets,
    SharedOffsets,
};

pub fn run(config: Option<&Path>, interval: u64) -> Result<()> {
    let store = super::config_store(config)?;
    let refresher = OffsetRefresher::new(
        OffsetFetcher::new(store, HttpFetcher::new()),
        Arc::new(SharedOffsets::new()),
    );

    let shutdown = CancellationToken::new();
    let shutdown_ctrlc = shutdown.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.cancel();
    })
    .context("Failed to set Ctrl+C handler")?;

    let interval = Duration::from_secs(interval.max(1));
    info!("Refreshing offsets every {}s", interval.as_secs());

    let mut last: Option<ResolvedOffsets> = None;
    loop {
        if let Some(fetched) = refresher.refresh() {
            if last.as_ref() == Some(&fetched.resolved) {
                debug!("Offsets unchanged (source: {})", fetched.source_id);
            } else {
                log_changes(last.as_ref(), &fetched.resolved);
                info!("Offsets updated from source '{}'", fetched.source_id);
                last = Some(fetched.resolved);
            }
        }

        if shutdown.wait(interval) {
            break;
        }
    }

    info!("Stopped watching offsets");
    Ok(())
}

fn log_changes(previous: Option<&ResolvedOffsets>, current: &ResolvedOffsets) {
    let Some(previous) = previous else {
        return;
    };
    for ((name, old), (_, new)) in previous.entries().iter().zip(current.entries().iter()) {
        if old != new {
            info!("  {}: {:#x} -> {:#x}", name, old, new);
        }
    }
}
