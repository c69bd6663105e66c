//! Simulate command implementation.
//!
//! Runs the bunnyhop loop against real keyboard and focus state, with
//! memory writes logged instead of performed.

use std::path::Path;

use anyhow::Result;

#[cfg(not(target_os = "windows"))]
pub fn run(_config: Option<&Path>) -> Result<()> {
    anyhow::bail!("simulate needs the Windows keyboard and window APIs")
}

#[cfg(target_os = "windows")]
pub fn run(config: Option<&Path>) -> Result<()> {
    use std::sync::Arc;

    use anyhow::{Context, anyhow, bail};
    use tracing::info;
    use wingtip_core::{
        AsyncKeyboard, Bunnyhop, BunnyhopSettings, CancellationToken, ConfigStore, DryRunMemory,
        FeatureRunner, ForegroundWindow, HttpFetcher, OffsetFetcher, OffsetRefresher,
        SharedOffsets,
    };

    let store = super::config_store(config)?;
    let loaded = store.load().context("Failed to load config")?;

    let shared = Arc::new(SharedOffsets::new());
    let refresher = OffsetRefresher::new(
        OffsetFetcher::new(store, HttpFetcher::new()),
        Arc::clone(&shared),
    );
    if refresher.refresh().is_none() {
        bail!("No offsets available");
    }

    // Running this command is the opt-in, regardless of the General flag
    let settings = BunnyhopSettings {
        enabled: true,
        ..BunnyhopSettings::from(&loaded)
    };
    info!(
        "Hold '{}' in the focused game window; writes are logged, not performed",
        settings.jump_key
    );

    let memory = Arc::new(DryRunMemory::default());
    let hop = Bunnyhop::new(Arc::clone(&memory), AsyncKeyboard, shared);
    let shutdown = CancellationToken::new();
    let runner = Arc::new(FeatureRunner::new(
        hop,
        settings,
        ForegroundWindow::default(),
        shutdown.clone(),
    ));

    let runner_ctrlc = Arc::clone(&runner);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        runner_ctrlc.stop();
        shutdown.cancel();
    })
    .context("Failed to set Ctrl+C handler")?;

    runner
        .spawn()?
        .join()
        .map_err(|_| anyhow!("Bunnyhop thread panicked"))??;

    info!("Simulation ended, {} address(es) written", memory.touched());
    Ok(())
}
