//! Fetch command implementation.

use std::path::Path;

use anyhow::{Result, bail};
use tracing::info;
use wingtip_core::{HttpFetcher, OffsetFetcher, OffsetSource};

use super::{config_store, print_offsets, write_offsets};

pub fn run(config: Option<&Path>, json: bool, output: Option<&Path>) -> Result<()> {
    let store = config_store(config)?;
    let fetcher = OffsetFetcher::new(store, HttpFetcher::new());

    match fetcher.configured_source()? {
        OffsetSource::Local(files) => {
            info!("Configured source: local files ({})", files.offsets.display())
        }
        OffsetSource::Remote(source) => {
            info!("Configured source: {} ({})", source.name, source.repository)
        }
    }

    let Some(fetched) = fetcher.fetch_offsets() else {
        bail!("No offsets available");
    };

    print_offsets(&fetched.resolved, json)?;

    if let Some(path) = output {
        write_offsets(&fetched.resolved, path)?;
        info!("Wrote offsets from '{}' to {}", fetched.source_id, path.display());
    }
    Ok(())
}
