//! Sources command implementation.

use anyhow::Result;
use owo_colors::OwoColorize;
use wingtip_core::{HttpFetcher, SourceRegistry};

pub fn run() -> Result<()> {
    let entries = SourceRegistry::default().list_sources_for_display(&HttpFetcher::new());

    let width = entries.iter().map(|e| e.id.len()).max().unwrap_or(0);
    for entry in entries {
        println!("{:<width$}  {}", entry.id.bold(), entry.display);
    }
    Ok(())
}
