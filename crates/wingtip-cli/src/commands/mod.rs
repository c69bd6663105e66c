//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod fetch;
pub mod field;
pub mod keys;
pub mod resolve;
pub mod simulate;
pub mod sources;
pub mod watch;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::Value;
use wingtip_core::{FileConfigStore, ResolvedOffsets, default_config_path};

/// Config store at `path`, or the platform default
pub fn config_store(path: Option<&Path>) -> Result<FileConfigStore> {
    let path: PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path().context("Failed to determine config path")?,
    };
    Ok(FileConfigStore::new(path))
}

pub fn read_json(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Print a resolved map as an aligned table or pretty JSON
pub fn print_offsets(offsets: &ResolvedOffsets, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(offsets)?);
        return Ok(());
    }

    let width = offsets
        .entries()
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);
    for (name, value) in offsets.entries() {
        println!("{:<width$}  {}", name, format!("0x{:X}", value).cyan());
    }
    Ok(())
}

pub fn write_offsets(offsets: &ResolvedOffsets, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(offsets)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
