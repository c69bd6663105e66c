//! Resolve command implementation.

use std::path::Path;

use anyhow::{Result, bail};
use owo_colors::OwoColorize;
use wingtip_core::try_extract;

use super::{print_offsets, read_json};

pub fn run(offsets: &Path, client: &Path, buttons: &Path, json: bool) -> Result<()> {
    let offsets = read_json(offsets)?;
    let client = read_json(client)?;
    let buttons = read_json(buttons)?;

    match try_extract(&offsets, &client, &buttons) {
        Ok(resolved) => print_offsets(&resolved, json),
        Err(e) => {
            for (key, lookup) in &e.lookups {
                eprintln!("{}: {}", key.red(), lookup);
            }
            bail!("{}", e)
        }
    }
}
