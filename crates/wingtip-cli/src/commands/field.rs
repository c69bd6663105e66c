//! Field command implementation.

use std::path::Path;

use anyhow::{Result, bail};
use wingtip_core::{FieldLookup, class_layout};

use super::read_json;

pub fn run(client: &Path, class: &str, field: &str) -> Result<()> {
    let document = read_json(client)?;
    let layout = class_layout(&document);

    match layout.lookup(class, field) {
        FieldLookup::Found { owner, offset } => {
            println!("{}::{}", class, field);
            println!("Declared on: {}", owner);
            println!("Offset: {} (0x{:X})", offset, offset);
            Ok(())
        }
        miss => bail!("{}", miss),
    }
}
