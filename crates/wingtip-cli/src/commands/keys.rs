//! Keys command implementation.

use anyhow::Result;
use wingtip_core::VirtualKey;

pub fn run() -> Result<()> {
    for key in VirtualKey::all() {
        println!("{:<10} 0x{:02X}", key.name(), key.code());
    }
    Ok(())
}
