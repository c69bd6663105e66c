//! Process memory stand-in that records writes instead of performing them.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use super::ProcessMemory;
use crate::error::{Error, Result};

/// Logs every write and remembers the last value per address.
///
/// Lets a feature loop be rehearsed end to end (key binding, delays, focus)
/// without a target process. Every module reports the same base address.
pub struct DryRunMemory {
    base: u64,
    values: Mutex<HashMap<u64, i32>>,
}

impl DryRunMemory {
    pub fn new(base: u64) -> Self {
        Self {
            base,
            values: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct addresses written so far
    pub fn touched(&self) -> usize {
        self.values.lock().map(|values| values.len()).unwrap_or(0)
    }
}

impl Default for DryRunMemory {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ProcessMemory for DryRunMemory {
    fn read_i32(&self, address: u64) -> Result<i32> {
        let values = self.values.lock().map_err(|_| Error::MemoryReadFailed {
            address,
            message: "dry-run state poisoned".to_string(),
        })?;
        values
            .get(&address)
            .copied()
            .ok_or_else(|| Error::MemoryReadFailed {
                address,
                message: "never written".to_string(),
            })
    }

    fn write_i32(&self, address: u64, value: i32) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| Error::MemoryWriteFailed {
            address,
            message: "dry-run state poisoned".to_string(),
        })?;
        info!(address = %format!("{:#x}", address), value, "Dry-run write");
        values.insert(address, value);
        Ok(())
    }

    fn module_base(&self, _module: &str) -> Result<u64> {
        Ok(self.base)
    }
}
