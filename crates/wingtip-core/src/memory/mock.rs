//! Recording process memory for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::ProcessMemory;
use crate::error::{Error, Result};

pub struct MockProcessMemory {
    base: Option<u64>,
    values: Mutex<HashMap<u64, i32>>,
    writes: Mutex<Vec<(u64, i32)>>,
    fail_writes: AtomicBool,
}

impl MockProcessMemory {
    pub fn new(base: u64) -> Self {
        Self {
            base: Some(base),
            values: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// A process whose module cannot be found
    pub fn detached() -> Self {
        Self {
            base: None,
            ..Self::new(0)
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes in order
    pub fn writes(&self) -> Vec<(u64, i32)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl ProcessMemory for MockProcessMemory {
    fn read_i32(&self, address: u64) -> Result<i32> {
        self.values
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .ok_or_else(|| Error::MemoryReadFailed {
                address,
                message: "unmapped".to_string(),
            })
    }

    fn write_i32(&self, address: u64, value: i32) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::MemoryWriteFailed {
                address,
                message: "access denied".to_string(),
            });
        }
        self.values.lock().unwrap().insert(address, value);
        self.writes.lock().unwrap().push((address, value));
        Ok(())
    }

    fn module_base(&self, module: &str) -> Result<u64> {
        self.base
            .ok_or_else(|| Error::ProcessNotFound(format!("{} not loaded", module)))
    }
}
