//! Access to the target process's memory.
//!
//! The crate does not open processes itself; a host supplies a
//! [`ProcessMemory`] implementation backed by the platform primitives.
//! [`DryRunMemory`] stands in when rehearsing a feature without a target.

mod dry_run;
#[cfg(test)]
pub mod mock;

pub use dry_run::DryRunMemory;

use std::sync::Arc;

use crate::error::Result;

/// Module the resolved offsets are relative to
pub const CLIENT_MODULE: &str = "client.dll";

/// Read/write access to another process's address space.
///
/// Failures are per call: [`crate::Error::ProcessNotFound`] when the process
/// is gone, [`crate::Error::AccessDenied`] when the handle lacks rights,
/// memory read/write errors otherwise.
pub trait ProcessMemory: Send + Sync {
    fn read_i32(&self, address: u64) -> Result<i32>;

    fn write_i32(&self, address: u64, value: i32) -> Result<()>;

    /// Load address of `module` in the target process
    fn module_base(&self, module: &str) -> Result<u64>;
}

impl<T: ProcessMemory + ?Sized> ProcessMemory for Arc<T> {
    fn read_i32(&self, address: u64) -> Result<i32> {
        (**self).read_i32(address)
    }

    fn write_i32(&self, address: u64, value: i32) -> Result<()> {
        (**self).write_i32(address, value)
    }

    fn module_base(&self, module: &str) -> Result<u64> {
        (**self).module_base(module)
    }
}
