//! Jump automation: toggles the force-jump button while the jump key is held.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use super::{Feature, FeatureRuntimeState};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::input::{InputState, VirtualKey};
use crate::memory::{CLIENT_MODULE, ProcessMemory};
use crate::offset::SharedOffsets;

/// Force-jump button value while the jump is pressed
pub const FORCE_JUMP_ACTIVE: i32 = 65537;
/// Force-jump button value while released
pub const FORCE_JUMP_INACTIVE: i32 = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BunnyhopSettings {
    pub enabled: bool,
    pub jump_key: VirtualKey,
    pub jump_delay: Duration,
}

impl From<&Config> for BunnyhopSettings {
    fn from(config: &Config) -> Self {
        Self {
            enabled: config.general.bunnyhop,
            jump_key: VirtualKey::from_name(&config.bunnyhop.jump_key),
            jump_delay: config.bunnyhop.jump_delay(),
        }
    }
}

impl Default for BunnyhopSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

pub struct Bunnyhop<M, I> {
    memory: M,
    input: I,
    offsets: Arc<SharedOffsets>,
    force_jump_address: Option<u64>,
    state: FeatureRuntimeState,
}

impl<M: ProcessMemory, I: InputState> Bunnyhop<M, I> {
    pub fn new(memory: M, input: I, offsets: Arc<SharedOffsets>) -> Self {
        Self {
            memory,
            input,
            offsets,
            force_jump_address: None,
            state: FeatureRuntimeState::default(),
        }
    }

    pub fn force_jump_address(&self) -> Option<u64> {
        self.force_jump_address
    }

    pub fn state(&self) -> &FeatureRuntimeState {
        &self.state
    }

    /// Write `value`, recording the outcome. Returns whether it landed.
    fn write(&mut self, address: u64, value: i32) -> bool {
        match self.memory.write_i32(address, value) {
            Ok(()) => {
                self.state.record_success();
                true
            }
            Err(e) => {
                let label = if value == FORCE_JUMP_ACTIVE {
                    "activating"
                } else {
                    "deactivating"
                };
                error!("Error {} jump: {}", label, e);
                if self.state.record_failure() {
                    warn!(
                        "Jump writes failing for {} consecutive ticks; is the game still running?",
                        self.state.consecutive_failures
                    );
                }
                false
            }
        }
    }
}

impl<M: ProcessMemory, I: InputState> Feature for Bunnyhop<M, I> {
    type Settings = BunnyhopSettings;

    const NAME: &'static str = "Bunnyhop";

    fn initialize(&mut self) -> Result<()> {
        self.force_jump_address = None;
        let offsets = self
            .offsets
            .load()
            .ok_or_else(|| Error::NotStartable("dwForceJump offset not initialized".to_string()))?;
        let base = self.memory.module_base(CLIENT_MODULE)?;

        let address = base.checked_add(offsets.force_jump).ok_or_else(|| {
            Error::NotStartable(format!(
                "dwForceJump {:#x} out of range for module base {:#x}",
                offsets.force_jump, base
            ))
        })?;
        debug!("Force jump address: {:#x}", address);
        self.force_jump_address = Some(address);
        self.state = FeatureRuntimeState::default();
        Ok(())
    }

    fn tick(&mut self, settings: &BunnyhopSettings, now: Instant) -> Result<()> {
        let address = self
            .force_jump_address
            .ok_or_else(|| Error::NotStartable("force jump address not initialized".to_string()))?;

        let pressed = settings.enabled && self.input.is_key_down(settings.jump_key);

        if pressed {
            if self.state.delay_elapsed(now, settings.jump_delay) {
                let (value, active) = if self.state.action_active {
                    (FORCE_JUMP_INACTIVE, false)
                } else {
                    (FORCE_JUMP_ACTIVE, true)
                };
                if self.write(address, value) {
                    self.state.action_active = active;
                    self.state.last_action = Some(now);
                }
            }
        } else if self.state.action_active && self.write(address, FORCE_JUMP_INACTIVE) {
            self.state.action_active = false;
        }

        Ok(())
    }

    fn release(&mut self) {
        let Some(address) = self.force_jump_address else {
            return;
        };
        if !self.state.action_active {
            return;
        }
        match self.memory.write_i32(address, FORCE_JUMP_INACTIVE) {
            Ok(()) => self.state.action_active = false,
            Err(e) => error!("Error deactivating jump during stop: {}", e),
        }
    }
}
