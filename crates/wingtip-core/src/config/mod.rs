//! Configuration document shared by the offset fetcher and the features.
//!
//! The document is TOML with a `[General]` section (feature toggles and
//! offset source selection) and one section per feature:
//!
//! ```toml
//! [General]
//! Bunnyhop = true
//! OffsetSource = "a2x"
//!
//! [Bunnyhop]
//! JumpKey = "space"
//! JumpDelay = 0.01
//! ```

mod handle;
mod store;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use handle::ConfigHandle;
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore, default_config_path};

/// Source id the fetcher falls back to when the configured one is unusable
pub const DEFAULT_SOURCE_ID: &str = "a2x";
/// Sentinel source id selecting the three local files
pub const LOCAL_SOURCE_ID: &str = "local";

/// Default local file names, resolved against the config directory
pub const OFFSETS_FILE_NAME: &str = "offsets.json";
pub const CLIENT_DLL_FILE_NAME: &str = "client_dll.json";
pub const BUTTONS_FILE_NAME: &str = "buttons.json";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "General", default)]
    pub general: GeneralConfig,
    #[serde(rename = "Bunnyhop", default)]
    pub bunnyhop: BunnyhopConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GeneralConfig {
    pub bunnyhop: bool,
    pub offset_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offsets_file: Option<PathBuf>,
    #[serde(rename = "ClientDLLFile", skip_serializing_if = "Option::is_none")]
    pub client_dll_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            bunnyhop: false,
            offset_source: DEFAULT_SOURCE_ID.to_string(),
            offsets_file: None,
            client_dll_file: None,
            buttons_file: None,
        }
    }
}

impl GeneralConfig {
    pub fn uses_local_source(&self) -> bool {
        self.offset_source == LOCAL_SOURCE_ID
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BunnyhopConfig {
    /// Symbolic key name, see [`crate::input::VirtualKey`]
    pub jump_key: String,
    /// Seconds between jump state transitions while the key is held
    pub jump_delay: f64,
}

impl BunnyhopConfig {
    pub const DEFAULT_JUMP_DELAY: Duration = Duration::from_millis(10);

    /// Jump delay as a `Duration`, falling back to the default for
    /// negative or non-finite values.
    pub fn jump_delay(&self) -> Duration {
        match Duration::try_from_secs_f64(self.jump_delay) {
            Ok(delay) => delay,
            Err(e) => {
                warn!(
                    "Invalid JumpDelay {} ({}), using {:?}",
                    self.jump_delay,
                    e,
                    Self::DEFAULT_JUMP_DELAY
                );
                Self::DEFAULT_JUMP_DELAY
            }
        }
    }
}

impl Default for BunnyhopConfig {
    fn default() -> Self {
        Self {
            jump_key: "space".to_string(),
            jump_delay: Self::DEFAULT_JUMP_DELAY.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let content = r#"
[General]
Bunnyhop = true
OffsetSource = "local"
ButtonsFile = "C:/offsets/buttons.json"

[Bunnyhop]
JumpKey = "mouse5"
JumpDelay = 0.05
"#;
        let config: Config = toml::from_str(content).unwrap();
        assert!(config.general.bunnyhop);
        assert!(config.general.uses_local_source());
        assert_eq!(
            config.general.buttons_file,
            Some(PathBuf::from("C:/offsets/buttons.json"))
        );
        assert_eq!(config.general.offsets_file, None);
        assert_eq!(config.bunnyhop.jump_key, "mouse5");
        assert_eq!(config.bunnyhop.jump_delay(), Duration::from_millis(50));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.general.offset_source, DEFAULT_SOURCE_ID);
        assert_eq!(config.bunnyhop.jump_key, "space");
    }

    #[test]
    fn test_negative_delay_falls_back() {
        let config = BunnyhopConfig {
            jump_key: "space".to_string(),
            jump_delay: -1.0,
        };
        assert_eq!(config.jump_delay(), BunnyhopConfig::DEFAULT_JUMP_DELAY);
    }

    #[test]
    fn test_serialize_skips_unset_paths() {
        let content = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(content.contains("[General]"));
        assert!(content.contains("OffsetSource = \"a2x\""));
        assert!(!content.contains("OffsetsFile"));
    }
}
