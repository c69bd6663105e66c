use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use super::Config;
use crate::error::{Error, Result};

/// Config file name inside the application config directory
const CONFIG_FILE: &str = "config.toml";

/// Default location: `<platform config dir>/wingtip/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| Error::InvalidConfig("cannot determine config directory".to_string()))?;
    Ok(dir.join("wingtip").join(CONFIG_FILE))
}

/// Persistent configuration document.
///
/// `save` must be durable when it returns; the offset fetcher relies on that
/// before continuing with a redirected source.
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<Config>;
    fn save(&self, config: &Config) -> Result<()>;
    /// Directory local offset files default to
    fn config_dir(&self) -> PathBuf;
}

/// TOML file on disk
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<Config> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.path.display());
                Ok(Config::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;

        // Write-then-rename so a crash never leaves a truncated config behind
        let tmp = self.path.with_extension("toml.tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        info!("Saved config to {}", self.path.display());
        Ok(())
    }

    fn config_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

/// In-memory store; clones share the same document.
#[derive(Debug, Clone)]
pub struct MemoryConfigStore {
    config: Arc<Mutex<Config>>,
    dir: PathBuf,
    saves: Arc<Mutex<usize>>,
}

impl MemoryConfigStore {
    pub fn new<P: Into<PathBuf>>(config: Config, dir: P) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            dir: dir.into(),
            saves: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of completed `save` calls
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<Config> {
        self.config
            .lock()
            .map(|c| c.clone())
            .map_err(|_| Error::InvalidConfig("config lock poisoned".to_string()))
    }

    fn save(&self, config: &Config) -> Result<()> {
        let mut current = self
            .config
            .lock()
            .map_err(|_| Error::InvalidConfig("config lock poisoned".to_string()))?;
        *current = config.clone();
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }

    fn config_dir(&self) -> PathBuf {
        self.dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = FileConfigStore::new(dir.path().join("config.toml"));
        assert_eq!(store.load().unwrap(), Config::default());
    }

    #[test]
    fn test_file_store_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = FileConfigStore::new(dir.path().join("nested").join("config.toml"));

        let mut config = Config::default();
        config.general.offset_source = "jesewe".to_string();
        config.bunnyhop.jump_key = "f5".to_string();
        store.save(&config).unwrap();

        assert!(!dir.path().join("nested").join("config.toml.tmp").exists());
        let loaded = store.load().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(store.config_dir(), dir.path().join("nested"));
    }

    #[test]
    fn test_file_store_rejects_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[General\nBunnyhop = ").unwrap();
        let store = FileConfigStore::new(&path);
        assert!(matches!(store.load(), Err(Error::TomlDecode(_))));
    }

    #[test]
    fn test_memory_store_clones_share_document() {
        let store = MemoryConfigStore::new(Config::default(), "/tmp");
        let clone = store.clone();

        let mut config = Config::default();
        config.general.offset_source = "local".to_string();
        clone.save(&config).unwrap();

        assert_eq!(store.load().unwrap().general.offset_source, "local");
        assert_eq!(store.save_count(), 1);
    }
}
