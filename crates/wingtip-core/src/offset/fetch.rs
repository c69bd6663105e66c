//! Offset fetch orchestration.
//!
//! Two strategies produce a validated document triple:
//!
//! - [`LocalStrategy`] reads three files named by the config
//! - [`RemoteStrategy`] resolves a source id against the registry and
//!   downloads the documents
//!
//! [`FallbackPolicy`] decides whether a failed strategy hands over to
//! another one. The only hop it allows is local → remote, once; remote
//! failures end the cycle.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use super::resolve::{ResolvedOffsets, extract};
use super::source::{DocumentFetcher, LocalFiles, OffsetSource, SourceRegistry, UrlOverrides};
use crate::config::{Config, ConfigStore, DEFAULT_SOURCE_ID, LOCAL_SOURCE_ID};
use crate::error::Error;

/// The three raw documents of one dump
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetDocuments {
    pub offsets: Value,
    pub client_dll: Value,
    pub buttons: Value,
}

/// Documents that passed resolution, with the resolved map
#[derive(Debug, Clone)]
pub struct FetchedOffsets {
    pub source_id: String,
    pub documents: OffsetDocuments,
    pub resolved: ResolvedOffsets,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to load config: {0}")]
    Config(#[source] Error),

    #[error("Failed to persist config: {0}")]
    Persist(#[source] Error),

    #[error("Local offset files missing: {}", .0.join(", "))]
    MissingFiles(Vec<String>),

    #[error("Failed to load local offset files: {0}")]
    LocalRead(#[source] Error),

    #[error("Offset files from {0} invalid: Missing required offsets")]
    Unresolvable(String),

    #[error("Failed to fetch offsets from {source_name}: {error}")]
    Remote { source_name: String, error: Error },

    #[error("No valid offset sources available")]
    NoSources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Local,
    Remote,
}

impl SourceKind {
    pub fn of(config: &Config) -> Self {
        if config.general.uses_local_source() {
            Self::Local
        } else {
            Self::Remote
        }
    }
}

/// Bounds how many times a failed fetch is redirected to another strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    max_hops: u32,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::single_hop()
    }
}

impl FallbackPolicy {
    pub const fn single_hop() -> Self {
        Self { max_hops: 1 }
    }

    pub const fn no_fallback() -> Self {
        Self { max_hops: 0 }
    }

    /// Strategy to try after `failed`, given `hops` redirects already taken
    pub fn next(&self, failed: SourceKind, hops: u32) -> Option<SourceKind> {
        if hops >= self.max_hops {
            return None;
        }
        match failed {
            SourceKind::Local => Some(SourceKind::Remote),
            SourceKind::Remote => None,
        }
    }
}

/// Reads the three local files and validates them
#[derive(Debug, Clone)]
pub struct LocalStrategy {
    default_dir: PathBuf,
}

impl LocalStrategy {
    pub fn new<P: Into<PathBuf>>(default_dir: P) -> Self {
        Self {
            default_dir: default_dir.into(),
        }
    }

    pub fn fetch(&self, config: &Config) -> Result<FetchedOffsets, FetchError> {
        let files = LocalFiles::from_config(&config.general, &self.default_dir);

        let missing = files.missing();
        if !missing.is_empty() {
            return Err(FetchError::MissingFiles(missing));
        }

        let documents = OffsetDocuments {
            offsets: read_json(&files.offsets)?,
            client_dll: read_json(&files.client_dll)?,
            buttons: read_json(&files.buttons)?,
        };

        let resolved = extract(&documents.offsets, &documents.client_dll, &documents.buttons)
            .ok_or_else(|| FetchError::Unresolvable("local files".to_string()))?;

        info!(source = LOCAL_SOURCE_ID, "Loaded and validated local offsets.");
        Ok(FetchedOffsets {
            source_id: LOCAL_SOURCE_ID.to_string(),
            documents,
            resolved,
        })
    }
}

fn read_json(path: &Path) -> Result<Value, FetchError> {
    let bytes = fs::read(path).map_err(|e| FetchError::LocalRead(e.into()))?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::LocalRead(e.into()))
}

/// Downloads and validates the documents of a registry source
pub struct RemoteStrategy<F> {
    fetcher: F,
    registry: SourceRegistry,
    overrides: UrlOverrides,
}

impl<F: DocumentFetcher> RemoteStrategy<F> {
    pub fn new(fetcher: F, registry: SourceRegistry, overrides: UrlOverrides) -> Self {
        Self {
            fetcher,
            registry,
            overrides,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Fetch from the configured source.
    ///
    /// An unknown source id is replaced by the default one and persisted
    /// before fetching.
    pub fn fetch<S: ConfigStore>(
        &self,
        config: &mut Config,
        store: &S,
    ) -> Result<FetchedOffsets, FetchError> {
        let mut sources = self.registry.list_sources(&self.fetcher);

        let mut id = config.general.offset_source.clone();
        if !sources.contains_key(&id) {
            error!(
                source = %id,
                "Unknown offset source '{}'. Falling back to {}.",
                id, DEFAULT_SOURCE_ID
            );
            id = DEFAULT_SOURCE_ID.to_string();
            config.general.offset_source = id.clone();
            store.save(config).map_err(FetchError::Persist)?;
        }

        let source = sources.remove(&id).ok_or(FetchError::NoSources)?;

        debug!(
            source = %id,
            author = %source.author,
            repository = %source.repository,
            "Fetching offsets from {}...",
            source.name
        );

        let [offsets, client_dll, buttons] = self.overrides.urls_for(&source).map(|(document, url)| {
            self.fetcher
                .fetch_json(document, url)
                .map_err(|error| FetchError::Remote {
                    source_name: source.name.clone(),
                    error,
                })
        });

        let documents = OffsetDocuments {
            offsets: offsets?,
            client_dll: client_dll?,
            buttons: buttons?,
        };

        let resolved = extract(&documents.offsets, &documents.client_dll, &documents.buttons)
            .ok_or_else(|| FetchError::Unresolvable(source.name.clone()))?;

        info!(
            source = %id,
            "Successfully loaded and validated offsets from {}.",
            source.name
        );
        Ok(FetchedOffsets {
            source_id: id,
            documents,
            resolved,
        })
    }
}

/// Picks a strategy from the config and applies the fallback policy
pub struct OffsetFetcher<S, F> {
    store: S,
    local: LocalStrategy,
    remote: RemoteStrategy<F>,
    policy: FallbackPolicy,
}

impl<S: ConfigStore, F: DocumentFetcher> OffsetFetcher<S, F> {
    pub fn new(store: S, fetcher: F) -> Self {
        let local = LocalStrategy::new(store.config_dir());
        Self {
            store,
            local,
            remote: RemoteStrategy::new(fetcher, SourceRegistry::default(), UrlOverrides::from_env()),
            policy: FallbackPolicy::default(),
        }
    }

    pub fn with_registry(mut self, registry: SourceRegistry) -> Self {
        self.remote.registry = registry;
        self
    }

    pub fn with_overrides(mut self, overrides: UrlOverrides) -> Self {
        self.remote.overrides = overrides;
        self
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn remote(&self) -> &RemoteStrategy<F> {
        &self.remote
    }

    /// The source the next cycle starts from, without fetching its documents.
    ///
    /// An unknown remote id reports the default source it would be replaced by.
    pub fn configured_source(&self) -> Result<OffsetSource, FetchError> {
        let config = self.store.load().map_err(FetchError::Config)?;
        match SourceKind::of(&config) {
            SourceKind::Local => Ok(OffsetSource::Local(LocalFiles::from_config(
                &config.general,
                &self.local.default_dir,
            ))),
            SourceKind::Remote => {
                let mut sources = self.remote.registry.list_sources(&self.remote.fetcher);
                sources
                    .remove(&config.general.offset_source)
                    .or_else(|| sources.remove(DEFAULT_SOURCE_ID))
                    .map(OffsetSource::Remote)
                    .ok_or(FetchError::NoSources)
            }
        }
    }

    /// Run one fetch cycle. Failures are logged and yield `None`.
    pub fn fetch_offsets(&self) -> Option<FetchedOffsets> {
        match self.try_fetch_offsets() {
            Ok(fetched) => Some(fetched),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    pub fn try_fetch_offsets(&self) -> Result<FetchedOffsets, FetchError> {
        let mut config = self.store.load().map_err(FetchError::Config)?;
        let mut kind = SourceKind::of(&config);
        let mut hops = 0;

        loop {
            let attempt = match kind {
                SourceKind::Local => self.local.fetch(&config),
                SourceKind::Remote => self.remote.fetch(&mut config, &self.store),
            };

            let failure = match attempt {
                Ok(fetched) => return Ok(fetched),
                Err(e) => e,
            };

            let Some(next) = self.policy.next(kind, hops) else {
                return Err(failure);
            };

            error!(
                failed = ?kind,
                source = DEFAULT_SOURCE_ID,
                "{}. Falling back to {}.",
                failure,
                DEFAULT_SOURCE_ID
            );
            config.general.offset_source = DEFAULT_SOURCE_ID.to_string();
            self.store.save(&config).map_err(FetchError::Persist)?;

            hops += 1;
            kind = next;
        }
    }
}
