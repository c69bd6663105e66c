//! Offset sources: where the three documents for a dump live.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::{
    BUTTONS_FILE_NAME, CLIENT_DLL_FILE_NAME, GeneralConfig, LOCAL_SOURCE_ID, OFFSETS_FILE_NAME,
};
use crate::error::Result;

/// Registry document listing the published dumps
pub const REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/Jesewe/VioletWing/refs/heads/main/src/offsets.json";

/// Document names, used to attribute fetch failures
pub const OFFSETS_DOCUMENT: &str = "offsets.json";
pub const CLIENT_DLL_DOCUMENT: &str = "client_dll.json";
pub const BUTTONS_DOCUMENT: &str = "buttons.json";

/// Retrieves one JSON document.
///
/// Implementations must bound every request with a timeout and report a
/// non-2xx status as [`crate::Error::HttpStatus`] naming `document`.
pub trait DocumentFetcher: Send + Sync {
    fn fetch_json(&self, document: &str, url: &str) -> Result<Value>;
}

impl<T: DocumentFetcher + ?Sized> DocumentFetcher for &T {
    fn fetch_json(&self, document: &str, url: &str) -> Result<Value> {
        (**self).fetch_json(document, url)
    }
}

/// A published dump reachable over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSource {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub author: String,
    pub repository: String,
    pub offsets_url: String,
    pub client_dll_url: String,
    pub buttons_url: String,
}

/// Three files on disk standing in for a remote dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFiles {
    pub offsets: PathBuf,
    pub client_dll: PathBuf,
    pub buttons: PathBuf,
}

impl LocalFiles {
    /// Paths from config, defaulting to well-known names in `default_dir`
    pub fn from_config(general: &GeneralConfig, default_dir: &std::path::Path) -> Self {
        Self {
            offsets: general
                .offsets_file
                .clone()
                .unwrap_or_else(|| default_dir.join(OFFSETS_FILE_NAME)),
            client_dll: general
                .client_dll_file
                .clone()
                .unwrap_or_else(|| default_dir.join(CLIENT_DLL_FILE_NAME)),
            buttons: general
                .buttons_file
                .clone()
                .unwrap_or_else(|| default_dir.join(BUTTONS_FILE_NAME)),
        }
    }

    pub fn paths(&self) -> [&PathBuf; 3] {
        [&self.offsets, &self.client_dll, &self.buttons]
    }

    /// File names of the paths that do not exist
    pub fn missing(&self) -> Vec<String> {
        self.paths()
            .into_iter()
            .filter(|path| !path.exists())
            .map(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffsetSource {
    Remote(RemoteSource),
    Local(LocalFiles),
}

impl OffsetSource {
    pub fn id(&self) -> &str {
        match self {
            Self::Remote(source) => &source.id,
            Self::Local(_) => LOCAL_SOURCE_ID,
        }
    }
}

/// Entry shown in a source picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    pub id: String,
    pub name: String,
    pub author: String,
    pub display: String,
}

const REQUIRED_SOURCE_KEYS: [&str; 6] = [
    "name",
    "author",
    "repository",
    "offsets_url",
    "client_dll_url",
    "buttons_url",
];

/// Built-in sources used when the registry cannot be fetched
pub fn builtin_sources() -> BTreeMap<String, RemoteSource> {
    [("a2x", "A2X Source", "a2x"), ("jesewe", "Jesewe Source", "Jesewe")]
        .into_iter()
        .map(|(id, name, author)| {
            let base = format!(
                "https://raw.githubusercontent.com/{}/cs2-dumper/main/output",
                author
            );
            let source = RemoteSource {
                id: id.to_string(),
                name: name.to_string(),
                author: author.to_string(),
                repository: format!("{}/cs2-dumper", author),
                offsets_url: format!("{}/offsets.json", base),
                client_dll_url: format!("{}/client_dll.json", base),
                buttons_url: format!("{}/buttons.json", base),
            };
            (id.to_string(), source)
        })
        .collect()
}

/// Parse a registry document, skipping entries with missing keys.
///
/// Returns `None` if the document is not an object or contains no usable entry.
pub fn parse_registry(document: &Value) -> Option<BTreeMap<String, RemoteSource>> {
    let entries = document.as_object()?;
    let mut sources = BTreeMap::new();

    for (id, entry) in entries {
        let missing: Vec<&str> = REQUIRED_SOURCE_KEYS
            .iter()
            .copied()
            .filter(|key| entry.get(*key).and_then(Value::as_str).is_none())
            .collect();
        if !missing.is_empty() {
            error!(source = %id, ?missing, "Source '{}' missing keys", id);
            continue;
        }

        match RemoteSource::deserialize(entry) {
            Ok(mut source) => {
                source.id = id.clone();
                sources.insert(id.clone(), source);
            }
            Err(e) => error!("Source '{}' is malformed: {}", id, e),
        }
    }

    if sources.is_empty() {
        None
    } else {
        Some(sources)
    }
}

/// Lists offset sources, re-fetching the registry on every call.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    url: String,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new(REGISTRY_URL)
    }
}

impl SourceRegistry {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn list_sources<F: DocumentFetcher>(&self, fetcher: &F) -> BTreeMap<String, RemoteSource> {
        let document = match fetcher.fetch_json("registry", &self.url) {
            Ok(document) => document,
            Err(e) => {
                warn!(
                    registry = %self.url,
                    error = %e,
                    "Failed to load remote offsets sources, using default sources"
                );
                return builtin_sources();
            }
        };

        match parse_registry(&document) {
            Some(sources) => {
                debug!("Loaded {} offsets sources from remote registry", sources.len());
                sources
            }
            None => {
                warn!("Remote offsets registry has no usable sources, using default sources");
                builtin_sources()
            }
        }
    }

    /// Sources for a picker, with the local entry appended last
    pub fn list_sources_for_display<F: DocumentFetcher>(&self, fetcher: &F) -> Vec<SourceEntry> {
        let mut entries: Vec<SourceEntry> = self
            .list_sources(fetcher)
            .into_values()
            .map(|source| SourceEntry {
                display: format!("{} ({})", source.name, source.author),
                id: source.id,
                name: source.name,
                author: source.author,
            })
            .collect();

        entries.push(SourceEntry {
            id: LOCAL_SOURCE_ID.to_string(),
            name: "Local Files".to_string(),
            author: "User".to_string(),
            display: "Local Files".to_string(),
        });

        entries
    }
}

/// Environment overrides for the three document URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlOverrides {
    pub offsets_url: Option<String>,
    pub client_dll_url: Option<String>,
    pub buttons_url: Option<String>,
}

impl UrlOverrides {
    pub const OFFSETS_ENV: &'static str = "OFFSETS_URL";
    pub const CLIENT_DLL_ENV: &'static str = "CLIENT_DLL_URL";
    pub const BUTTONS_ENV: &'static str = "BUTTONS_URL";

    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            offsets_url: var(Self::OFFSETS_ENV),
            client_dll_url: var(Self::CLIENT_DLL_ENV),
            buttons_url: var(Self::BUTTONS_ENV),
        }
    }

    /// `(offsets, client_dll, buttons)` URLs, overrides taking precedence
    pub fn urls_for<'a>(&'a self, source: &'a RemoteSource) -> [(&'static str, &'a str); 3] {
        [
            (
                OFFSETS_DOCUMENT,
                self.offsets_url.as_deref().unwrap_or(&source.offsets_url),
            ),
            (
                CLIENT_DLL_DOCUMENT,
                self.client_dll_url
                    .as_deref()
                    .unwrap_or(&source.client_dll_url),
            ),
            (
                BUTTONS_DOCUMENT,
                self.buttons_url.as_deref().unwrap_or(&source.buttons_url),
            ),
        ]
    }
}
