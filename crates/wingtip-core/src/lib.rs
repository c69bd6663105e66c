//! # wingtip-core
//!
//! Core library for wingtip.
//!
//! This crate provides:
//! - Offset source registry and document fetching with local → remote fallback
//! - Class layout walking to resolve named field offsets
//! - A shared, atomically published resolved offset map
//! - Feature automation loops driven by input state and timing
//!
//! Process memory access, input queries and window focus are consumed
//! through the [`ProcessMemory`], [`InputState`] and [`WindowFocus`] traits.
//!
//! ## Feature Flags
//!
//! - `http` (default): blocking HTTP fetcher for remote offset sources.

pub mod config;
pub mod error;
pub mod feature;
pub mod input;
pub mod memory;
pub mod offset;

pub use config::{
    BunnyhopConfig, Config, ConfigHandle, ConfigStore, DEFAULT_SOURCE_ID, FileConfigStore,
    GeneralConfig, LOCAL_SOURCE_ID, MemoryConfigStore, default_config_path,
};
pub use error::{Error, Result};
pub use feature::{
    Bunnyhop, BunnyhopSettings, CancellationToken, FORCE_JUMP_ACTIVE, FORCE_JUMP_INACTIVE,
    Feature, FeatureRunner, FeatureRuntimeState, FeatureStatus,
};
pub use input::{
    FixedFocus, GAME_WINDOW_TITLE, InputState, VirtualKey, WindowFocus, title_matches,
};
#[cfg(target_os = "windows")]
pub use input::{AsyncKeyboard, ForegroundWindow};
pub use memory::{CLIENT_MODULE, DryRunMemory, ProcessMemory};
#[cfg(feature = "http")]
pub use offset::HttpFetcher;
pub use offset::{
    ClassLayout, DocumentFetcher, FallbackPolicy, FetchError, FetchedOffsets, FieldLookup,
    LocalFiles, OffsetDocuments, OffsetFetcher, OffsetRefresher, OffsetSource, REQUIRED_KEYS,
    RemoteSource, ResolveError, ResolvedOffsets, SharedOffsets, SourceEntry, SourceRegistry,
    UrlOverrides, builtin_sources, class_layout, extract, try_extract,
};
