//! Shared types, error model, and configuration for codecache.
//!
//! This crate is the foundation depended on by all other codecache crates.
//! It provides:
//! - [`CodeCacheError`]: the unified error type
//! - Domain types ([`FileRecord`], [`Language`], [`ComponentType`], [`Namespace`],
//!   [`ContextArtifact`])
//! - Configuration ([`AppConfig`], [`CacheConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CacheConfig, CacheSection, GitHubConfig, GraphConfig, LoggingConfig, ProjectConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from, resolve_path,
};
pub use error::{CodeCacheError, Result};
pub use types::{ComponentType, ContextArtifact, FileRecord, Language, Namespace};
