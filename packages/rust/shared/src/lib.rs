//! Shared types, error model, and configuration for machine-sync.
//!
//! This crate is the foundation depended on by all other machine-sync crates.
//! It provides:
//! - [`SyncError`]: the unified error type
//! - Domain types ([`MachineRecord`], [`Matrix`], [`RepoEntry`])
//! - Configuration ([`SyncConfig`], config loading) and token resolution

pub mod config;
pub mod credentials;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{CONFIG_FILE_NAME, SyncConfig, load_config, load_config_from};
pub use credentials::{GitHubToken, resolve_token, resolve_token_with, token_from_env_file};
pub use error::{Result, SyncError};
pub use types::{
    EntryType, KNOWN_DIFFICULTIES, KNOWN_OS, MachineRecord, Matrix, RepoEntry,
};
