//! Shared types, error model, and configuration for MeepleVault.
//!
//! This crate is the foundation depended on by all other MeepleVault crates.
//! It provides:
//! - [`MeepleVaultError`] — the unified error type
//! - Domain types ([`Game`], [`GameDetails`], the [`GameLookup`] capability)
//! - Configuration ([`AppConfig`], [`FillConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, FillConfig, PathsConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{MeepleVaultError, Result};
pub use types::{Game, GameDetails, GameLookup};
