//! Configuration system for the Reprise server.
//!
//! Provides TOML-based configuration with:
//! - `[server]`, `[session]` and `[stash]` sections, all optional
//! - Config file layering (user config dir + project-local overrides)
//! - Non-fatal loading: a broken layer becomes a warning, not an error

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    save_config, xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
