//! Configuration module.
//!
//! Precedence chain: defaults → config file → env vars → CLI args.

pub mod keybindings;
pub mod loader;

pub use keybindings::KeyBindings;
pub use loader::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    ConfigError, ConfigFile, ResolvedConfig,
};
