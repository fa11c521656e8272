//! Configuration module.
//!
//! - `constants`: static layout, timing and breakpoint tables
//! - `loader`: TOML config file with defaults → file → env → CLI precedence

pub mod constants;
pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_cache_dir, default_config_path,
    default_log_path, load_config_file, load_config_with_precedence, merge_config, ConfigError,
    ConfigFile, ResolvedConfig, ENV_CACHE_DIR, ENV_CONFIG, ENV_DATA_PATH, ENV_VIEWPORT_WIDTH,
};
