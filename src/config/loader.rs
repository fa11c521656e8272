//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A value parsed but is out of range.
    #[error("Invalid value for {key} in {path}: {reason}")]
    InvalidValue {
        /// File the value came from.
        path: PathBuf,
        /// Offending key.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "BMB_CONFIG";
/// Environment variable overriding `data_path`.
pub const ENV_DATA_PATH: &str = "BMB_DATA_PATH";
/// Environment variable overriding `viewport_width`.
pub const ENV_VIEWPORT_WIDTH: &str = "BMB_VIEWPORT_WIDTH";
/// Environment variable overriding `cache_dir`.
pub const ENV_CACHE_DIR: &str = "BMB_CACHE_DIR";

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/bookmark-browser/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path of the bookmark tree JSON resource.
    #[serde(default)]
    pub data_path: Option<PathBuf>,

    /// Viewport width assumed when no live viewport exists (CLI rendering).
    #[serde(default)]
    pub viewport_width: Option<u32>,

    /// Show jump-to-first/last page buttons.
    #[serde(default)]
    pub show_first_last: Option<bool>,

    /// Show previous/next buttons.
    #[serde(default)]
    pub show_prev_next: Option<bool>,

    /// Let the responsive profile drive page size.
    #[serde(default)]
    pub responsive: Option<bool>,

    /// Read and write the local bookmark cache.
    #[serde(default)]
    pub use_cache: Option<bool>,

    /// Directory backing the key-value cache.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Bookmark tree JSON path.
    pub data_path: PathBuf,
    /// Assumed viewport width in CSS pixels.
    pub viewport_width: u32,
    /// Jump-to-first/last buttons.
    pub show_first_last: bool,
    /// Previous/next buttons.
    pub show_prev_next: bool,
    /// Responsive page sizing.
    pub responsive: bool,
    /// Local cache enabled.
    pub use_cache: bool,
    /// Cache directory.
    pub cache_dir: PathBuf,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("bookmarks.json"),
            viewport_width: 1280,
            show_first_last: true,
            show_prev_next: true,
            responsive: true,
            use_cache: true,
            cache_dir: default_cache_dir(),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/bookmark-browser/bmb.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("bookmark-browser").join("bmb.log")
    } else {
        PathBuf::from("bmb.log")
    }
}

/// Resolve default cache directory.
///
/// Falls back to `.bmb-cache` in the current directory.
pub fn default_cache_dir() -> PathBuf {
    if let Some(cache_dir) = dirs::cache_dir() {
        cache_dir.join("bookmark-browser")
    } else {
        PathBuf::from(".bmb-cache")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    config.validate(&path)?;

    Ok(Some(config))
}

impl ConfigFile {
    /// Reject values that parse but cannot drive a layout.
    fn validate(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if self.viewport_width == Some(0) {
            return Err(ConfigError::InvalidValue {
                path: path.to_path_buf(),
                key: "viewport_width",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.data_path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(ConfigError::InvalidValue {
                path: path.to_path_buf(),
                key: "data_path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Resolve default config file path.
///
/// Returns `~/.config/bookmark-browser/config.toml` on Unix, appropriate path elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bookmark-browser").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `BMB_CONFIG` environment variable
/// 3. Default path `~/.config/bookmark-browser/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Non-blank value of an environment variable.
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Apply environment variable overrides to resolved config.
///
/// Blank values are ignored, as is a width that is not a positive integer.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(path) = env_value(ENV_DATA_PATH) {
        config.data_path = PathBuf::from(path);
    }
    if let Some(width) = env_value(ENV_VIEWPORT_WIDTH) {
        match width.trim().parse::<u32>() {
            Ok(width) if width > 0 => config.viewport_width = width,
            _ => tracing::warn!(value = %width, "Ignoring invalid {ENV_VIEWPORT_WIDTH}"),
        }
    }
    if let Some(dir) = env_value(ENV_CACHE_DIR) {
        config.cache_dir = PathBuf::from(dir);
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        data_path: config.data_path.unwrap_or(defaults.data_path),
        viewport_width: config.viewport_width.unwrap_or(defaults.viewport_width),
        show_first_last: config.show_first_last.unwrap_or(defaults.show_first_last),
        show_prev_next: config.show_prev_next.unwrap_or(defaults.show_prev_next),
        responsive: config.responsive.unwrap_or(defaults.responsive),
        use_cache: config.use_cache.unwrap_or(defaults.use_cache),
        cache_dir: config.cache_dir.unwrap_or(defaults.cache_dir),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence. Only flags explicitly set by the user
/// are passed as `Some`.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    data_path_override: Option<PathBuf>,
    width_override: Option<u32>,
    use_cache_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(path) = data_path_override {
        config.data_path = path;
    }

    if let Some(width) = width_override {
        config.viewport_width = width;
    }

    if let Some(use_cache) = use_cache_override {
        config.use_cache = use_cache;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
