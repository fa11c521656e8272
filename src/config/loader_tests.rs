//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

#[test]
fn default_config_path_names_the_application() {
    let Some(path) = default_config_path() else {
        return;
    };
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("bookmark-browser") && path_str.ends_with("config.toml"),
        "Path should contain 'bookmark-browser' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(result, Ok(None), "Missing config file is not an error");
}

#[test]
fn load_config_file_parses_valid_toml() {
    let config_path = env::temp_dir().join("bmb_test_config_valid.toml");

    let toml_content = r#"
data_path = "/srv/bookmarks.json"
viewport_width = 800
show_first_last = false
responsive = false
"#;
    fs::write(&config_path, toml_content).expect("Failed to write test config");

    let config = load_config_file(&config_path)
        .expect("valid TOML should parse")
        .expect("file exists");

    assert_eq!(config.data_path, Some(PathBuf::from("/srv/bookmarks.json")));
    assert_eq!(config.viewport_width, Some(800));
    assert_eq!(config.show_first_last, Some(false));
    assert_eq!(config.responsive, Some(false));
    assert_eq!(config.show_prev_next, None);

    let _ = fs::remove_file(&config_path);
}

#[test]
fn load_config_file_rejects_unknown_keys() {
    let config_path = env::temp_dir().join("bmb_test_config_unknown.toml");
    fs::write(&config_path, "theme = \"dark\"\n").expect("Failed to write test config");

    let result = load_config_file(&config_path);
    assert!(
        matches!(result, Err(ConfigError::ParseError { .. })),
        "Unknown keys should be rejected, got {:?}",
        result
    );

    let _ = fs::remove_file(&config_path);
}

#[test]
fn load_config_file_reports_invalid_toml() {
    let config_path = env::temp_dir().join("bmb_test_config_invalid.toml");
    fs::write(&config_path, "viewport_width = = 3").expect("Failed to write test config");

    let result = load_config_file(&config_path);
    match result {
        Err(ConfigError::ParseError { path, .. }) => assert_eq!(path, config_path),
        other => panic!("Expected ParseError, got {:?}", other),
    }

    let _ = fs::remove_file(&config_path);
}

#[test]
fn load_config_file_rejects_zero_width() {
    let config_path = env::temp_dir().join("bmb_test_config_zero_width.toml");
    fs::write(&config_path, "viewport_width = 0\n").expect("Failed to write test config");

    let result = load_config_file(&config_path);
    assert!(
        matches!(result, Err(ConfigError::InvalidValue { key: "viewport_width", .. })),
        "got {:?}",
        result
    );

    let _ = fs::remove_file(&config_path);
}

#[test]
fn merge_config_without_file_returns_defaults() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_prefers_file_values() {
    let file = ConfigFile {
        viewport_width: Some(375),
        use_cache: Some(false),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(file));
    assert_eq!(resolved.viewport_width, 375);
    assert!(!resolved.use_cache);
    assert_eq!(resolved.data_path, ResolvedConfig::default().data_path);
}

#[test]
#[serial(bmb_env)]
fn env_override_replaces_data_path() {
    env::set_var("BMB_DATA_PATH", "/tmp/other.json");
    let config = apply_env_overrides(ResolvedConfig::default());
    env::remove_var("BMB_DATA_PATH");

    assert_eq!(config.data_path, PathBuf::from("/tmp/other.json"));
}

#[test]
#[serial(bmb_env)]
fn blank_env_override_is_ignored() {
    env::set_var("BMB_DATA_PATH", "  ");
    let config = apply_env_overrides(ResolvedConfig::default());
    env::remove_var("BMB_DATA_PATH");

    assert_eq!(config.data_path, ResolvedConfig::default().data_path);
}

#[test]
#[serial(bmb_env)]
fn env_overrides_width_and_cache_dir() {
    env::set_var(ENV_VIEWPORT_WIDTH, "375");
    env::set_var(ENV_CACHE_DIR, "/tmp/bmb-cache");
    let config = apply_env_overrides(ResolvedConfig::default());
    env::remove_var(ENV_VIEWPORT_WIDTH);
    env::remove_var(ENV_CACHE_DIR);

    assert_eq!(config.viewport_width, 375);
    assert_eq!(config.cache_dir, PathBuf::from("/tmp/bmb-cache"));
}

#[test]
#[serial(bmb_env)]
fn unparseable_width_env_is_ignored() {
    for value in ["wide", "0", "-5"] {
        env::set_var(ENV_VIEWPORT_WIDTH, value);
        let config = apply_env_overrides(ResolvedConfig::default());
        env::remove_var(ENV_VIEWPORT_WIDTH);
        assert_eq!(config.viewport_width, 1280, "value {value:?}");
    }
}

#[test]
#[serial(bmb_env)]
fn bmb_config_env_var_selects_config_file() {
    let config_path = env::temp_dir().join("bmb_test_config_env.toml");
    fs::write(&config_path, "viewport_width = 1024\n").expect("Failed to write test config");

    env::set_var("BMB_CONFIG", &config_path);
    let loaded = load_config_with_precedence(None);
    env::remove_var("BMB_CONFIG");

    let config = loaded.expect("should load").expect("file exists");
    assert_eq!(config.viewport_width, Some(1024));

    let _ = fs::remove_file(&config_path);
}

#[test]
#[serial(bmb_env)]
fn explicit_path_wins_over_env_var() {
    env::set_var("BMB_CONFIG", "/nonexistent/env.toml");
    let loaded = load_config_with_precedence(Some(PathBuf::from("/nonexistent/cli.toml")));
    env::remove_var("BMB_CONFIG");

    assert_eq!(loaded, Ok(None));
}

#[test]
fn cli_overrides_only_apply_when_set() {
    let base = ResolvedConfig::default();

    let untouched = apply_cli_overrides(base.clone(), None, None, None);
    assert_eq!(untouched, base);

    let overridden = apply_cli_overrides(base, Some(PathBuf::from("x.json")), Some(400), Some(false));
    assert_eq!(overridden.data_path, PathBuf::from("x.json"));
    assert_eq!(overridden.viewport_width, 400);
    assert!(!overridden.use_cache);
}

#[test]
fn default_log_path_ends_with_bmb_log() {
    let path = default_log_path();
    assert!(
        path.to_string_lossy().ends_with("bmb.log"),
        "Default log path should end with 'bmb.log', got: {:?}",
        path
    );
}
