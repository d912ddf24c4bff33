//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

/// RAII guard to ensure environment variable cleanup even under test parallelism.
/// Removes the var on drop, preventing test pollution in parallel execution.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(name);
    fs::write(&path, contents).expect("Failed to write test config");
    path
}

// ===== Paths =====

#[test]
fn default_config_path_ends_with_reelfeed_config_toml() {
    let path = default_config_path().expect("Should have default path");
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("reelfeed") && path_str.ends_with("config.toml"),
        "got: {path_str}"
    );
}

#[test]
fn default_log_path_ends_with_reelfeed_log() {
    let path = default_log_path();
    assert!(path.to_string_lossy().ends_with("reelfeed.log"), "got: {path:?}");
}

// ===== load_config_file =====

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(result, Ok(None));
}

#[test]
fn load_config_file_parses_valid_toml() {
    let path = write_temp(
        "reelfeed_test_valid.toml",
        r#"
gesture_window_ms = 250
visibility_threshold = 0.75
poll_interval_secs = 5
capture_clip = "/tmp/clip.webm"
"#,
    );

    let config = load_config_file(&path)
        .expect("Should parse valid TOML")
        .expect("File exists");
    assert_eq!(config.gesture_window_ms, Some(250));
    assert_eq!(config.visibility_threshold, Some(0.75));
    assert_eq!(config.poll_interval_secs, Some(5));
    assert_eq!(config.capture_clip, Some(PathBuf::from("/tmp/clip.webm")));
    assert_eq!(config.heart_burst_ms, None);

    fs::remove_file(path).ok();
}

#[test]
fn load_config_file_rejects_unknown_fields() {
    let path = write_temp("reelfeed_test_unknown.toml", "theme = \"dark\"\n");
    let result = load_config_file(&path);
    assert!(
        matches!(result, Err(ConfigError::ParseError { .. })),
        "got: {result:?}"
    );
    fs::remove_file(path).ok();
}

#[test]
fn load_config_file_rejects_api_key_in_file() {
    let path = write_temp("reelfeed_test_key.toml", "api_key = \"sk\"\n");
    assert!(load_config_file(&path).is_err());
    fs::remove_file(path).ok();
}

#[test]
fn load_config_file_reports_invalid_toml() {
    let path = write_temp("reelfeed_test_invalid.toml", "gesture_window_ms = [");
    let result = load_config_file(&path);
    match result {
        Err(ConfigError::ParseError { path: p, .. }) => assert_eq!(p, path),
        other => panic!("Expected ParseError, got {other:?}"),
    }
    fs::remove_file(path).ok();
}

// ===== merge_config =====

#[test]
fn merge_config_with_none_returns_defaults() {
    let resolved = merge_config(None).unwrap();
    assert_eq!(resolved, ResolvedConfig::default());
    assert_eq!(resolved.gesture_window, Duration::from_millis(300));
    assert_eq!(resolved.heart_burst, Duration::from_millis(1000));
    assert_eq!(resolved.controls_hide, Duration::from_millis(3000));
    assert_eq!(resolved.visibility_threshold, 0.6);
    assert_eq!(resolved.poll_interval, Duration::from_secs(10));
    assert_eq!(resolved.poll_timeout, Duration::from_secs(600));
    assert_eq!(resolved.api_key, None);
}

#[test]
fn merge_config_overrides_only_set_fields() {
    let file = ConfigFile {
        heart_burst_ms: Some(800),
        poll_timeout_secs: Some(60),
        api_base_url: Some("http://localhost:9000".to_string()),
        ..ConfigFile::default()
    };
    let resolved = merge_config(Some(file)).unwrap();
    let defaults = ResolvedConfig::default();

    assert_eq!(resolved.heart_burst, Duration::from_millis(800));
    assert_eq!(resolved.poll_timeout, Duration::from_secs(60));
    assert_eq!(resolved.api_base_url, "http://localhost:9000");
    assert_eq!(resolved.gesture_window, defaults.gesture_window);
    assert_eq!(resolved.poll_interval, defaults.poll_interval);
    assert_eq!(resolved.log_file_path, defaults.log_file_path);
}

#[test]
fn merge_config_rejects_out_of_range_threshold() {
    for bad in [0.0, -0.5, 1.5, f32::NAN] {
        let file = ConfigFile {
            visibility_threshold: Some(bad),
            ..ConfigFile::default()
        };
        assert!(
            matches!(
                merge_config(Some(file)),
                Err(ConfigError::InvalidValue {
                    field: "visibility_threshold",
                    ..
                })
            ),
            "threshold {bad} should be rejected"
        );
    }
}

#[test]
fn merge_config_rejects_zero_windows() {
    let file = ConfigFile {
        gesture_window_ms: Some(0),
        ..ConfigFile::default()
    };
    assert!(merge_config(Some(file)).is_err());

    let file = ConfigFile {
        poll_interval_secs: Some(0),
        ..ConfigFile::default()
    };
    assert!(merge_config(Some(file)).is_err());
}

#[test]
fn merge_config_ignores_non_positive_preview_duration() {
    let file = ConfigFile {
        preview_duration_secs: Some(-3.0),
        ..ConfigFile::default()
    };
    assert_eq!(merge_config(Some(file)).unwrap().preview_duration_secs, 15.0);
}

#[test]
fn resolved_config_feeds_card_config_and_poll_policy() {
    let file = ConfigFile {
        gesture_window_ms: Some(200),
        poll_interval_secs: Some(2),
        ..ConfigFile::default()
    };
    let resolved = merge_config(Some(file)).unwrap();
    assert_eq!(resolved.card_config().gesture_window, Duration::from_millis(200));
    assert_eq!(resolved.poll_policy().interval, Duration::from_secs(2));
    assert_eq!(resolved.poll_policy().timeout, Duration::from_secs(600));
}

// ===== Env overrides =====

#[test]
#[serial(reelfeed_env)]
fn env_api_key_prefers_reelfeed_over_gemini() {
    let _a = EnvGuard::new("REELFEED_API_KEY");
    let _b = EnvGuard::new("GEMINI_API_KEY");

    env::set_var("GEMINI_API_KEY", "from-gemini");
    let resolved = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(resolved.api_key.as_deref(), Some("from-gemini"));

    env::set_var("REELFEED_API_KEY", "from-reelfeed");
    let resolved = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(resolved.api_key.as_deref(), Some("from-reelfeed"));
}

#[test]
#[serial(reelfeed_env)]
fn env_blank_values_are_ignored() {
    let _a = EnvGuard::new("REELFEED_API_KEY");
    let _b = EnvGuard::new("GEMINI_API_KEY");
    let _c = EnvGuard::new("REELFEED_CAPTURE_CLIP");

    env::set_var("REELFEED_API_KEY", "   ");
    env::set_var("REELFEED_CAPTURE_CLIP", "");
    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(reelfeed_env)]
fn env_capture_clip_overrides_file() {
    let _c = EnvGuard::new("REELFEED_CAPTURE_CLIP");
    env::set_var("REELFEED_CAPTURE_CLIP", "/clips/env.webm");
    let base = ResolvedConfig {
        capture_clip: Some(PathBuf::from("/clips/file.webm")),
        ..ResolvedConfig::default()
    };
    let resolved = apply_env_overrides(base);
    assert_eq!(resolved.capture_clip, Some(PathBuf::from("/clips/env.webm")));
}

// ===== Precedence =====

#[test]
#[serial(reelfeed_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new("REELFEED_CONFIG");

    let explicit = write_temp("reelfeed_explicit.toml", "heart_burst_ms = 111\n");
    let env_path = write_temp("reelfeed_env.toml", "heart_burst_ms = 222\n");
    env::set_var("REELFEED_CONFIG", &env_path);

    let config = load_config_with_precedence(Some(explicit.clone()))
        .unwrap()
        .unwrap();
    assert_eq!(config.heart_burst_ms, Some(111));

    fs::remove_file(explicit).ok();
    fs::remove_file(env_path).ok();
}

#[test]
#[serial(reelfeed_config)]
fn load_config_with_precedence_uses_env_path() {
    let _guard = EnvGuard::new("REELFEED_CONFIG");

    let env_path = write_temp("reelfeed_env_only.toml", "heart_burst_ms = 222\n");
    env::set_var("REELFEED_CONFIG", &env_path);

    let config = load_config_with_precedence(None).unwrap().unwrap();
    assert_eq!(config.heart_burst_ms, Some(222));

    fs::remove_file(env_path).ok();
}

#[test]
#[serial(reelfeed_config)]
fn load_config_with_precedence_missing_env_file_is_not_error() {
    let _guard = EnvGuard::new("REELFEED_CONFIG");
    env::set_var("REELFEED_CONFIG", "/nonexistent/reelfeed.toml");
    assert_eq!(load_config_with_precedence(None), Ok(None));
}

// ===== CLI overrides =====

#[test]
fn cli_overrides_win_over_everything() {
    let base = ResolvedConfig {
        api_key: Some("env-key".to_string()),
        capture_clip: Some(PathBuf::from("/env.webm")),
        ..ResolvedConfig::default()
    };
    let resolved = apply_cli_overrides(
        base,
        Some("cli-key".to_string()),
        Some(PathBuf::from("/cli.webm")),
        Some(NavTab::Profile),
    );
    assert_eq!(resolved.api_key.as_deref(), Some("cli-key"));
    assert_eq!(resolved.capture_clip, Some(PathBuf::from("/cli.webm")));
    assert_eq!(resolved.start_tab, NavTab::Profile);
}

#[test]
fn cli_overrides_absent_flags_keep_base() {
    let base = ResolvedConfig {
        api_key: Some("env-key".to_string()),
        ..ResolvedConfig::default()
    };
    let resolved = apply_cli_overrides(base.clone(), Some(" ".to_string()), None, None);
    assert_eq!(resolved, base);
}
