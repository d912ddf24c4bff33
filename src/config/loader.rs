//! Configuration file loading with precedence handling.

use crate::service::poll::{PollPolicy, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
use crate::service::gemini::DEFAULT_API_BASE_URL;
use crate::state::app_state::NavTab;
use crate::state::feed_card::CardConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
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

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A value parsed but is outside its allowed range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Config key that failed validation.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/reelfeed/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Double-tap pairing window in milliseconds.
    #[serde(default)]
    pub gesture_window_ms: Option<u64>,

    /// Heart burst lifetime in milliseconds.
    #[serde(default)]
    pub heart_burst_ms: Option<u64>,

    /// Transport controls auto-hide delay in milliseconds.
    #[serde(default)]
    pub controls_hide_ms: Option<u64>,

    /// Visible fraction at which a card starts playing.
    #[serde(default)]
    pub visibility_threshold: Option<f32>,

    /// Seconds between video status checks.
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,

    /// Give up on a video job after this many seconds.
    #[serde(default)]
    pub poll_timeout_secs: Option<u64>,

    /// Length of the simulated preview clip for remote items.
    #[serde(default)]
    pub preview_duration_secs: Option<f64>,

    /// Clip file used as the capture device.
    #[serde(default)]
    pub capture_clip: Option<PathBuf>,

    /// Generation service base URL.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Maximum gap between taps of a double-tap.
    pub gesture_window: Duration,
    /// Lifetime of a heart burst.
    pub heart_burst: Duration,
    /// Inactivity delay before transport controls hide.
    pub controls_hide: Duration,
    /// Visible fraction at which a card resumes playback.
    pub visibility_threshold: f32,
    /// Wait between video status checks.
    pub poll_interval: Duration,
    /// Longest total wait for a video job.
    pub poll_timeout: Duration,
    /// Loop length of the terminal preview player.
    pub preview_duration_secs: f64,
    /// Clip file the terminal camera records from.
    pub capture_clip: Option<PathBuf>,
    /// Base URL of the generation API.
    pub api_base_url: String,
    /// Never read from the config file; env or CLI only.
    pub api_key: Option<String>,
    /// Screen shown after the splash.
    pub start_tab: NavTab,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let card = CardConfig::default();
        Self {
            gesture_window: card.gesture_window,
            heart_burst: card.heart_burst,
            controls_hide: card.controls_hide,
            visibility_threshold: card.visibility_threshold,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            preview_duration_secs: 15.0,
            capture_clip: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            start_tab: NavTab::Home,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Per-card timing and threshold settings.
    pub fn card_config(&self) -> CardConfig {
        CardConfig {
            gesture_window: self.gesture_window,
            heart_burst: self.heart_burst,
            controls_hide: self.controls_hide,
            visibility_threshold: self.visibility_threshold,
        }
    }

    /// Interval and timeout for video polling.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.poll_interval,
            timeout: self.poll_timeout,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/reelfeed/reelfeed.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("reelfeed").join("reelfeed.log")
    } else {
        PathBuf::from("reelfeed.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
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

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/reelfeed/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reelfeed").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `REELFEED_CONFIG` environment variable
/// 3. Default path `~/.config/reelfeed/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("REELFEED_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
///
/// # Errors
///
/// Returns `InvalidValue` for a threshold outside `(0, 1]`, a zero window, or a
/// zero poll interval.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let millis = |value: Option<u64>, field: &'static str, default: Duration| match value {
        Some(0) => Err(ConfigError::InvalidValue {
            field,
            reason: "must be greater than zero".to_string(),
        }),
        Some(ms) => Ok(Duration::from_millis(ms)),
        None => Ok(default),
    };

    let visibility_threshold = match config.visibility_threshold {
        Some(t) if !(t > 0.0 && t <= 1.0) => {
            return Err(ConfigError::InvalidValue {
                field: "visibility_threshold",
                reason: format!("{t} is outside (0, 1]"),
            })
        }
        Some(t) => t,
        None => defaults.visibility_threshold,
    };

    let poll_interval = match config.poll_interval_secs {
        Some(0) => {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_secs",
                reason: "must be greater than zero".to_string(),
            })
        }
        Some(secs) => Duration::from_secs(secs),
        None => defaults.poll_interval,
    };

    Ok(ResolvedConfig {
        gesture_window: millis(
            config.gesture_window_ms,
            "gesture_window_ms",
            defaults.gesture_window,
        )?,
        heart_burst: millis(config.heart_burst_ms, "heart_burst_ms", defaults.heart_burst)?,
        controls_hide: millis(
            config.controls_hide_ms,
            "controls_hide_ms",
            defaults.controls_hide,
        )?,
        visibility_threshold,
        poll_interval,
        poll_timeout: config
            .poll_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_timeout),
        preview_duration_secs: config
            .preview_duration_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .unwrap_or(defaults.preview_duration_secs),
        capture_clip: config.capture_clip.or(defaults.capture_clip),
        api_base_url: config.api_base_url.unwrap_or(defaults.api_base_url),
        api_key: None,
        start_tab: defaults.start_tab,
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    })
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `REELFEED_API_KEY`, falling back to `GEMINI_API_KEY`: session credential
/// - `REELFEED_CAPTURE_CLIP`: capture device clip
///
/// Empty values are ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

    if let Some(key) = non_empty("REELFEED_API_KEY").or_else(|| non_empty("GEMINI_API_KEY")) {
        config.api_key = Some(key);
    }

    if let Some(clip) = non_empty("REELFEED_CAPTURE_CLIP") {
        config.capture_clip = Some(PathBuf::from(clip));
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    api_key_override: Option<String>,
    capture_clip_override: Option<PathBuf>,
    start_tab_override: Option<NavTab>,
) -> ResolvedConfig {
    if let Some(key) = api_key_override.filter(|k| !k.trim().is_empty()) {
        config.api_key = Some(key);
    }

    if let Some(clip) = capture_clip_override {
        config.capture_clip = Some(clip);
    }

    if let Some(tab) = start_tab_override {
        config.start_tab = tab;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
