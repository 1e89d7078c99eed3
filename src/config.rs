//! Layered configuration for the hot-reload watcher.
//!
//! Values are resolved in this order (later wins):
//! - Built-in defaults
//! - TOML configuration file (`--config <FILE>` or `./qml-hotreload.toml`)
//! - Environment variables
//! - CLI argument overrides (applied by the binary)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `QML_HOTRELOAD_` and use double
//! underscores to separate nested levels:
//! - `QML_HOTRELOAD_WATCH__DEBOUNCE_MS=500` sets `watch.debounce_ms`
//! - `QML_HOTRELOAD_LINK__MODE=polling` sets `link.mode`
//! - `QML_HOTRELOAD_LINK__SOCKET_PATH=/tmp/app.sock` sets `link.socket_path`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File looked up in the current directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "qml-hotreload.toml";

const ENV_PREFIX: &str = "QML_HOTRELOAD_";

/// Errors raised while loading or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("QML directory not found: {}", path.display())]
    WatchRootMissing { path: PathBuf },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    #[error("Failed to write configuration to {}: {reason}", path.display())]
    SaveFailed { path: PathBuf, reason: String },
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    /// What to watch and how to filter it
    #[serde(default)]
    pub watch: WatchConfig,

    /// How to reach the companion application
    #[serde(default)]
    pub link: LinkConfig,

    /// Log levels
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchConfig {
    /// Root of the recursive watch
    #[serde(default = "default_watch_root")]
    pub root: PathBuf,

    /// Extension (without the dot) of the files under observation
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Minimum interval between two accepted events on the same path
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// How the link decides when the watch should be running.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Watch immediately, attempt every delivery regardless of reachability.
    #[default]
    Reactive,
    /// Probe the endpoint on a timer and only watch while it answers.
    Polling,
}

impl std::fmt::Display for LinkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkMode::Reactive => write!(f, "reactive"),
            LinkMode::Polling => write!(f, "polling"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LinkConfig {
    /// Unix socket the companion application listens on
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    #[serde(default)]
    pub mode: LinkMode,

    /// Connect and response timeout for a real delivery
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,

    /// Connect timeout for a reachability probe
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Probe period in polling mode
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum number of acknowledgement bytes read per delivery
    #[serde(default = "default_response_limit")]
    pub response_limit: usize,

    /// Send `reload` each time the endpoint becomes reachable (polling mode)
    #[serde(default)]
    pub reload_on_connect: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for every target
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `qml_hotreload::link = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_watch_root() -> PathBuf {
    PathBuf::from("src/qml")
}
fn default_extension() -> String {
    "qml".to_string()
}
fn default_debounce_ms() -> u64 {
    300
}
// QLocalServer places the socket under /tmp on Linux
fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/wallet_hotreload_12345")
}
fn default_delivery_timeout_ms() -> u64 {
    5_000
}
fn default_probe_timeout_ms() -> u64 {
    2_000
}
fn default_poll_interval_ms() -> u64 {
    5_000
}
fn default_response_limit() -> usize {
    1024
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: default_watch_root(),
            extension: default_extension(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            mode: LinkMode::default(),
            delivery_timeout_ms: default_delivery_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            response_limit: default_response_limit(),
            reload_on_connect: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl LinkConfig {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject timers that would fire immediately or never tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timers = [
            ("link.delivery_timeout_ms", self.delivery_timeout_ms),
            ("link.probe_timeout_ms", self.probe_timeout_ms),
            ("link.poll_interval_ms", self.poll_interval_ms),
        ];
        match timers.into_iter().find(|(_, ms)| *ms == 0) {
            Some((field, _)) => Err(ConfigError::ZeroDuration { field }),
            None => Ok(()),
        }
    }
}

impl Settings {
    /// Load configuration from defaults, `./qml-hotreload.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file, still honoring environment overrides.
    ///
    /// A missing file is not an error; defaults and environment apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore becomes a dot; single underscores stay inside field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Fail fast when the watch root is absent or a link timer is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.watch.root.is_dir() {
            return Err(ConfigError::WatchRootMissing {
                path: self.watch.root.clone(),
            });
        }
        self.link.validate()
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let save_failed = |reason: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        let content = self.to_toml().map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.watch.root, PathBuf::from("src/qml"));
        assert_eq!(settings.watch.extension, "qml");
        assert_eq!(settings.watch.debounce(), Duration::from_millis(300));
        assert_eq!(
            settings.link.socket_path,
            PathBuf::from("/tmp/wallet_hotreload_12345")
        );
        assert_eq!(settings.link.mode, LinkMode::Reactive);
        assert_eq!(settings.link.response_limit, 1024);
        assert!(!settings.link.reload_on_connect);
        assert_eq!(settings.logging.default, "info");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("qml-hotreload.toml");

        let toml_content = r#"
[watch]
root = "ui/qml"
debounce_ms = 750

[link]
socket_path = "/tmp/other.sock"
mode = "polling"
reload_on_connect = true

[logging]
default = "debug"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.watch.root, PathBuf::from("ui/qml"));
        assert_eq!(settings.watch.debounce_ms, 750);
        assert_eq!(settings.link.socket_path, PathBuf::from("/tmp/other.sock"));
        assert_eq!(settings.link.mode, LinkMode::Polling);
        assert!(settings.link.reload_on_connect);
        assert_eq!(settings.logging.default, "debug");

        // Untouched values keep their defaults
        assert_eq!(settings.watch.extension, "qml");
        assert_eq!(settings.link.delivery_timeout_ms, 5_000);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.watch.extension, "qml");
        assert_eq!(settings.link.mode, LinkMode::Reactive);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[link]\nmode = \"sometimes\"\n").unwrap();

        let result = Settings::load_from(&config_path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("qml-hotreload.toml");
        fs::write(&config_path, "[link]\npoll_interval_ms = 1000\n").unwrap();

        unsafe {
            std::env::set_var("QML_HOTRELOAD_LINK__POLL_INTERVAL_MS", "250");
        }
        let settings = Settings::load_from(&config_path).unwrap();
        unsafe {
            std::env::remove_var("QML_HOTRELOAD_LINK__POLL_INTERVAL_MS");
        }

        assert_eq!(settings.link.poll_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_validate_missing_root() {
        let mut settings = Settings::default();
        settings.watch.root = PathBuf::from("/nonexistent/qml/12345");

        let err = settings.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "QML directory not found: /nonexistent/qml/12345"
        );
    }

    #[test]
    fn test_validate_existing_root() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.watch.root = temp_dir.path().to_path_buf();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.watch.root = temp_dir.path().to_path_buf();
        settings.link.poll_interval_ms = 0;

        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZeroDuration {
                field: "link.poll_interval_ms"
            }
        ));
        assert_eq!(
            err.to_string(),
            "link.poll_interval_ms must be greater than zero"
        );
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let mut link = LinkConfig {
            delivery_timeout_ms: 0,
            ..LinkConfig::default()
        };
        assert!(matches!(
            link.validate(),
            Err(ConfigError::ZeroDuration {
                field: "link.delivery_timeout_ms"
            })
        ));

        link.delivery_timeout_ms = 5_000;
        link.probe_timeout_ms = 0;
        assert!(matches!(
            link.validate(),
            Err(ConfigError::ZeroDuration {
                field: "link.probe_timeout_ms"
            })
        ));

        link.probe_timeout_ms = 2_000;
        assert!(link.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_from_file_fails_validation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("qml-hotreload.toml");
        fs::write(&config_path, "[link]\nprobe_timeout_ms = 0\n").unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert!(matches!(
            settings.link.validate(),
            Err(ConfigError::ZeroDuration { .. })
        ));
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("qml-hotreload.toml");

        let mut settings = Settings::default();
        settings.watch.debounce_ms = 900;
        settings.link.mode = LinkMode::Polling;
        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.watch.debounce_ms, 900);
        assert_eq!(loaded.link.mode, LinkMode::Polling);
    }
}
