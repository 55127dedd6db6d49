//! Configuration loading and typed config structures for the Turtle Sync
//! server.
//!
//! The canonical configuration lives in `turtle-config.yaml` next to the
//! binary. Every field has a default, so a missing or empty file yields a
//! working server on port 8008.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held an unusable value.
    #[error("invalid environment override {name}: {reason}")]
    Env {
        /// The variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A value parsed but cannot be used.
    #[error("invalid config value {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `turtle-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TurtleConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Actor registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Push stream settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TurtleConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listener:
    /// - `TURTLE_HOST` overrides `server.host`
    /// - `TURTLE_PORT` overrides `server.port`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields the
    /// defaults (environment overrides still apply).
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults. Parsed values are checked
    /// with [`validate`](Self::validate).
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but would break the server.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.broadcast.subscriber_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "broadcast.subscriber_capacity",
                reason: "must be at least 1",
            });
        }
        if self.broadcast.keep_alive_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "broadcast.keep_alive_secs",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSection {
    /// Override the listener address with environment variables when set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("TURTLE_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("TURTLE_PORT") {
            self.port = val.parse().map_err(|e| ConfigError::Env {
                name: "TURTLE_PORT",
                reason: format!("{e}"),
            })?;
        }
        Ok(())
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Actor registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryConfig {
    /// Snapshot queries without an explicit `since` return actors updated
    /// within this many seconds.
    #[serde(default = "default_recency_window_secs")]
    pub recency_window_secs: u64,
}

impl RegistryConfig {
    /// The recency window as a [`Duration`].
    pub const fn recency_window(&self) -> Duration {
        Duration::from_secs(self.recency_window_secs)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            recency_window_secs: default_recency_window_secs(),
        }
    }
}

/// Push stream configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BroadcastConfig {
    /// Per-subscriber buffer. A subscriber that falls this far behind
    /// misses messages until it catches up.
    #[serde(default = "default_subscriber_capacity")]
    pub subscriber_capacity: usize,

    /// Interval between SSE keep-alive comments.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl BroadcastConfig {
    /// The keep-alive interval as a [`Duration`].
    pub const fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            subscriber_capacity: default_subscriber_capacity(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8008
}

const fn default_recency_window_secs() -> u64 {
    3600
}

const fn default_subscriber_capacity() -> usize {
    256
}

const fn default_keep_alive_secs() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TurtleConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8008);
        assert_eq!(config.registry.recency_window(), Duration::from_secs(3600));
        assert_eq!(config.broadcast.subscriber_capacity, 256);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9000

registry:
  recency_window_secs: 60

broadcast:
  subscriber_capacity: 16
  keep_alive_secs: 5

logging:
  level: "debug"
  json: true
"#;
        let config = TurtleConfig::parse(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.registry.recency_window_secs, 60);
        assert_eq!(config.broadcast.subscriber_capacity, 16);
        assert_eq!(config.broadcast.keep_alive(), Duration::from_secs(5));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = TurtleConfig::parse("server:\n  port: 8100\n").unwrap();
        assert_eq!(config.server.port, 8100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.registry.recency_window_secs, 3600);
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        assert_eq!(TurtleConfig::parse("").unwrap(), TurtleConfig::default());
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let result = TurtleConfig::parse("server: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = TurtleConfig::parse(include_str!("../../../turtle-config.yaml")).unwrap();
        assert_eq!(config, TurtleConfig::default());
    }

    #[test]
    fn zero_broadcast_values_are_rejected() {
        let result = TurtleConfig::parse("broadcast:\n  keep_alive_secs: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "broadcast.keep_alive_secs", .. })
        ));

        let result = TurtleConfig::parse("broadcast:\n  subscriber_capacity: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "broadcast.subscriber_capacity", .. })
        ));

        assert!(TurtleConfig::default().validate().is_ok());
    }
}
