//! Configuration loading and constants.
//!
//! Loads application configuration from a TOML file and defines constants for
//! probe timings, HTTP response headers, logging defaults and default paths.
//! `AppConfig` is the root configuration struct containing all settings.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::probe::ProbeTimings;

// =============================================================================
// Probe Timing Defaults
// =============================================================================

/// Seconds before readiness is restored after being switched off
pub const DEFAULT_READINESS_RESTORE_SECS: u64 = 30;

/// Lower bound (inclusive) of the randomized liveness restore delay
pub const DEFAULT_LIVENESS_RESTORE_MIN_SECS: u64 = 5;

/// Upper bound (inclusive) of the randomized liveness restore delay
pub const DEFAULT_LIVENESS_RESTORE_MAX_SECS: u64 = 60;

/// Longest configurable restore delay (one day)
pub const MAX_RESTORE_SECS: u64 = 86400;

// =============================================================================
// HTTP
// =============================================================================

/// Probe and API responses must never be served from a cache
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

/// Time allowed for in-flight requests to finish after a shutdown signal
pub const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 10;

/// Default bind address
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "probe_demo=debug,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

// Time unit constants (in seconds) for uptime rendering
/// Seconds in a minute
pub const SECONDS_PER_MINUTE: u64 = 60;
/// Seconds in an hour
pub const SECONDS_PER_HOUR: u64 = 3600;
/// Seconds in a day
pub const SECONDS_PER_DAY: u64 = 86400;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Auto-recovery timer settings
    #[serde(default)]
    pub probes: ProbeConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }
}

/// Auto-recovery timer settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Delay before readiness comes back on its own (default: 30)
    #[serde(default = "ProbeConfig::default_readiness_restore")]
    pub readiness_restore_seconds: u64,
    /// Shortest liveness test duration (default: 5)
    #[serde(default = "ProbeConfig::default_liveness_restore_min")]
    pub liveness_restore_min_seconds: u64,
    /// Longest liveness test duration (default: 60)
    #[serde(default = "ProbeConfig::default_liveness_restore_max")]
    pub liveness_restore_max_seconds: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            readiness_restore_seconds: Self::default_readiness_restore(),
            liveness_restore_min_seconds: Self::default_liveness_restore_min(),
            liveness_restore_max_seconds: Self::default_liveness_restore_max(),
        }
    }
}

impl ProbeConfig {
    fn default_readiness_restore() -> u64 {
        DEFAULT_READINESS_RESTORE_SECS
    }

    fn default_liveness_restore_min() -> u64 {
        DEFAULT_LIVENESS_RESTORE_MIN_SECS
    }

    fn default_liveness_restore_max() -> u64 {
        DEFAULT_LIVENESS_RESTORE_MAX_SECS
    }

    /// Convert to the timings used by the probe state machine
    pub fn timings(&self) -> ProbeTimings {
        ProbeTimings {
            readiness_restore: Duration::from_secs(self.readiness_restore_seconds),
            liveness_restore_min_secs: self.liveness_restore_min_seconds,
            liveness_restore_max_secs: self.liveness_restore_max_seconds,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.readiness_restore_seconds == 0 {
            return Err(ConfigError::Validation(
                "probes.readiness_restore_seconds must be at least 1".to_string(),
            ));
        }
        if self.liveness_restore_min_seconds == 0 {
            return Err(ConfigError::Validation(
                "probes.liveness_restore_min_seconds must be at least 1".to_string(),
            ));
        }
        if self.readiness_restore_seconds > MAX_RESTORE_SECS {
            return Err(ConfigError::Validation(format!(
                "probes.readiness_restore_seconds must be at most {}",
                MAX_RESTORE_SECS
            )));
        }
        if self.liveness_restore_max_seconds > MAX_RESTORE_SECS {
            return Err(ConfigError::Validation(format!(
                "probes.liveness_restore_max_seconds must be at most {}",
                MAX_RESTORE_SECS
            )));
        }
        if self.liveness_restore_min_seconds > self.liveness_restore_max_seconds {
            return Err(ConfigError::Validation(format!(
                "probes.liveness_restore_min_seconds ({}) exceeds liveness_restore_max_seconds ({})",
                self.liveness_restore_min_seconds, self.liveness_restore_max_seconds
            )));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load `path`, falling back to built-in defaults when the default config
    /// file is absent. A missing file that was asked for explicitly is an error.
    pub fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if path == DEFAULT_CONFIG_PATH && !Path::new(path).exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;

        match config.logging.format.to_ascii_lowercase().as_str() {
            "text" | "json" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "logging.format must be \"text\" or \"json\", got \"{}\"",
                    other
                )))
            }
        }
        config.probes.validate()?;

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.probes.timings(), ProbeTimings::default());
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::parse(
            r#"
[http]
host = "127.0.0.1"
port = 9000

[probes]
readiness_restore_seconds = 10
liveness_restore_min_seconds = 2
liveness_restore_max_seconds = 4

[logging]
format = "json"
"#,
        )
        .unwrap();

        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 9000);
        let timings = config.probes.timings();
        assert_eq!(timings.readiness_restore, Duration::from_secs(10));
        assert_eq!(timings.liveness_restore_min_secs, 2);
        assert_eq!(timings.liveness_restore_max_secs, 4);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_inverted_liveness_range_rejected() {
        let err = AppConfig::parse(
            r#"
[probes]
liveness_restore_min_seconds = 30
liveness_restore_max_seconds = 10
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_zero_readiness_delay_rejected() {
        let err = AppConfig::parse("[probes]\nreadiness_restore_seconds = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_oversized_readiness_delay_rejected() {
        let err = AppConfig::parse("[probes]\nreadiness_restore_seconds = 9223372036854775807\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_oversized_liveness_range_rejected() {
        let err = AppConfig::parse(
            r#"
[probes]
liveness_restore_min_seconds = 9223372036854775807
liveness_restore_max_seconds = 9223372036854775807
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_one_day_delay_accepted() {
        let config = AppConfig::parse(
            "[probes]\nreadiness_restore_seconds = 86400\nliveness_restore_max_seconds = 86400\n",
        )
        .unwrap();
        assert_eq!(config.probes.readiness_restore_seconds, MAX_RESTORE_SECS);
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let err = AppConfig::parse("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = AppConfig::parse("[http\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 3000").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.port, 3000);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = AppConfig::load_or_default("/nonexistent/probe-demo.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
