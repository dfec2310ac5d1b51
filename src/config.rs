//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamSettings,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub branding: BrandingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metering backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default = "default_upstream_url")]
    pub base_url: String,

    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

fn default_upstream_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_upstream_timeout() -> u64 {
    300 // report queries can take minutes on a slow PLC segment
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_require_auth")]
    pub require_auth: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_require_auth() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            require_auth: default_require_auth(),
        }
    }
}

/// Login credentials for the operator account
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_admin_user")]
    pub admin_user: String,

    #[serde(default)]
    pub admin_password: String,
}

fn default_admin_user() -> String {
    "admin".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_user: default_admin_user(),
            admin_password: String::new(),
        }
    }
}

/// Texts shown in the dashboard header
#[derive(Debug, Clone, Deserialize)]
pub struct BrandingConfig {
    #[serde(default = "default_app_title")]
    pub app_title: String,

    #[serde(default = "default_app_subtitle")]
    pub app_subtitle: String,
}

fn default_app_title() -> String {
    "Telegrid".to_string()
}

fn default_app_subtitle() -> String {
    "Meter telemetry console".to_string()
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            app_title: default_app_title(),
            app_subtitle: default_app_subtitle(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("telegrid").join("config.toml")),
            Some(PathBuf::from("/etc/telegrid/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("TELEGRID_UPSTREAM_URL") {
            self.upstream.base_url = url;
        }
        if let Ok(timeout) = std::env::var("TELEGRID_UPSTREAM_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.upstream.timeout_secs = t;
            }
        }

        if let Ok(host) = std::env::var("TELEGRID_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("TELEGRID_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Ok(require) = std::env::var("TELEGRID_REQUIRE_AUTH") {
            if let Ok(r) = require.parse() {
                self.api.require_auth = r;
            }
        }

        if let Ok(user) = std::env::var("TELEGRID_ADMIN_USER") {
            self.auth.admin_user = user;
        }
        if let Ok(password) = std::env::var("TELEGRID_ADMIN_PASSWORD") {
            self.auth.admin_password = password;
        }

        if let Ok(title) = std::env::var("TELEGRID_APP_TITLE") {
            self.branding.app_title = title;
        }
        if let Ok(subtitle) = std::env::var("TELEGRID_APP_SUBTITLE") {
            self.branding.app_subtitle = subtitle;
        }

        if let Ok(level) = std::env::var("TELEGRID_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TELEGRID_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream: UpstreamSettings::default(),
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            branding: BrandingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Telegrid Configuration
#
# Environment variables override these settings:
# - TELEGRID_UPSTREAM_URL
# - TELEGRID_UPSTREAM_TIMEOUT_SECS
# - TELEGRID_API_HOST
# - TELEGRID_API_PORT
# - TELEGRID_REQUIRE_AUTH
# - TELEGRID_ADMIN_USER
# - TELEGRID_ADMIN_PASSWORD
# - TELEGRID_APP_TITLE
# - TELEGRID_APP_SUBTITLE
# - TELEGRID_LOG_LEVEL
# - TELEGRID_LOG_FORMAT

[upstream]
# Metering backend URL
base_url = "http://localhost:8000"

# Request timeout in seconds (report queries can be slow)
timeout_secs = 300

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins (empty = allow any)
cors_origins = []

# Require a login session for report and order endpoints
require_auth = true

[auth]
# Operator account
admin_user = "admin"
admin_password = ""

[branding]
# Dashboard header texts
app_title = "Telegrid"
app_subtitle = "Meter telemetry console"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/telegrid/telegrid.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.upstream.base_url, "http://localhost:8000");
        assert_eq!(config.api.port, 8090);
        assert!(config.api.require_auth);
        assert_eq!(config.auth.admin_user, "admin");
    }

    #[test]
    fn test_generated_default_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.branding.app_title, "Telegrid");
        assert_eq!(config.upstream.timeout_secs, 300);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[api]\nport = 9000\n").unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[upstream]\nbase_url = \"http://backend:8000\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.upstream.base_url, "http://backend:8000");

        let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
