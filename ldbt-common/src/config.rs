//! Configuration loading and resolution
//!
//! Bootstrap settings only. Each setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and the
//! remaining tiers apply. A TOML file that exists but cannot be parsed is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit TOML config file
pub const ENV_CONFIG: &str = "LDBT_CONFIG";
/// Environment variable overriding the transformation service base URL
pub const ENV_API_BASE_URL: &str = "LDBT_API_BASE_URL";
/// Environment variable overriding the web UI bind host
pub const ENV_HOST: &str = "LDBT_HOST";
/// Environment variable overriding the web UI port
pub const ENV_PORT: &str = "LDBT_PORT";
/// Environment variable overriding the outbound request timeout
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "LDBT_REQUEST_TIMEOUT_SECS";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Transformation service base URL
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Web UI bind host
    #[serde(default)]
    pub host: Option<String>,

    /// Web UI port
    #[serde(default)]
    pub port: Option<u16>,

    /// Timeout for each outbound request, in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Idle sessions older than this are discarded, in seconds
    #[serde(default)]
    pub session_ttl_secs: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Compiled-in fallback values
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub api_base_url: String,
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub session_ttl_secs: u64,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            api_base_url: "https://ide-server-stage.stage.atad.ml/v1".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5780,
            request_timeout_secs: 120,
            session_ttl_secs: 24 * 60 * 60,
            log_level: default_log_level(),
        }
    }
}

/// Values supplied on the command line
///
/// `None` means "not given", so lower tiers apply.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub api_base_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub request_timeout_secs: Option<u64>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderConfig {
    /// Base URL without trailing slash
    pub api_base_url: String,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub session_ttl: Duration,
    pub log_level: String,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        let defaults = CompiledDefaults::default();
        Self {
            api_base_url: defaults.api_base_url,
            host: defaults.host,
            port: defaults.port,
            request_timeout: Duration::from_secs(defaults.request_timeout_secs),
            session_ttl: Duration::from_secs(defaults.session_ttl_secs),
            log_level: defaults.log_level,
        }
    }
}

impl UploaderConfig {
    /// Socket address string for the web UI listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolves [`UploaderConfig`] from CLI, environment, TOML and defaults
pub struct ConfigResolver {
    cli: CliOverrides,
    defaults: CompiledDefaults,
}

impl ConfigResolver {
    pub fn new(cli: CliOverrides) -> Self {
        Self {
            cli,
            defaults: CompiledDefaults::default(),
        }
    }

    /// Resolve every setting using the 4-tier priority order
    pub fn resolve(&self) -> Result<UploaderConfig> {
        let toml = match self.config_file_path() {
            Some(path) => load_toml_config(&path)?.unwrap_or_default(),
            None => TomlConfig::default(),
        };

        let api_base_url = first_of(
            self.cli.api_base_url.clone(),
            env_value(ENV_API_BASE_URL)?,
            toml.api_base_url.clone(),
        )
        .unwrap_or_else(|| self.defaults.api_base_url.clone());

        let host = first_of(self.cli.host.clone(), env_value(ENV_HOST)?, toml.host.clone())
            .unwrap_or_else(|| self.defaults.host.clone());

        let port = first_of(self.cli.port, env_value(ENV_PORT)?, toml.port)
            .unwrap_or(self.defaults.port);

        let request_timeout_secs = first_of(
            self.cli.request_timeout_secs,
            env_value(ENV_REQUEST_TIMEOUT_SECS)?,
            toml.request_timeout_secs,
        )
        .unwrap_or(self.defaults.request_timeout_secs);

        let session_ttl_secs = toml
            .session_ttl_secs
            .unwrap_or(self.defaults.session_ttl_secs);

        if request_timeout_secs == 0 {
            return Err(Error::Config(
                "request timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(UploaderConfig {
            api_base_url: normalize_base_url(&api_base_url)?,
            host,
            port,
            request_timeout: Duration::from_secs(request_timeout_secs),
            session_ttl: Duration::from_secs(session_ttl_secs),
            log_level: toml.logging.level,
        })
    }

    /// Locate the TOML file: CLI path, then `LDBT_CONFIG`, then the platform default
    fn config_file_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli.config_path {
            return Some(path.clone());
        }
        if let Ok(path) = std::env::var(ENV_CONFIG) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        default_config_path().filter(|path| path.exists())
    }
}

/// Platform config file location (`~/.config/ldbt/ldbt-upload.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ldbt").join("ldbt-upload.toml"))
}

/// Load a TOML config file
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        warn!(
            "Config file not found: {} (using defaults)",
            path.display()
        );
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(Some(config))
}

/// Trim a trailing slash and require an http(s) scheme
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Config(format!(
            "API base URL must start with http:// or https://, got '{}'",
            url
        )));
    }
    Ok(trimmed.to_string())
}

fn first_of<T>(cli: Option<T>, env: Option<T>, toml: Option<T>) -> Option<T> {
    cli.or(env).or(toml)
}

/// Read and parse an environment variable; unset or blank yields `None`
fn env_value<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("{}='{}' is invalid: {}", name, raw, e))),
        _ => Ok(None),
    }
}
