// Configuration loading: optional config/fitflag.toml plus environment
// overrides for the flagd connection and listen port.

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Config file location relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/fitflag.toml";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "FITFLAG_CONFIG";

pub const STEPS_FLAG_KEY: &str = "step-calculation-algorithm";
pub const CALORIES_FLAG_KEY: &str = "calorie-calculation-algorithm";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for environment variable {var}")]
    EnvError { var: String, value: String },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub flagd: FlagdConfig,
    pub flags: FlagsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::ValidationError {
                field: "server.host".into(),
                message: format!("not an IP address: {}", self.host),
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Connection settings for the flagd provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlagdConfig {
    /// When false no provider is contacted and every flag uses its default.
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub timeout_ms: u64,
}

impl Default for FlagdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "localhost".into(),
            port: 8013,
            tls: false,
            timeout_ms: 500,
        }
    }
}

impl FlagdConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Flag keys and the variant each falls back to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlagsConfig {
    pub steps_key: String,
    pub steps_default: String,
    pub calories_key: String,
    pub calories_default: String,
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            steps_key: STEPS_FLAG_KEY.into(),
            steps_default: "simple".into(),
            calories_key: CALORIES_FLAG_KEY.into(),
            calories_default: "simple".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse a TOML document. Missing sections and fields take their defaults.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the config file at `path` (defaults if it does not exist), apply
/// overrides from `env`, and validate.
///
/// `env` is a variable lookup so tests can supply overrides without touching
/// the process environment.
pub fn load_config_from<F>(path: &Path, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = if path.exists() {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        parse_config(&text, path)?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config, env)?;
    validate(&config)?;
    Ok(config)
}

/// Resolve the config location from `env` and load it.
///
/// A path named by `$FITFLAG_CONFIG` must exist; only the built-in
/// `config/fitflag.toml` may be absent, in which case defaults apply.
pub fn load_config_with<F>(env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match env(CONFIG_PATH_ENV) {
        Some(explicit) => {
            let path = PathBuf::from(explicit);
            if !path.is_file() {
                return Err(ConfigError::FileNotFound { path });
            }
            load_config_from(&path, env)
        }
        None => load_config_from(Path::new(DEFAULT_CONFIG_PATH), env),
    }
}

/// Convenience wrapper: [`load_config_with`] over the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_with(|var| std::env::var(var).ok())
}

/// Apply `FLAGD_HOST`, `FLAGD_PORT`, `FLAGD_TLS` and `PORT`.
pub fn apply_env_overrides<F>(config: &mut Config, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = env("FLAGD_HOST") {
        config.flagd.host = host;
    }
    if let Some(port) = env("FLAGD_PORT") {
        config.flagd.port = parse_env("FLAGD_PORT", &port)?;
    }
    if let Some(tls) = env("FLAGD_TLS") {
        config.flagd.tls = parse_env("FLAGD_TLS", &tls)?;
    }
    if let Some(port) = env("PORT") {
        config.server.port = parse_env("PORT", &port)?;
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::EnvError {
        var: var.to_string(),
        value: value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    config.server.socket_addr()?;

    let ports: &[(&str, u16)] = &[
        ("server.port", config.server.port),
        ("flagd.port", config.flagd.port),
    ];
    for (name, val) in ports {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be greater than 0".into(),
            });
        }
    }

    if config.flagd.host.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "flagd.host".into(),
            message: "must not be empty".into(),
        });
    }

    if config.flagd.timeout_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "flagd.timeout_ms".into(),
            message: "must be greater than 0".into(),
        });
    }

    let keys: &[(&str, &str)] = &[
        ("flags.steps_key", config.flags.steps_key.as_str()),
        ("flags.calories_key", config.flags.calories_key.as_str()),
    ];
    for (name, val) in keys {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
