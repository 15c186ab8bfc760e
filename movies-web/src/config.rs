use serde::Deserialize;
use std::env;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "movies.toml";

/// Thirty days, the usual first-rollout HSTS lifetime.
pub const DEFAULT_HSTS_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_auth_token: Option<String>,
    pub static_dir: PathBuf,
    pub log_dir: PathBuf,
    pub hsts_max_age_secs: u64,
    pub antiforgery_secret: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            database_url: None,
            database_auth_token: None,
            static_dir: PathBuf::from("static"),
            log_dir: PathBuf::from("logs"),
            hsts_max_age_secs: DEFAULT_HSTS_MAX_AGE_SECS,
            antiforgery_secret: None,
        }
    }
}

impl AppConfig {
    /// Loads the TOML file (when present) and applies environment overrides.
    ///
    /// An explicitly requested path must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `APP_ENVIRONMENT`, `HOST`, `PORT`, `LIBSQL_URL`,
    /// `LIBSQL_AUTH_TOKEN` and `ANTIFORGERY_SECRET`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("APP_ENVIRONMENT") {
            self.environment = Environment::parse(&value).ok_or(ConfigError::Invalid {
                key: "APP_ENVIRONMENT",
                value,
            })?;
        }
        if let Some(value) = lookup("HOST") {
            self.host = value.parse().map_err(|_| ConfigError::Invalid {
                key: "HOST",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("PORT") {
            self.port = value.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("LIBSQL_URL").filter(|v| !v.is_empty()) {
            self.database_url = Some(value);
        }
        if let Some(value) = lookup("LIBSQL_AUTH_TOKEN").filter(|v| !v.is_empty()) {
            self.database_auth_token = Some(value);
        }
        if let Some(value) = lookup("ANTIFORGERY_SECRET").filter(|v| !v.is_empty()) {
            self.antiforgery_secret = Some(value);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
