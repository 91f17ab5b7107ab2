//! Server configuration loaded from the environment.

use std::fmt;

/// Environment variable selecting the ship store backend.
pub(crate) const STORE_ENV: &str = "SHIPYARD_STORE";
/// Environment variable holding the PostgreSQL connection string.
pub(crate) const DATABASE_URL_ENV: &str = "DATABASE_URL";

const DEFAULT_ORIGINS: &str = "http://127.0.0.1:4200,http://localhost:4200";

/// Which ship store backs the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    /// PostgreSQL at the given URL.
    Postgres(String),
    /// Process memory; contents are lost on exit.
    Memory,
}

/// Invalid or missing configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    key: &'static str,
    message: String,
}

impl ConfigError {
    fn new(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for std::io::Error {
    fn from(err: ConfigError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    }
}

/// Listener, store and CORS settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Backing store.
    pub store: StoreKind,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup(STORE_ENV)
            .unwrap_or_else(|| "postgres".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => StoreKind::Memory,
            "postgres" => StoreKind::Postgres(
                lookup(DATABASE_URL_ENV)
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| {
                        ConfigError::new(DATABASE_URL_ENV, "must be set for the postgres store")
                    })?,
            ),
            other => {
                return Err(ConfigError::new(
                    STORE_ENV,
                    format!("must be `postgres` or `memory`, got `{other}`"),
                ));
            }
        };

        let host = lookup("SHIPYARD_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("SHIPYARD_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::new("SHIPYARD_PORT", "must be a u16 number"))?,
            None => 8080,
        };
        let allowed_origins = lookup("SHIPYARD_UI_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            host,
            port,
            store,
            allowed_origins,
        })
    }
}
