//! Configuration manager for users-api.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors that may occur during the configuration loading process.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing `DATABASE_URL` environment variable")]
    MissingDatabaseUrl,
    #[error("`DATABASE_URL` is not a valid URL: {0}")]
    InvalidDatabaseUrl(#[from] url::ParseError),
    #[error("cannot open `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse `{}`: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Listening address.
    pub address: String,
    pub port: u16,
    #[serde(skip_deserializing)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to PostgreSQL configuration.
    pub postgres: Postgres,
    /// Related to read-through cache configuration.
    pub cache: Cache,
    /// Related to logs, traces and metrics.
    pub telemetry: Telemetry,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_owned(),
            address: "0.0.0.0".to_owned(),
            port: 3000,
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            postgres: Postgres::default(),
            cache: Cache::default(),
            telemetry: Telemetry::default(),
        }
    }
}

/// PostgreSQL configuration.
///
/// The connection string itself is read from `DATABASE_URL`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Postgres {
    /// Maximum pool connections.
    pub pool_size: u32,
}

impl Default for Postgres {
    fn default() -> Self {
        Self { pool_size: 10 }
    }
}

/// Cache configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Cache {
    /// Entry lifetime in seconds. `0` never expires.
    pub ttl: u64,
    /// Redis URL. Entries are kept in memory when missing.
    pub redis: Option<String>,
    /// Maximum entries kept in memory.
    pub capacity: u64,
    /// Evict `all_users` on every write.
    pub invalidate_collection_on_write: bool,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            ttl: 5,
            redis: None,
            capacity: 100,
            invalidate_collection_on_write: false,
        }
    }
}

/// Output format of logs.
#[derive(Debug, Default, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Telemetry configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    /// Default log directive, overridden by `RUST_LOG`.
    pub level: String,
    pub format: LogFormat,
    /// OTLP gRPC endpoint for traces and logs.
    pub otlp_endpoint: Option<String>,
    /// Expose Prometheus metrics on `/metrics`.
    pub prometheus: bool,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::default(),
            otlp_endpoint: None,
            prometheus: true,
        }
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the YAML file from the specified path, `config.yaml` when
    /// none is set.
    ///
    /// An unreadable file falls back to defaults and the cause is handed
    /// back, since tracing may not be set up yet. `PORT` environment
    /// variable takes precedence over the file.
    pub fn read(self) -> (Arc<Self>, Option<ConfigError>) {
        let file_path = if self.path.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_CONFIG_PATH)
        } else {
            self.path
        };

        let (mut config, fallback) = match Self::load(&file_path) {
            Ok(config) => (config, None),
            Err(err) => (Self::default(), Some(err)),
        };

        config.version = VERSION.to_owned();
        config.path = file_path;
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }

        (Arc::new(config), fallback)
    }

    /// Application version.
    pub fn version(&self) -> &str {
        &self.version
    }

    fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        serde_yaml::from_reader(file).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// Read the required database connection string from the environment.
pub fn database_url() -> Result<Url, ConfigError> {
    parse_database_url(std::env::var(DATABASE_URL_ENV).ok())
}

fn parse_database_url(value: Option<String>) -> Result<Url, ConfigError> {
    let value = value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingDatabaseUrl)?;

    Ok(Url::parse(value.trim())?)
}
