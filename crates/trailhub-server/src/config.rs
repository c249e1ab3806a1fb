//! Configuration management
//!
//! All settings come from the process environment (a local `.env` file is loaded
//! first when present). [`Config::cached`] loads once per process; [`Config::load`]
//! re-reads the environment every time.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use trailhub_common::env::{flag_var, optional_var, parse_var, required_var};

use crate::features::logs::FilterMode;

// ============================================================================
// Defaults
// ============================================================================

/// Default application name.
pub const DEFAULT_APP_NAME: &str = "TrailHub";

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 1993;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default timeout for every store operation, in seconds.
pub const DEFAULT_DATABASE_TIMEOUT_SECS: u64 = 10;

/// Default timeout for calls to the authorization service, in seconds.
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 5;

/// Permission required by the read endpoints.
pub const DEFAULT_READ_PERMISSION: &str = "trailhub:can-read-trail";

/// Default CORS allowed origin.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "*";

static CACHED: OnceLock<Config> = OnceLock::new();

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logs: LogsConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    /// Kept for parity with the deployment environment; the binary does not hot-reload
    pub reload: bool,
    pub access_log: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
    pub collection: String,
    pub timeout_secs: u64,
    /// Abort startup when the initial ping fails
    pub fail_fast: bool,
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// External authorization service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub base_url: String,
    pub validate_token_endpoint: String,
    pub check_access_endpoint: String,
    pub timeout_secs: u64,
    pub read_permission: String,
}

impl AuthConfig {
    pub fn validate_token_url(&self) -> anyhow::Result<Url> {
        join_endpoint(&self.base_url, &self.validate_token_endpoint)
    }

    pub fn check_access_url(&self) -> anyhow::Result<Url> {
        join_endpoint(&self.base_url, &self.check_access_endpoint)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Log ingestion policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    /// When false, creating a log requires a valid bearer credential
    pub allow_anonymous_push: bool,
    pub strip_source_spaces: bool,
    pub filter_mode: FilterMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Config {
    /// Load configuration from the environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                name: optional_var("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
                reload: flag_var("APP_RELOAD")?.unwrap_or(true),
                access_log: flag_var("APP_ACCESS_LOG")?.unwrap_or(true),
            },
            server: ServerConfig {
                host: optional_var("APP_HOSTNAME")
                    .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
                port: parse_var("APP_DEFAULT_PORT")?.unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: parse_var("APP_SHUTDOWN_TIMEOUT")?
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                uri: required_var("MONGODB_URI")?,
                name: required_var("MONGO_DB")?,
                collection: collection_name(&required_var("TRAILHUB_MODEL_NAME")?),
                timeout_secs: parse_var("MONGO_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_DATABASE_TIMEOUT_SECS),
                fail_fast: flag_var("MONGO_FAIL_FAST")?.unwrap_or(false),
            },
            auth: AuthConfig {
                base_url: required_var("API_AUTH_URL_BASE")?,
                validate_token_endpoint: required_var("API_AUTH_VALIDATE_TOKEN_ENDPOINT")?,
                check_access_endpoint: required_var("API_AUTH_CHECK_ACCESS_ENDPOINT")?,
                timeout_secs: parse_var("API_AUTH_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_AUTH_TIMEOUT_SECS),
                read_permission: optional_var("TRAILHUB_READ_PERMISSION")
                    .unwrap_or_else(|| DEFAULT_READ_PERMISSION.to_string()),
            },
            logs: LogsConfig {
                allow_anonymous_push: flag_var("ALLOW_ANONYM_PUSH")?.unwrap_or(false),
                strip_source_spaces: flag_var("SOURCE_STRIP_SPACES")?.unwrap_or(true),
                filter_mode: parse_var("LOGS_FILTER_MODE")?.unwrap_or_default(),
            },
            cors: CorsConfig {
                allowed_origins: optional_var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: flag_var("CORS_ALLOW_CREDENTIALS")?.unwrap_or(false),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Load once and reuse the result for the rest of the process
    pub fn cached() -> anyhow::Result<&'static Config> {
        if let Some(config) = CACHED.get() {
            return Ok(config);
        }
        let config = Self::load()?;
        Ok(CACHED.get_or_init(|| config))
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("APP_DEFAULT_PORT must be greater than 0");
        }

        if !self.database.uri.starts_with("mongodb://")
            && !self.database.uri.starts_with("mongodb+srv://")
        {
            anyhow::bail!("MONGODB_URI must start with mongodb:// or mongodb+srv://");
        }

        if self.database.collection.is_empty() {
            anyhow::bail!("TRAILHUB_MODEL_NAME does not name a collection");
        }

        if self.database.timeout_secs == 0 {
            anyhow::bail!("MONGO_TIMEOUT_SECS must be greater than 0");
        }

        if self.auth.timeout_secs == 0 {
            anyhow::bail!("API_AUTH_TIMEOUT_SECS must be greater than 0");
        }

        self.auth.validate_token_url()?;
        self.auth.check_access_url()?;

        let any_origin = self.cors.allowed_origins.is_empty()
            || self.cors.allowed_origins.iter().any(|o| o == "*");
        if any_origin && self.cors.allow_credentials {
            anyhow::bail!("CORS_ALLOW_CREDENTIALS cannot be combined with a wildcard origin");
        }

        Ok(())
    }
}

/// `TRAILHUB_MODEL_NAME` may be given as `database.collection`
fn collection_name(raw: &str) -> String {
    match raw.split_once('.') {
        Some((_, collection)) => collection.to_string(),
        None => raw.to_string(),
    }
}

fn join_endpoint(base: &str, endpoint: &str) -> anyhow::Result<Url> {
    let base = Url::parse(base)
        .map_err(|e| anyhow::anyhow!("API_AUTH_URL_BASE '{}' is not a valid URL: {}", base, e))?;
    base.join(endpoint)
        .map_err(|e| anyhow::anyhow!("Cannot join '{}' onto '{}': {}", endpoint, base, e))
}
