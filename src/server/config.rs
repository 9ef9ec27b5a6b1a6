use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::server::error::ServerError;

/// Environment variable prefix, e.g. `BOOKMARKS_API_TOKEN`.
pub const ENV_PREFIX: &str = "BOOKMARKS";

/// Deployment mode. Production hides error details and trims access logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
    Test,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Test => "test",
        })
    }
}

/// Server configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret clients send as `Authorization: Bearer <token>`
    #[serde(default)]
    pub api_token: String,

    /// Deployment mode
    #[serde(default)]
    pub environment: Environment,

    /// Base URL used for `Location` headers, e.g. `https://bookmarks.example.com`
    #[serde(default)]
    pub public_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in KB
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level / `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Hand-written so the token never ends up in logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("api_token", &"<redacted>")
            .field("environment", &self.environment)
            .field("public_url", &self.public_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_body_size_kb", &self.max_body_size_kb)
            .field("enable_cors", &self.enable_cors)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            api_token: String::new(),
            environment: Environment::default(),
            public_url: None,
            timeout_secs: default_timeout_secs(),
            max_body_size_kb: default_max_body_size_kb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Config with the given token and defaults for everything else.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            api_token: token.into(),
            ..Self::default()
        }
    }

    /// Load configuration from `.env`, an optional `bookmarks.*` file in the
    /// working directory, and `BOOKMARKS_*` environment variables, in that
    /// order of increasing precedence.
    pub fn load() -> Result<Self, ServerError> {
        // A missing .env file is the normal case outside development.
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(ServerError::Config(format!("failed to read .env: {err}")));
            }
        }
        Self::build(
            config::File::with_name("bookmarks").required(false),
            env_source(),
        )
    }

    /// Like [`load`](Self::load), but reads the given file instead of
    /// `bookmarks.*`, and requires it to exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        Self::build(config::File::from(path.as_ref()).required(true), env_source())
    }

    fn build<S>(file: S, env: config::Environment) -> Result<Self, ServerError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config: ServerConfig = config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .and_then(|built| built.try_deserialize())
            .map_err(|err| ServerError::Config(err.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot safely start with.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.api_token.trim().is_empty() {
            return Err(ServerError::Config(format!(
                "api_token must be set (env {ENV_PREFIX}_API_TOKEN)"
            )));
        }
        if let Some(base) = &self.public_url {
            url::Url::parse(base)
                .map_err(|err| ServerError::Config(format!("invalid public_url {base:?}: {err}")))?;
        }
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_kb * 1024
    }
}

/// `BOOKMARKS_*` variables, nested keys split on `__`.
///
/// Values stay strings: numeric fields are converted when the struct is
/// deserialized, so a token like `007` keeps its leading zeros.
fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_kb() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
