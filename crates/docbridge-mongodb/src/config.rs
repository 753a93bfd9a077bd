//! Connection configuration
//!
//! Settings can come from code, a TOML file, or the environment. Anything not
//! set keeps the driver's own default.

use docbridge_common::{DocBridgeError, Result};
use mongodb::options::ClientOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Address used when nothing else is configured
pub const DEFAULT_URI: &str = "mongodb://localhost:27017";

/// Environment variables consulted by [`ConnectionConfig::from_env`], in priority order
pub const URI_ENV_VARS: [&str; 2] = ["DOCBRIDGE_MONGODB_URI", "MONGODB_URI"];

/// Environment variable overriding the application name
pub const APP_NAME_ENV_VAR: &str = "DOCBRIDGE_APP_NAME";

/// MongoDB connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Connection string in `mongodb://host:port` form
    pub uri: String,
    /// Application name for server logs
    pub app_name: Option<String>,
    /// Minimum number of pooled connections (driver default: 0)
    pub min_pool_size: Option<u32>,
    /// Maximum number of pooled connections (driver default: 10)
    pub max_pool_size: Option<u32>,
    /// Seconds a pooled connection may stay idle
    pub max_idle_time_secs: Option<u64>,
    /// Seconds allowed for establishing a socket (driver default: 10)
    pub connect_timeout_secs: Option<u64>,
    /// Seconds allowed for finding a usable server (driver default: 30)
    pub server_selection_timeout_secs: Option<u64>,
    /// Ping the server while connecting so an unreachable server fails construction
    pub verify_on_connect: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            app_name: Some("docbridge".to_string()),
            min_pool_size: None,
            max_pool_size: None,
            max_idle_time_secs: None,
            connect_timeout_secs: None,
            server_selection_timeout_secs: None,
            verify_on_connect: true,
        }
    }
}

impl ConnectionConfig {
    /// Default configuration pointed at `uri`
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file without validating it
    ///
    /// For callers that override fields before calling [`validate`](Self::validate).
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            DocBridgeError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&source)?)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the known variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(uri) = URI_ENV_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty())
        {
            config.uri = uri.trim().to_string();
        }
        if let Some(app_name) = lookup(APP_NAME_ENV_VAR).filter(|v| !v.is_empty()) {
            config.app_name = Some(app_name);
        }

        config.validate()?;
        Ok(config)
    }

    /// Basic shape checks; the driver performs full URI parsing
    pub fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(DocBridgeError::Config(
                "Connection URI cannot be empty".to_string(),
            ));
        }
        if !self.uri.starts_with("mongodb://") && !self.uri.starts_with("mongodb+srv://") {
            return Err(DocBridgeError::Config(format!(
                "Connection URI must use the mongodb:// or mongodb+srv:// scheme: '{}'",
                self.uri
            )));
        }
        if let (Some(min), Some(max)) = (self.min_pool_size, self.max_pool_size) {
            if min > max {
                return Err(DocBridgeError::Config(format!(
                    "min_pool_size ({}) exceeds max_pool_size ({})",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Copy the configured values onto parsed driver options
    pub fn apply_to(&self, client_options: &mut ClientOptions) {
        if let Some(app) = &self.app_name {
            client_options.app_name = Some(app.clone());
        }
        if let Some(min) = self.min_pool_size {
            client_options.min_pool_size = Some(min);
        }
        if let Some(max) = self.max_pool_size {
            client_options.max_pool_size = Some(max);
        }
        if let Some(idle) = self.max_idle_time_secs {
            client_options.max_idle_time = Some(Duration::from_secs(idle));
        }
        if let Some(connect) = self.connect_timeout_secs {
            client_options.connect_timeout = Some(Duration::from_secs(connect));
        }
        if let Some(server_sel) = self.server_selection_timeout_secs {
            client_options.server_selection_timeout = Some(Duration::from_secs(server_sel));
        }
    }
}
