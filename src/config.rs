use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::client::PYTHON_RUN_ROUTE;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Where and how to reach the MLDB server
#[derive(Clone, Debug, Validate, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the server, e.g. http://localhost:8080
    #[validate(custom(function = "validate_base_url"))]
    pub base_url: String,

    /// Route of the python plugin's run endpoint
    #[validate(custom(function = "validate_route"))]
    pub run_route: String,

    /// Request timeout in seconds (1-3600)
    #[validate(range(
        min = 1,
        max = 3600,
        message = "Timeout must be between 1 and 3600 seconds"
    ))]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            run_route: PYTHON_RUN_ROUTE.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            base_url: env::var("MLDB_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
            run_route: env::var("MLDB_RUN_ROUTE").unwrap_or_else(|_| PYTHON_RUN_ROUTE.to_string()),
            timeout_secs: parse_env_var("MLDB_TIMEOUT_SECS", "30")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file. Missing fields take their defaults.
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides on top of this configuration
    pub fn with_cli(mut self, cli: CliConfig) -> Result<Self, ConfigError> {
        if let Some(url) = cli.base_url {
            self.base_url = url;
        }
        if let Some(route) = cli.run_route {
            self.run_route = route;
        }
        if let Some(timeout) = cli.timeout_secs {
            self.timeout_secs = timeout;
        }

        self.validate()?;
        Ok(self)
    }
}

/// CLI configuration (parsed from command line arguments). Unset fields keep
/// the value from the environment or config file.
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub base_url: Option<String>,
    pub run_route: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn validate_base_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        let mut err = ValidationError::new("base_url");
        err.message = Some("Base URL must start with http:// or https://".into());
        Err(err)
    }
}

fn validate_route(route: &str) -> Result<(), ValidationError> {
    if route.starts_with('/') {
        Ok(())
    } else {
        let mut err = ValidationError::new("run_route");
        err.message = Some("Route must start with '/'".into());
        Err(err)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
