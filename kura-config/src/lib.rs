//! Configuration management for Kura
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_API_VERSION: &str = "2022-08-01";
pub const DEFAULT_BACKUP_ROOT: &str = "backup";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Prefix of environment variables read by `KuraConfig::from_env`
pub const ENV_PREFIX: &str = "KURA";

/// Name of the optional configuration file in the working directory
pub const CONFIG_FILE_STEM: &str = "kura";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Console,
    Json,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KuraConfig {
    /// Azure Resource Manager endpoint
    pub arm_endpoint: String,
    /// API Management REST API version
    pub api_version: String,
    /// Root directory of the default backup layout
    pub backup_root: PathBuf,
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Bearer token to use instead of asking the Azure CLI
    #[serde(default)]
    pub access_token: Option<String>,
}

impl KuraConfig {
    /// Load configuration from defaults, `kura.toml` and `KURA_*` variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let source = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE_STEM).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX));
        Self::build(source)
    }

    /// Load configuration from defaults and the given file only
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let source = config::Config::builder().add_source(config::File::with_name(path));
        Self::build(source)
    }

    fn build(
        source: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: KuraConfig = source
            .set_default("arm_endpoint", DEFAULT_ARM_ENDPOINT)?
            .set_default("api_version", DEFAULT_API_VERSION)?
            .set_default("backup_root", DEFAULT_BACKUP_ROOT)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.arm_endpoint.starts_with("http://") && !self.arm_endpoint.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "arm_endpoint must be an http(s) URL, got '{}'",
                self.arm_endpoint
            )));
        }
        if self.api_version.trim().is_empty() {
            return Err(ConfigError::Invalid("api_version must not be empty".to_string()));
        }
        Ok(())
    }

    /// Endpoint without a trailing slash
    pub fn arm_endpoint(&self) -> &str {
        self.arm_endpoint.trim_end_matches('/')
    }

    /// Get log level, defaulting to "warn"
    pub fn log_level(&self) -> &str {
        if self.log_level.is_empty() {
            DEFAULT_LOG_LEVEL
        } else {
            &self.log_level
        }
    }

    /// Configured access token, ignoring blank values
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.trim().is_empty())
    }
}
