//! Configuration management for SurveyFlow
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SurveyflowError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// API base used outside production when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Main configuration structure for SurveyFlow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Deployment environment: "development" or "production"
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Session and token refresh settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Edge proxy settings
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Local store settings
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL. Required in production.
    #[serde(default)]
    pub url: Option<String>,

    /// Public base URL of the web app, used to build share links
    #[serde(default = "default_app_url")]
    pub app_url: String,
}

fn default_app_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            app_url: default_app_url(),
        }
    }
}

/// Session lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long before expiry the background refresh fires (seconds)
    #[serde(default = "default_refresh_lead")]
    pub refresh_lead_seconds: u64,

    /// Access token lifetime assumed when the backend omits `expires_in`
    #[serde(default = "default_expires_in")]
    pub default_expires_in_seconds: u64,

    /// Timeout for individual backend calls (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_refresh_lead() -> u64 {
    60
}

fn default_expires_in() -> u64 {
    900
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_lead_seconds: default_refresh_lead(),
            default_expires_in_seconds: default_expires_in(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Edge proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Socket address the proxy listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Upstream timeout; exceeding it yields 504 GATEWAY_TIMEOUT
    #[serde(default = "default_proxy_timeout")]
    pub timeout_seconds: u64,

    /// Name of the httponly refresh cookie checked by the route guard
    #[serde(default = "default_refresh_cookie")]
    pub refresh_cookie: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_proxy_timeout() -> u64 {
    30
}

fn default_refresh_cookie() -> String {
    "refresh_token".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            timeout_seconds: default_proxy_timeout(),
            refresh_cookie: default_refresh_cookie(),
        }
    }
}

/// Local store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the local store. Defaults to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            environment: default_environment(),
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            proxy: ProxyConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SurveyflowError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SurveyflowError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(environment) = std::env::var("SURVEYFLOW_ENVIRONMENT") {
            self.environment = environment;
        }

        // `API_URL` is the name the proxy deployment has always used;
        // the prefixed variable wins when both are present.
        if let Ok(url) = std::env::var("API_URL") {
            self.api.url = Some(url);
        }
        if let Ok(url) = std::env::var("SURVEYFLOW_API_URL") {
            self.api.url = Some(url);
        }

        if let Ok(app_url) = std::env::var("SURVEYFLOW_APP_URL") {
            self.api.app_url = app_url;
        }

        if let Ok(addr) = std::env::var("SURVEYFLOW_LISTEN_ADDR") {
            self.proxy.listen_addr = addr;
        }

        if let Ok(timeout) = std::env::var("SURVEYFLOW_PROXY_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(v) => {
                    self.proxy.timeout_seconds = v;
                    tracing::debug!(timeout_seconds = v, "Env override: SURVEYFLOW_PROXY_TIMEOUT");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for SURVEYFLOW_PROXY_TIMEOUT: {}", timeout);
                }
            }
        }

        if let Ok(dir) = std::env::var("SURVEYFLOW_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(url) = &cli.api_url {
            self.api.url = Some(url.clone());
        }
    }

    /// Whether this configuration targets a production deployment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Backend base URL with any trailing slash removed
    ///
    /// Falls back to [`DEFAULT_API_URL`] when none is configured. Call
    /// [`validate`](Self::validate) first to reject that in production.
    pub fn api_base_url(&self) -> String {
        self.api
            .url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let valid_environments = ["development", "production", "test"];
        if !valid_environments.contains(&self.environment.to_ascii_lowercase().as_str()) {
            return Err(SurveyflowError::Config(format!(
                "Invalid environment: {}. Must be one of: {}",
                self.environment,
                valid_environments.join(", ")
            ))
            .into());
        }

        match &self.api.url {
            None if self.is_production() => {
                return Err(SurveyflowError::Config(
                    "api.url must be set in production (SURVEYFLOW_API_URL or API_URL)".to_string(),
                )
                .into());
            }
            Some(url) => {
                url::Url::parse(url).map_err(|e| {
                    SurveyflowError::Config(format!("Invalid api.url '{}': {}", url, e))
                })?;
            }
            None => {}
        }

        if self.session.request_timeout_seconds == 0 {
            return Err(SurveyflowError::Config(
                "session.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.proxy.timeout_seconds == 0 {
            return Err(SurveyflowError::Config(
                "proxy.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.proxy.refresh_cookie.is_empty() {
            return Err(SurveyflowError::Config(
                "proxy.refresh_cookie cannot be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
