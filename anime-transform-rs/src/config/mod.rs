//! Configuration management for the transform client
//!
//! This module provides utilities for loading and validating the client
//! configuration, with support for environment variables.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use url::Url;

use crate::error::{Result, TransformError};
use crate::resilience::RetryPolicy;
use crate::services::qq::Capability;
use crate::util::parse_duration;

/// Default endpoint of the overseas processor
pub const DIFFERENT_DIMENSION_URL: &str =
    "https://ai.tu.qq.com/overseas/trpc.shadow_cv.ai_processor_cgi.AIProcessorCgi/Process";

/// Default endpoint of the mainland processor
pub const AI_PAINTING_URL: &str =
    "https://ai.tu.qq.com/trpc.shadow_cv.ai_processor_cgi.AIProcessorCgi/Process";

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value.parse::<i64>()
            .map_err(|e| TransformError::configuration(format!("Invalid integer for key {}: {}", key, e)))
    }

    /// Get a float configuration value
    fn get_float(&self, key: &str) -> Result<f64> {
        let value = self.get_string(key)?;
        value.parse::<f64>()
            .map_err(|e| TransformError::configuration(format!("Invalid float for key {}: {}", key, e)))
    }

    /// Get a duration configuration value ("500ms", "30s", "5m", or bare seconds)
    fn get_duration(&self, key: &str) -> Result<Duration> {
        let value = self.get_string(key)?;
        parse_duration(&value)
            .ok_or_else(|| TransformError::configuration(format!("Invalid duration for key {}: {}", key, value)))
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get an integer configuration value with a default
    ///
    /// A value that is present but unparsable is still an error.
    fn get_int_or(&self, key: &str, default: i64) -> Result<i64> {
        match self.get_string(key) {
            Ok(_) => self.get_int(key),
            Err(_) => Ok(default),
        }
    }

    /// Get a float configuration value with a default
    fn get_float_or(&self, key: &str, default: f64) -> Result<f64> {
        match self.get_string(key) {
            Ok(_) => self.get_float(key),
            Err(_) => Ok(default),
        }
    }

    /// Get a duration configuration value with a default
    fn get_duration_or(&self, key: &str, default: Duration) -> Result<Duration> {
        match self.get_string(key) {
            Ok(_) => self.get_duration(key),
            Err(_) => Ok(default),
        }
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Format a configuration key as an environment variable
    fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        // Uppercase and replace non-alphanumeric with underscores
        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key)
            .map_err(|e| {
                match e {
                    env::VarError::NotPresent => {
                        TransformError::configuration(format!("Environment variable not set: {}", env_key))
                    }
                    env::VarError::NotUnicode(_) => {
                        TransformError::configuration(format!("Environment variable is not valid unicode: {}", env_key))
                    }
                }
            })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    /// Configuration values
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| TransformError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// Global default configuration provider
pub static DEFAULT_PROVIDER: Lazy<Arc<EnvConfigProvider>> = Lazy::new(|| {
    Arc::new(EnvConfigProvider::new().with_prefix("ANIME_TRANSFORM"))
});

/// Trait for service-specific configuration
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;
}

/// Configuration of the transform client
#[derive(Debug, Clone, PartialEq)]
pub struct TransformConfig {
    /// Endpoint for `DIFFERENT_DIMENSION_ME`
    pub different_dimension_url: String,

    /// Endpoint for `AI_PAINTING_ANIME`
    pub ai_painting_url: String,

    /// Upload attempts, including the first
    pub upload_attempts: u32,

    /// Download attempts, including the first
    pub download_attempts: u32,

    /// Deadline of one upload attempt
    pub upload_timeout: Duration,

    /// Deadline of one download attempt
    pub download_timeout: Duration,

    /// Delay before the first retry
    pub retry_interval: Duration,

    /// Growth of the retry delay (1.0 keeps it constant)
    pub backoff_factor: f64,

    /// TCP connect timeout of the HTTP client
    pub connect_timeout: Duration,

    /// Custom recovery marker image; the built-in one is used when unset
    pub marker_path: Option<PathBuf>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            different_dimension_url: DIFFERENT_DIMENSION_URL.to_string(),
            ai_painting_url: AI_PAINTING_URL.to_string(),
            upload_attempts: 4,
            download_attempts: 11,
            upload_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(10),
            retry_interval: Duration::from_secs(1),
            backoff_factor: 1.0,
            connect_timeout: Duration::from_secs(10),
            marker_path: None,
        }
    }
}

impl TransformConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            different_dimension_url: provider
                .get_string_or("different_dimension_url", &defaults.different_dimension_url),
            ai_painting_url: provider.get_string_or("ai_painting_url", &defaults.ai_painting_url),
            upload_attempts: attempts(provider.get_int_or("upload_attempts", defaults.upload_attempts as i64)?, "upload_attempts")?,
            download_attempts: attempts(provider.get_int_or("download_attempts", defaults.download_attempts as i64)?, "download_attempts")?,
            upload_timeout: provider.get_duration_or("upload_timeout", defaults.upload_timeout)?,
            download_timeout: provider.get_duration_or("download_timeout", defaults.download_timeout)?,
            retry_interval: provider.get_duration_or("retry_interval", defaults.retry_interval)?,
            backoff_factor: provider.get_float_or("backoff_factor", defaults.backoff_factor)?,
            connect_timeout: provider.get_duration_or("connect_timeout", defaults.connect_timeout)?,
            marker_path: provider.get_string("marker_path").ok().map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&**DEFAULT_PROVIDER)
    }

    /// Endpoint serving a capability
    pub fn endpoint_for(&self, capability: Capability) -> &str {
        match capability {
            Capability::DifferentDimensionMe => &self.different_dimension_url,
            Capability::AiPaintingAnime => &self.ai_painting_url,
        }
    }

    /// Retry policy for uploads
    pub fn upload_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.upload_attempts,
            backoff_factor: self.backoff_factor,
            min_interval: self.retry_interval,
            per_attempt_timeout: self.upload_timeout,
            ..RetryPolicy::upload()
        }
    }

    /// Retry policy for downloads
    pub fn download_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.download_attempts,
            backoff_factor: self.backoff_factor,
            min_interval: self.retry_interval,
            per_attempt_timeout: self.download_timeout,
            ..RetryPolicy::download()
        }
    }
}

fn attempts(value: i64, key: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| TransformError::configuration(format!("Invalid attempt count for key {}: {}", key, value)))
}

fn validate_endpoint(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| TransformError::configuration(format!("Invalid {}: {}", name, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(TransformError::configuration(format!(
            "Invalid {}: unsupported scheme {}",
            name, other
        ))),
    }
}

impl ServiceConfig for TransformConfig {
    fn validate(&self) -> Result<()> {
        validate_endpoint("different_dimension_url", &self.different_dimension_url)?;
        validate_endpoint("ai_painting_url", &self.ai_painting_url)?;

        if self.upload_attempts == 0 || self.download_attempts == 0 {
            return Err(TransformError::configuration("Attempt counts must be at least 1"));
        }

        if !(self.backoff_factor >= 1.0) {
            return Err(TransformError::configuration("Backoff factor must be at least 1.0"));
        }

        if self.upload_timeout.is_zero() || self.download_timeout.is_zero() {
            return Err(TransformError::configuration("Timeouts must be non-zero"));
        }

        Ok(())
    }
}
