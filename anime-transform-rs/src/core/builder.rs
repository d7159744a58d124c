//! Client builder implementation
//!
//! Provides a builder for the HTTP client shared by uploads and downloads.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client as ReqwestClient;

use crate::error::{Result, TransformError};
use crate::services::ProxySettings;

/// Builder for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    /// Headers to include with all requests
    custom_headers: HashMap<String, String>,

    /// TCP connect timeout
    connect_timeout: Option<Duration>,

    /// User agent
    user_agent: Option<String>,

    /// Outbound proxy
    proxy: Option<ProxySettings>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            custom_headers: HashMap::new(),
            connect_timeout: Some(Duration::from_secs(10)),
            user_agent: None,
            proxy: None,
        }
    }
}

impl ClientBuilder {
    /// Create a new client builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header sent with every request
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(key.into(), value.into());
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Route all traffic through a proxy
    pub fn proxy(mut self, proxy: Option<ProxySettings>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Build an HTTP client with the configured settings
    pub fn build_http_client(&self) -> Result<ReqwestClient> {
        let mut builder = ReqwestClient::builder();

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        if let Some(ref user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let mut headers = HeaderMap::new();
        for (key, value) in &self.custom_headers {
            let header_name = HeaderName::from_str(key)
                .map_err(|e| TransformError::configuration(format!("Invalid header name: {}", e)))?;

            let header_value = HeaderValue::from_str(value)
                .map_err(|e| TransformError::configuration(format!("Invalid header value: {}", e)))?;

            headers.insert(header_name, header_value);
        }
        builder = builder.default_headers(headers);

        if let Some(ref proxy) = self.proxy {
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        builder.build()
            .map_err(|e| TransformError::configuration(format!("Failed to build HTTP client: {}", e)))
    }
}
