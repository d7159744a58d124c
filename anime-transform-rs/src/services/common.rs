//! Common utilities for service clients
//!
//! This module provides proxy selection and HTTP response helpers.

use std::fmt;

use log::debug;
use url::Url;

use crate::error::{Result, TransformError};
use crate::util::truncate_string;

/// Longest response excerpt carried in a status error
const ERROR_BODY_EXCERPT: usize = 200;

/// Kind of outbound proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    /// SOCKS5 proxy, selected by a `socks5` url prefix
    Socks,
    /// HTTP or HTTPS proxy
    Http,
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Socks => write!(f, "SOCKS"),
            Self::Http => write!(f, "HTTP"),
        }
    }
}

/// Proxy through which all processor traffic is routed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    url: String,
    kind: ProxyKind,
}

impl ProxySettings {
    /// Parse a proxy url such as `http://user:password@ip:port`
    pub fn parse(proxy: &str) -> Result<Self> {
        let proxy = proxy.trim();
        Url::parse(proxy)
            .map_err(|e| TransformError::configuration(format!("Invalid proxy url {}: {}", proxy, e)))?;

        let kind = if proxy.starts_with("socks5") {
            ProxyKind::Socks
        } else {
            ProxyKind::Http
        };

        Ok(Self {
            url: proxy.to_string(),
            kind,
        })
    }

    /// Proxy url as given
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Selected proxy kind
    pub fn kind(&self) -> ProxyKind {
        self.kind
    }

    /// Convert into a reqwest proxy covering all schemes
    pub(crate) fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        debug!("Routing traffic through {} proxy", self.kind);
        reqwest::Proxy::all(self.url.as_str())
            .map_err(|e| TransformError::configuration(format!("Invalid {} proxy: {}", self.kind, e)))
    }
}

/// Turn a non-success HTTP status into a transport error
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("Failed to read error response: {}", e),
    };

    Err(TransformError::network(format!(
        "Request failed with status code {}: {}",
        status.as_u16(),
        truncate_string(&body, ERROR_BODY_EXCERPT)
    )))
}
