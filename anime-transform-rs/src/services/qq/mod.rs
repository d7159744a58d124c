//! QQ AI processor client implementation
//!
//! Uploads go to one of two fixed endpoints depending on the requested
//! capability; downloads fetch the rendered result from the returned urls.
//! Both run under their own retry policy.

mod models;
pub use models::*;

use log::{debug, info};
use reqwest::{header, Client};
use async_trait::async_trait;

use crate::config::TransformConfig;
use crate::core::{ClientBuilder, TransformService};
use crate::error::mapping::classify_response;
use crate::error::{Result, TransformError};
use crate::resilience::RetryExecutor;
use crate::services::common::ensure_success;
use crate::services::ProxySettings;
use crate::signing::SignedPayload;
use crate::util::measure_time_async;

/// QQ AI processor client
pub struct QqClient {
    /// HTTP client
    http_client: Client,

    /// Configuration
    config: TransformConfig,

    /// Retry executor for uploads
    upload_retry: RetryExecutor,

    /// Retry executor for downloads
    download_retry: RetryExecutor,
}

impl QqClient {
    /// Create a new client
    pub fn new(config: TransformConfig, proxy: Option<ProxySettings>) -> Result<Self> {
        let http_client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .header("Origin", ORIGIN)
            .header("Referer", REFERER)
            .connect_timeout(config.connect_timeout)
            .proxy(proxy)
            .build_http_client()?;

        Ok(Self {
            http_client,
            upload_retry: RetryExecutor::new(config.upload_policy()),
            download_retry: RetryExecutor::new(config.download_policy()),
            config,
        })
    }

    /// One POST of a signed payload, classified
    async fn upload_once(&self, endpoint: &str, payload: &SignedPayload) -> Result<TransformOutput> {
        debug!(
            "Sending request to QQ: POST {} ({} bytes, sign {})",
            endpoint,
            payload.body.len(),
            payload.signature
        );

        let response = self.http_client
            .post(endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-sign-value", payload.signature.as_str())
            .header("x-sign-version", payload.signature_version)
            .body(payload.body.clone())
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        classify_response(&ServiceResponse::from_text(status, &text))
    }

    /// One GET of an output url
    async fn download_once(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading result: GET {}", url);

        let response = self.http_client.get(url).send().await?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;

        if bytes.is_empty() {
            return Err(TransformError::no_data());
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl TransformService for QqClient {
    async fn upload(&self, capability: Capability, payload: &SignedPayload) -> Result<TransformOutput> {
        let endpoint = self.config.endpoint_for(capability);

        let (result, elapsed) = measure_time_async(|| {
            self.upload_retry.execute("QQ file upload", || self.upload_once(endpoint, payload))
        }).await;

        if result.is_ok() {
            info!("QQ accepted {} request in {:.2}s", capability, elapsed.as_secs_f64());
        }
        result
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.download_retry
            .execute("QQ file download", || self.download_once(url))
            .await
            .map_err(|e| match e {
                TransformError::ExhaustedRetries { attempts, message } => TransformError::ExhaustedRetries {
                    attempts,
                    message: format!("Unable to download media: {}", message),
                },
                other => other,
            })
    }
}
