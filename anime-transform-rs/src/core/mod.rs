//! Core abstractions for the transform client
//!
//! - `TransformService`: submits signed payloads and fetches results
//! - `ClientBuilder`: builder for the underlying HTTP client

pub mod builder;
pub use builder::ClientBuilder;

use async_trait::async_trait;

use crate::error::Result;
use crate::services::qq::{Capability, TransformOutput};
use crate::signing::SignedPayload;

/// Remote image processor as seen by the pipeline
///
/// Implementations apply their own retry policies; a returned error is
/// final for that call.
#[async_trait]
pub trait TransformService: Send + Sync {
    /// Submit a signed payload to the endpoint serving `capability`
    async fn upload(&self, capability: Capability, payload: &SignedPayload) -> Result<TransformOutput>;

    /// Fetch the bytes behind an output url
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}
