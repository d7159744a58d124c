//! Transformation pipeline
//!
//! Sequences one job from raw image bytes to the transformed result:
//!
//! ```text
//! Building -> Submitting -> Downloading -> Done
//!                  |
//!                  +-- face not found --> Recovering -> ReSubmitting -> Downloading -> Done
//! ```
//!
//! Any other failure aborts the run and is returned unchanged. Recovery is
//! attempted at most once per run.

use std::fmt;

use log::{debug, info};

use crate::core::TransformService;
use crate::error::{Result, TransformError};
use crate::recovery::RecoveryFrame;
use crate::services::qq::{Capability, TransformOutput, TransformRequest};
use crate::signing::SignedPayload;
use crate::util::generate_run_id;

/// Stage of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Building,
    Submitting,
    Recovering,
    ReSubmitting,
    Downloading,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Building => "building",
            Stage::Submitting => "submitting",
            Stage::Recovering => "recovering",
            Stage::ReSubmitting => "re-submitting",
            Stage::Downloading => "downloading",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedImage {
    /// Downloaded image bytes
    pub bytes: Vec<u8>,

    /// Url the bytes were fetched from
    pub source_url: String,

    /// Whether the recovery frame had to be applied
    pub recovered: bool,
}

/// Orchestrates submission, recovery and download for a single image
pub struct Pipeline<S> {
    service: S,
    frame: RecoveryFrame,
}

impl<S: TransformService> Pipeline<S> {
    /// Create a pipeline using the built-in recovery marker
    pub fn new(service: S) -> Self {
        Self {
            service,
            frame: RecoveryFrame::builtin(),
        }
    }

    /// Replace the recovery frame
    pub fn with_recovery_frame(mut self, frame: RecoveryFrame) -> Self {
        self.frame = frame;
        self
    }

    /// Transform an image using a capability given by name
    ///
    /// An unknown name fails before any request is made.
    pub async fn run(&self, image: &[u8], mode: &str) -> Result<TransformedImage> {
        let capability = mode.parse::<Capability>()?;
        self.run_with_capability(image, capability).await
    }

    /// Transform an image
    pub async fn run_with_capability(&self, image: &[u8], capability: Capability) -> Result<TransformedImage> {
        let run_id = generate_run_id();
        enter(&run_id, Stage::Building);
        let request = TransformRequest::new(capability, image.to_vec());

        enter(&run_id, Stage::Submitting);
        let (output, recovered) = match self.submit(&request).await {
            Ok(output) => (output, false),
            Err(TransformError::FaceNotFound(_)) => {
                info!("Face not found. Trying face hack...");
                enter(&run_id, Stage::Recovering);
                let framed = self.recover(image).await?;

                enter(&run_id, Stage::ReSubmitting);
                let request = TransformRequest::new(capability, framed);
                (self.submit(&request).await?, true)
            }
            Err(err) => return Err(err),
        };

        enter(&run_id, Stage::Downloading);
        let source_url = output.result_url()?.to_string();
        let bytes = self.service.download(&source_url).await?;

        enter(&run_id, Stage::Done);
        Ok(TransformedImage {
            bytes,
            source_url,
            recovered,
        })
    }

    async fn submit(&self, request: &TransformRequest) -> Result<TransformOutput> {
        let payload = SignedPayload::from_request(request)?;
        self.service.upload(request.capability(), &payload).await
    }

    /// Frame the original bytes off the async executor
    async fn recover(&self, image: &[u8]) -> Result<Vec<u8>> {
        let frame = self.frame.clone();
        let image = image.to_vec();

        tokio::task::spawn_blocking(move || frame.apply(&image))
            .await
            .map_err(|e| TransformError::recovery(format!("Recovery task failed: {}", e)))?
    }
}

fn enter(run_id: &str, stage: Stage) {
    debug!("[{}] {}", run_id, stage);
}
