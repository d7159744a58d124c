//! # Anime Transform
//!
//! Client for the QQ AI image processor ("different dimension me" /
//! anime painting).
//!
//! This crate provides:
//!
//! - Request signing for the processor's `x-sign-value` header
//! - Classification of processor responses into typed failures
//! - Bounded retries with constant backoff for uploads and downloads
//! - A recovery frame that helps the processor find a face
//! - A pipeline tying these together for one image
//!
//! ## Architecture
//!
//! - `TransformService`: upload/download seam, implemented by `QqClient`
//! - `RetryExecutor`: retry loop driven by a `RetryPolicy`
//! - `RecoveryFrame`: marker-based re-framing of the source image
//! - `Pipeline`: build → submit → (recover → resubmit) → download
//! - `TransformError`: error system with an exhaustive `ErrorKind`

pub mod core;
pub use self::core::{ClientBuilder, TransformService};

pub mod services;
pub use services::qq::{Capability, QqClient, TransformOutput, TransformRequest};
pub use services::{ProxyKind, ProxySettings};

pub mod error;
pub use error::{ErrorKind, Result, TransformError};

pub mod resilience;
pub use resilience::{RetryExecutor, RetryPolicy};

pub mod config;
pub use config::{ConfigProvider, ServiceConfig, TransformConfig};

pub mod signing;
pub use signing::{sign, SignedPayload};

pub mod recovery;
pub use recovery::RecoveryFrame;

pub mod pipeline;
pub use pipeline::{Pipeline, Stage, TransformedImage};

mod util;

#[cfg(test)]
mod tests;
