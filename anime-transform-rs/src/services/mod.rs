//! Service-specific client implementations
//!
//! This module contains the client for the QQ AI image processor.

pub mod qq;
mod common;

pub use common::{ProxyKind, ProxySettings};
