//! Resilience patterns for processor calls
//!
//! Uploads and downloads run through a `RetryExecutor` configured with their
//! own `RetryPolicy`. Transient failures are absorbed up to the attempt
//! budget; terminal failures are handed back on the spot.

mod retry;

pub use retry::{RetryExecutor, RetryPolicy};
