//! Parsing helpers and retry plumbing

pub mod helper;
pub mod retry;

pub use retry::{retry_with_backoff, ExponentialBackoff, RetryPolicy};
