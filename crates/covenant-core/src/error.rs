//! # Core Error Types
//!
//! Errors for the foundational types. Domain crates define their own
//! error enums; this one covers only what `covenant-core` itself can
//! reject. All errors use `thiserror` for derive-based `Display` and
//! `Error` implementations.

use thiserror::Error;

/// Errors raised by the foundational types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timestamp construction or parsing failed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
