//! Core error type.
//!
//! Sub-crates define their own error enums and either wrap `CoreError` as a
//! variant (`#[from]`) or keep it separate.  Both patterns appear downstream;
//! prefer whichever keeps error sites clean.

use thiserror::Error;

/// Errors produced by `span-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Shorthand result type for `span-core`.
pub type CoreResult<T> = Result<T, CoreError>;
