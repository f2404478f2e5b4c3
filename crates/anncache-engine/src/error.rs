//! Error types for the anncache engine.
//!
//! The taxonomy mirrors how each failure is handled:
//!
//! - [`QueryError`]: a sampling query failed. Always treated as transient;
//!   the runner retries the same fetch after a backoff delay, indefinitely.
//! - [`SlotError`]: registering the cache slot failed. Fatal before any
//!   batch starts, except the [`SlotError::AlreadyExists`] race which the
//!   registrar swallows as success.
//! - [`PipelineError`] / [`ProcessingError`]: one item failed its analysis
//!   call. Isolated per item, recorded, never retried within the run.
//! - [`RunError`]: the only way the run itself fails.

use thiserror::Error;

use crate::item::Item;

/// A sampling query against the document store failed.
///
/// Every variant is retried: a malformed response is as likely a symptom
/// of a recovering backend as a permanent fault, so nothing here is
/// escalated.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("document store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("document store returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("malformed search response: {0}")]
    Malformed(String),
}

/// Cache-slot registration failed.
#[derive(Error, Debug)]
pub enum SlotError {
    /// Another run registered the mapping between our check and create.
    /// The registrar treats this as success; it never escapes `ensure_slot`.
    #[error("child mapping {0} already exists")]
    AlreadyExists(String),

    #[error("document store unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mapping registration rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// One item's analysis call failed.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("analysis service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("analysis service returned {status}: {body}")]
    Failed { status: u16, body: String },

    /// Failure outside the HTTP transport, for pipeline implementations
    /// that are not service-backed.
    #[error("{0}")]
    Other(String),
}

/// Per-item failure recorded by the dispatch engine during one batch.
#[derive(Debug)]
pub struct ProcessingError {
    pub item: Item,
    pub cause: PipelineError,
}

impl std::fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.item, self.cause)
    }
}

/// Top-level failure of a cache run.
#[derive(Error, Debug)]
pub enum RunError {
    /// The slot could not be registered; no batch was started.
    #[error("cache slot registration failed: {0}")]
    Slot(#[from] SlotError),
}
