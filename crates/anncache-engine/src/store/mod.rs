//! Document store access.
//!
//! [`DocumentStore`] is the seam between the engine and the index backend.
//! The production implementation is [`EsStore`], which speaks the store's
//! REST API over HTTP; tests substitute scripted implementations.

use async_trait::async_trait;

use anncache_common::Fingerprint;

use crate::error::{QueryError, SlotError};

mod es;

pub use es::{EsStore, DEFAULT_HTTP_TIMEOUT_SECS};

/// Result of one sampling query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledBatch {
    /// Store-reported total count of items still matching the uncached
    /// filter. Informational only; termination is driven by `ids` being
    /// empty, never by this number.
    pub remaining: u64,

    /// Up to `size` sampled parent ids, in no particular order.
    pub ids: Vec<i64>,
}

/// Operations the engine needs from the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Sample up to `size` members of `set_id` that have no child record of
    /// the fingerprint type.
    ///
    /// Repeated calls surface different members of the uncached pool (the
    /// store randomizes scoring), so parallel runs do not all chew on the
    /// same prefix. An empty id list is a successful "nothing left", not an
    /// error.
    async fn sample_uncached(
        &self,
        set_id: i64,
        fingerprint: &Fingerprint,
        size: usize,
    ) -> Result<SampledBatch, QueryError>;

    /// Whether the child mapping for `fingerprint` is registered.
    async fn child_mapping_exists(&self, fingerprint: &Fingerprint) -> Result<bool, SlotError>;

    /// Register the child mapping for `fingerprint` under the parent type.
    ///
    /// Returns [`SlotError::AlreadyExists`] when the store reports the
    /// mapping was registered concurrently.
    async fn put_child_mapping(&self, fingerprint: &Fingerprint) -> Result<(), SlotError>;
}
