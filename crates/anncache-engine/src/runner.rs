//! The batch loop: sample uncached items, dispatch them, repeat until the
//! set is drained.
//!
//! The loop itself is single-threaded; only dispatch within one batch is
//! parallel, and one batch fully completes before the next fetch begins.
//! Several independent runs may chew on the same set concurrently; each
//! fetch reflects the progress all of them have made, because the store
//! only ever returns items that still lack a cached result.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{info, warn};

use anncache_common::Fingerprint;

use crate::backoff::BackoffPolicy;
use crate::dispatch::submit_batch;
use crate::error::RunError;
use crate::item::Item;
use crate::pipeline::AnalysisPipeline;
use crate::slot::ensure_slot;
use crate::store::{DocumentStore, SampledBatch};

/// Default number of items sampled per batch.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// What the run processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTarget {
    /// Every uncached member of this set.
    Set(i64),
    /// Exactly this item; sampling is skipped entirely.
    SingleItem(i64),
}

/// Run-wide configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Index holding the parent documents
    pub index: String,

    /// Parent document type
    pub parent_type: String,

    /// Field handed to the pipeline
    pub field: String,

    /// Set (or single item) to process
    pub target: RunTarget,

    /// Items sampled per batch
    pub batch_size: usize,

    /// Worker count for each batch
    pub concurrency: usize,

    /// Stop after the first batch instead of looping until drained
    pub no_repeat: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            index: "amcat".to_string(),
            parent_type: "article".to_string(),
            field: "text".to_string(),
            target: RunTarget::Set(0),
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: 1,
            no_repeat: false,
        }
    }
}

/// Totals accumulated over a run.
///
/// Informational only: per-item failures are logged as they happen and the
/// per-batch error maps are dropped once counted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub batches: u64,
    pub processed: u64,
    pub failed: u64,
}

/// One cache-population run.
pub struct CacheRun {
    store: Arc<dyn DocumentStore>,
    pipeline: Arc<dyn AnalysisPipeline>,
    fingerprint: Fingerprint,
    config: RunConfig,
    backoff: BackoffPolicy,
}

impl CacheRun {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        pipeline: Arc<dyn AnalysisPipeline>,
        fingerprint: Fingerprint,
        config: RunConfig,
    ) -> Self {
        Self {
            store,
            pipeline,
            fingerprint,
            config,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Replace the retry pacing used after transient sampling failures.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Register the cache slot, then loop batches until the set is drained
    /// (or after the first batch in single-item or no-repeat mode).
    ///
    /// Slot registration is the only fatal failure; everything after it
    /// either retries (sampling) or is isolated per item (pipeline).
    pub async fn run(&self) -> Result<RunStats, RunError> {
        ensure_slot(self.store.as_ref(), &self.fingerprint).await?;

        let mut stats = RunStats::default();
        loop {
            let batch = match self.config.target {
                RunTarget::SingleItem(id) => SampledBatch {
                    remaining: 1,
                    ids: vec![id],
                },
                RunTarget::Set(set_id) => self.fetch(set_id).await,
            };

            if batch.ids.is_empty() {
                info!("no uncached items left");
                break;
            }

            let items: Vec<Item> = batch
                .ids
                .iter()
                .map(|&id| {
                    Item::new(
                        &self.config.index,
                        &self.config.parent_type,
                        id,
                        &self.config.field,
                    )
                })
                .collect();

            info!(
                batch = items.len(),
                remaining = batch.remaining,
                "processing batch"
            );

            let submitted = items.len() as u64;
            let failures =
                submit_batch(items, Arc::clone(&self.pipeline), self.config.concurrency).await;

            stats.batches += 1;
            stats.failed += failures.len() as u64;
            stats.processed += submitted - failures.len() as u64;

            if matches!(self.config.target, RunTarget::SingleItem(_)) || self.config.no_repeat {
                break;
            }
        }

        info!(
            batches = stats.batches,
            processed = stats.processed,
            failed = stats.failed,
            "run complete"
        );
        Ok(stats)
    }

    /// Sample one batch, retrying transient failures forever.
    ///
    /// No state advances across a failed attempt: the same fetch is
    /// re-entered after the backoff delay until the store answers.
    async fn fetch(&self, set_id: i64) -> SampledBatch {
        let mut attempt = 0u32;
        loop {
            match self
                .store
                .sample_uncached(set_id, &self.fingerprint, self.config.batch_size)
                .await
            {
                Ok(batch) => return batch,
                Err(error) => {
                    attempt += 1;
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        %error,
                        attempt,
                        delay_secs = delay.as_secs(),
                        "sampling failed, retrying"
                    );
                    sleep(delay).await;
                },
            }
        }
    }
}
