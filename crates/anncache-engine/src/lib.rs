//! anncache Engine
//!
//! The work-distribution core behind the `anncache` tool. Given a set of
//! parent documents in a document store and an ordered analysis pipeline,
//! the engine repeatedly samples set members that lack a cached result for
//! the pipeline's fingerprint, dispatches them to a bounded pool of
//! concurrent workers, and lets successful pipeline runs become cached
//! child records. The store alone decides what counts as "already cached":
//! an item is uncached exactly while it has no child record of the
//! fingerprint type.
//!
//! # Components
//!
//! - [`store`]: the [`store::DocumentStore`] trait and its HTTP
//!   implementation [`store::EsStore`]: randomized sampling of uncached
//!   items and child-mapping management
//! - [`slot`]: idempotent registration of the cache slot's child mapping
//! - [`dispatch`]: the bounded worker pool with per-item failure isolation
//! - [`pipeline`]: the [`pipeline::AnalysisPipeline`] seam and its HTTP
//!   client
//! - [`backoff`]: retry pacing for transient sampling failures
//! - [`runner`]: the batch loop tying it all together
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use anncache_common::{Fingerprint, PipelineSpec};
//! use anncache_engine::pipeline::HttpPipeline;
//! use anncache_engine::runner::{CacheRun, RunConfig, RunTarget};
//! use anncache_engine::store::EsStore;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let spec = PipelineSpec::new(vec!["tokenize".into(), "lemmatize".into()])?;
//! let fingerprint = Fingerprint::derive("article", &spec);
//!
//! let store = Arc::new(EsStore::new("http://localhost:9200", "amcat", "article")?);
//! let pipeline = Arc::new(HttpPipeline::new("http://localhost:5000", spec)?);
//!
//! let config = RunConfig {
//!     target: RunTarget::Set(42),
//!     ..RunConfig::default()
//! };
//! let stats = CacheRun::new(store, pipeline, fingerprint, config).run().await?;
//! println!("{} processed, {} failed", stats.processed, stats.failed);
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod dispatch;
pub mod error;
pub mod item;
pub mod pipeline;
pub mod runner;
pub mod slot;
pub mod store;

// Re-export commonly used types
pub use backoff::BackoffPolicy;
pub use error::{PipelineError, ProcessingError, QueryError, RunError, SlotError};
pub use item::Item;
pub use runner::{CacheRun, RunConfig, RunStats, RunTarget};
pub use store::{DocumentStore, SampledBatch};
