//! anncache Common Library
//!
//! Shared foundation for the anncache workspace:
//!
//! - **Logging**: `tracing`-based logging configuration and initialization
//!   used by every anncache binary
//! - **Types**: the pipeline specification and the cache-slot fingerprint
//!   derived from it
//!
//! # Example
//!
//! ```
//! use anncache_common::{Fingerprint, PipelineSpec};
//!
//! let spec = PipelineSpec::new(vec!["tokenize".into(), "lemmatize".into()]).unwrap();
//! let fingerprint = Fingerprint::derive("article", &spec);
//! assert_eq!(fingerprint.as_str(), "article__tokenize__lemmatize");
//! ```

pub mod logging;
pub mod types;

// Re-export commonly used types
pub use types::{Fingerprint, PipelineSpec, PipelineSpecError};
