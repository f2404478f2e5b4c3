//! Pipeline specification and cache-slot fingerprint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a [`PipelineSpec`]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PipelineSpecError {
    #[error("a pipeline requires at least one module")]
    Empty,
}

/// An ordered sequence of analysis module identifiers.
///
/// Order is significant: running `tokenize` before `lemmatize` is a
/// different pipeline than the reverse, and the two cache their results
/// under different fingerprints. A `PipelineSpec` never changes once a
/// run starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineSpec {
    modules: Vec<String>,
}

impl PipelineSpec {
    /// Create a spec from an ordered module list.
    ///
    /// Rejects an empty list: a pipeline with no modules has no output to
    /// cache.
    pub fn new(modules: Vec<String>) -> Result<Self, PipelineSpecError> {
        if modules.is_empty() {
            return Err(PipelineSpecError::Empty);
        }
        Ok(Self { modules })
    }

    /// The module identifiers, in execution order.
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Number of modules in the pipeline.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Display for PipelineSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.modules.join(","))
    }
}

/// Deterministic identifier of a pipeline, used as the child-record type
/// name and as the cache-slot key in the document store.
///
/// Derived by joining the parent type name and the module identifiers with
/// `__`, preserving module order. Two specs with the same modules in a
/// different order therefore produce different fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derive the fingerprint for `spec` under the given parent type.
    pub fn derive(parent_type: &str, spec: &PipelineSpec) -> Self {
        let mut parts = Vec::with_capacity(spec.len() + 1);
        parts.push(parent_type);
        parts.extend(spec.modules().iter().map(String::as_str));
        Fingerprint(parts.join("__"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
