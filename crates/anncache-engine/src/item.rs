//! Addressing of one parent document.

use serde::{Deserialize, Serialize};

/// One document eligible for processing.
///
/// Carries the id plus enough addressing information for the pipeline to
/// retrieve the content on its own; the engine never reads the document
/// body itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Parent document id
    pub id: i64,

    /// Index holding the document
    pub index: String,

    /// Parent document type
    pub doc_type: String,

    /// Field the pipeline reads, usually `text`
    pub field: String,
}

impl Item {
    pub fn new(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: i64,
        field: impl Into<String>,
    ) -> Self {
        Self {
            id,
            index: index.into(),
            doc_type: doc_type.into(),
            field: field.into(),
        }
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.index, self.doc_type, self.id)
    }
}
