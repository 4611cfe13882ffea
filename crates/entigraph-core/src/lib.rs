//! entigraph-core - Domain models, errors, and configuration
//!
//! This crate defines the abstractions shared across the pipeline:
//! - The closed entity-category enumeration and rendering palette
//! - The uniform `Entity` value and `Document` lifecycle
//! - The error taxonomy for pipeline runs
//! - Configuration management

pub mod config;
pub mod label;

pub use config::{
    AppConfig, BackendConfig, BackendKind, ConfigError, LinkingConfig, LoggingConfig,
    RenderOptions,
};
pub use label::{EntityLabel, ALL_LABELS};

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by the extraction pipeline.
///
/// Enrichment/linking degradation is deliberately absent: a failed linking
/// call never aborts a run, it only downgrades spans to unlinked.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("input is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    #[error("model initialization failed: {0}")]
    ModelInit(String),

    #[error("unknown entity label: {0}")]
    UnknownLabel(String),

    #[error("no document loaded")]
    NoDocument,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

// ============================================================================
// Entities
// ============================================================================

/// Uniform (text, label) pair produced by reduction.
///
/// The label is kept as the string the backend produced; validity against
/// the closed [`EntityLabel`] set is enforced where it matters (reduction
/// for span backends, and unconditionally at graph assembly). Serializes as
/// a two-field JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
}

impl Entity {
    /// Create a new entity
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }

    /// Resolve the label against the closed enumeration.
    pub fn category(&self) -> Result<EntityLabel> {
        self.label.parse()
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.text, self.label)
    }
}

/// Ordered entity sequence, document order of first appearance.
/// Duplicate mentions are preserved here; deduplication happens in the graph.
pub type EntityList = Vec<Entity>;

// ============================================================================
// Documents
// ============================================================================

/// A document moving through the pipeline.
///
/// Created whole on load and replaced wholesale on each new invocation;
/// there is no incremental mutation of the raw text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    raw: String,
    normalized: Option<String>,
}

impl Document {
    /// Create a document from already-decoded text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            raw: text.into(),
            normalized: None,
        }
    }

    /// Create a document from raw bytes, decoding as UTF-8.
    ///
    /// Malformed byte sequences are a hard error; nothing is committed.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self::new(String::from_utf8(bytes)?))
    }

    /// Read a file whole into memory and decode it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// The raw text as loaded
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalized text, if normalization has run
    pub fn normalized(&self) -> Option<&str> {
        self.normalized.as_deref()
    }

    /// Record the normalization result
    pub fn set_normalized(&mut self, text: String) {
        self.normalized = Some(text);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_serializes_as_two_fields() {
        let entity = Entity::new("Apple", "ORG");
        let value = serde_json::to_value(&entity).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["text"], "Apple");
        assert_eq!(object["label"], "ORG");
    }

    #[test]
    fn test_entity_category_resolution() {
        assert_eq!(
            Entity::new("Apple", "ORG").category().unwrap(),
            EntityLabel::Org
        );
        assert!(matches!(
            Entity::new("Apple", "BOGUS").category(),
            Err(EngineError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_document_from_bytes() {
        let doc = Document::from_bytes(b"hello world".to_vec()).unwrap();
        assert_eq!(doc.raw(), "hello world");
        assert!(doc.normalized().is_none());
    }

    #[test]
    fn test_document_rejects_invalid_utf8() {
        let err = Document::from_bytes(vec![0xff, 0xfe, 0x41]).unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[test]
    fn test_document_normalization_lifecycle() {
        let mut doc = Document::new("The raw text");
        doc.set_normalized("raw text".to_string());
        assert_eq!(doc.normalized(), Some("raw text"));
        assert_eq!(doc.raw(), "The raw text");
    }
}
