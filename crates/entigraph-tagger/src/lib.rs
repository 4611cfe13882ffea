//! entigraph-tagger - Pluggable entity recognition
//!
//! Wraps the two tagging engine styles behind one call contract:
//! - Lexicon backend ("linguistic-pipeline" style): whole spans carrying
//!   closed-set labels, optionally enriched by an external linking service.
//! - Token-classifier backend ("token-classification" style): flat IOB
//!   token records that must be merged into spans.
//!
//! Backend selection happens at construction; callers hold a
//! `dyn RecognitionBackend` and never branch on the variant. The tagged
//! [`BackendOutput`] carries the variant information the reducer needs.

use async_trait::async_trait;
use entigraph_core::Result;

pub mod lexicon;
pub mod linking;
pub mod reduce;
pub mod token;

pub use lexicon::LexiconBackend;
pub use linking::{LinkingClient, LinkingError};
pub use reduce::reduce;
pub use token::TokenClassifierBackend;

/// One recognized span with its category label string.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedSpan {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
    /// Knowledge-base identifier from the linking service, when available
    pub kb_id: Option<String>,
}

/// One per-token classification record with an IOB-style sub-label
/// (e.g. `B-ORG` for a fragment beginning, `I-ORG` for a continuation).
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    pub token: String,
    pub tag: String,
    pub score: f32,
    /// Whitespace-token position in the tagged text
    pub index: usize,
}

/// Backend-native tagging result, tagged by variant.
#[derive(Debug, Clone)]
pub enum BackendOutput {
    /// Whole spans, labels already in the closed set
    Spans {
        spans: Vec<TaggedSpan>,
        /// Diagnostic note when linking enrichment was unavailable and
        /// the spans degraded to unlinked
        degraded: Option<String>,
    },
    /// Flat per-token records needing IOB merge
    Tokens(Vec<TokenRecord>),
}

/// Uniform call contract over the tagging engines.
///
/// A backend must be fully initialized (models loaded) before first use;
/// construction is where initialization failures surface.
#[async_trait]
pub trait RecognitionBackend: Send + Sync {
    /// Tag entities in normalized text.
    ///
    /// One atomic call: any internal blocking inference or linking I/O
    /// completes (or degrades) before this returns. No partial results.
    async fn tag_entities(&self, text: &str) -> Result<BackendOutput>;

    /// Backend name for logging
    fn name(&self) -> &str;

    /// Whether one instance may serve tagging calls from multiple
    /// coordinators at once. Not assumed; each variant opts in.
    fn supports_concurrent_tagging(&self) -> bool {
        false
    }
}
