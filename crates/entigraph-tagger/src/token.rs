//! Token-classifier backend: per-token IOB records.
//!
//! The "token-classification" variant. A phrase model maps surface forms
//! to categories; tagging emits one record per matched whitespace token
//! with `B-`/`I-` sub-labels, leaving span merge to the reducer. The model
//! artifact loads at construction; a missing or malformed artifact is a
//! fatal construction error, never deferred to the first call.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use entigraph_core::{EngineError, EntityLabel, Result};

use crate::{BackendOutput, RecognitionBackend, TokenRecord};

/// On-disk model format
#[derive(Debug, Deserialize)]
struct TokenModel {
    phrases: BTreeMap<String, String>,
}

/// Dictionary-backed token classifier emitting IOB-tagged records.
#[derive(Debug)]
pub struct TokenClassifierBackend {
    /// Tokenized phrases with their category, longest first
    entries: Vec<(Vec<String>, EntityLabel)>,
}

impl TokenClassifierBackend {
    /// Load the embedded default model
    pub fn new() -> Result<Self> {
        Self::from_json(include_str!("models/token_model.json"), "builtin")
    }

    /// Load a model artifact from disk
    pub fn from_model_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ModelInit(format!("token model {}: {e}", path.display()))
        })?;
        Self::from_json(&content, &path.display().to_string())
    }

    fn from_json(content: &str, origin: &str) -> Result<Self> {
        let model: TokenModel = serde_json::from_str(content)
            .map_err(|e| EngineError::ModelInit(format!("token model {origin}: {e}")))?;

        let mut entries = Vec::with_capacity(model.phrases.len());
        for (phrase, label) in &model.phrases {
            let label: EntityLabel = label.parse().map_err(|_| {
                EngineError::ModelInit(format!(
                    "token model {origin}: unknown label {label} for {phrase:?}"
                ))
            })?;
            let tokens: Vec<String> = phrase.split_whitespace().map(str::to_string).collect();
            if !tokens.is_empty() {
                entries.push((tokens, label));
            }
        }

        // Longest phrase first so greedy matching prefers whole spans
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Ok(Self { entries })
    }

    fn classify(&self, text: &str) -> Vec<TokenRecord> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut records = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            let matched = self.entries.iter().find(|(phrase, _)| {
                phrase.len() <= tokens.len() - i
                    && phrase
                        .iter()
                        .zip(&tokens[i..])
                        .all(|(p, t)| p.as_str() == *t)
            });

            match matched {
                Some((phrase, label)) => {
                    for (offset, token) in tokens[i..i + phrase.len()].iter().enumerate() {
                        let marker = if offset == 0 { "B" } else { "I" };
                        records.push(TokenRecord {
                            token: (*token).to_string(),
                            tag: format!("{marker}-{label}"),
                            score: if offset == 0 { 0.99 } else { 0.97 },
                            index: i + offset,
                        });
                    }
                    i += phrase.len();
                }
                None => i += 1,
            }
        }

        records
    }
}

#[async_trait]
impl RecognitionBackend for TokenClassifierBackend {
    async fn tag_entities(&self, text: &str) -> Result<BackendOutput> {
        Ok(BackendOutput::Tokens(self.classify(text)))
    }

    fn name(&self) -> &str {
        "token-classifier"
    }

    fn supports_concurrent_tagging(&self) -> bool {
        true
    }
}
