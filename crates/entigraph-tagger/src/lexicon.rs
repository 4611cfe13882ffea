//! Lexicon backend: regex patterns plus a phrase gazetteer.
//!
//! The "linguistic-pipeline" variant. Numeric categories come from regex
//! patterns, nominal categories from a gazetteer of known surface forms.
//! Overlapping candidates resolve longest-match, leftmost-first. When a
//! linking client is attached, recognized spans are enriched with
//! knowledge-base identifiers; a linking failure degrades the spans to
//! unlinked and never aborts tagging.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use regex::Regex;

use entigraph_core::{EngineError, EntityLabel, Result};

use crate::linking::LinkingClient;
use crate::{BackendOutput, RecognitionBackend, TaggedSpan};

/// Rule-based span tagger over patterns and a phrase gazetteer.
#[derive(Debug)]
pub struct LexiconBackend {
    /// Pattern rules in priority order (ties resolve to the earlier rule)
    patterns: Vec<(Regex, EntityLabel)>,
    /// Known surface forms, matched case-sensitively on word boundaries
    gazetteer: Vec<(String, EntityLabel)>,
    /// Optional enrichment client
    linker: Option<LinkingClient>,
}

impl LexiconBackend {
    /// Create a backend with the built-in patterns and gazetteer
    pub fn new() -> Self {
        let mut backend = Self {
            patterns: Vec::new(),
            gazetteer: Vec::new(),
            linker: None,
        };

        backend.init_patterns();
        backend.init_gazetteer();
        backend
    }

    /// Create a backend whose gazetteer is loaded from a JSON file
    /// (`{"surface form": "LABEL", ...}`), replacing the built-in one.
    ///
    /// An unreadable file or an entry with a label outside the closed set
    /// is fatal here, not at first call.
    pub fn from_gazetteer_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ModelInit(format!("gazetteer {}: {e}", path.display()))
        })?;
        let raw: std::collections::BTreeMap<String, String> = serde_json::from_str(&content)
            .map_err(|e| EngineError::ModelInit(format!("gazetteer {}: {e}", path.display())))?;

        let mut backend = Self::new();
        backend.gazetteer.clear();
        for (phrase, label) in &raw {
            let label: EntityLabel = label.parse().map_err(|_| {
                EngineError::ModelInit(format!(
                    "gazetteer {}: unknown label {label} for {phrase:?}",
                    path.display()
                ))
            })?;
            backend.add_phrase(phrase, label);
        }
        Ok(backend)
    }

    /// Attach an entity-linking enrichment client
    pub fn with_linker(mut self, linker: LinkingClient) -> Self {
        self.linker = Some(linker);
        self
    }

    /// Patterns for the numeric categories, most specific first.
    /// Text reaching the backend is already normalized, so currency and
    /// percent symbols are gone and only worded forms remain.
    fn init_patterns(&mut self) {
        self.add_pattern(
            r"\b(January|February|March|April|May|June|July|August|September|October|November|December)( \d{1,2})?\b",
            EntityLabel::Date,
        );
        self.add_pattern(r"\b(19|20)\d{2}\b", EntityLabel::Date);
        self.add_pattern(
            r"\b\d+ (dollars|euros|cents|USD|EUR)\b",
            EntityLabel::Money,
        );
        self.add_pattern(r"\b\d+ percent\b", EntityLabel::Percent);
        self.add_pattern(r"\b\d{1,2}(am|pm)\b", EntityLabel::Time);
        self.add_pattern(r"\b\d+ (seconds|minutes|hours)\b", EntityLabel::Time);
        self.add_pattern(
            r"\b\d+ (miles|kilometers|meters|feet|pounds|kilograms|tons)\b",
            EntityLabel::Quantity,
        );
        self.add_pattern(r"\b\d+(st|nd|rd|th)\b", EntityLabel::Ordinal);
        self.add_pattern(
            r"\b(first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth)\b",
            EntityLabel::Ordinal,
        );
        self.add_pattern(r"\b\d+\b", EntityLabel::Cardinal);
    }

    /// Built-in gazetteer of common surface forms
    fn init_gazetteer(&mut self) {
        // Organizations
        self.add_phrase("Apple", EntityLabel::Org);
        self.add_phrase("Google", EntityLabel::Org);
        self.add_phrase("Microsoft", EntityLabel::Org);
        self.add_phrase("Amazon", EntityLabel::Org);
        self.add_phrase("NASA", EntityLabel::Org);
        self.add_phrase("IBM", EntityLabel::Org);
        self.add_phrase("United Nations", EntityLabel::Org);
        self.add_phrase("Redwood Tech Solutions", EntityLabel::Org);

        // Geopolitical entities
        self.add_phrase("California", EntityLabel::Gpe);
        self.add_phrase("New York", EntityLabel::Gpe);
        self.add_phrase("New York City", EntityLabel::Gpe);
        self.add_phrase("San Francisco", EntityLabel::Gpe);
        self.add_phrase("Cupertino", EntityLabel::Gpe);
        self.add_phrase("London", EntityLabel::Gpe);
        self.add_phrase("Paris", EntityLabel::Gpe);
        self.add_phrase("Seoul", EntityLabel::Gpe);
        self.add_phrase("Germany", EntityLabel::Gpe);
        self.add_phrase("France", EntityLabel::Gpe);
        self.add_phrase("Japan", EntityLabel::Gpe);
        self.add_phrase("United States", EntityLabel::Gpe);

        // Persons
        self.add_phrase("Steve Jobs", EntityLabel::Person);
        self.add_phrase("Tim Cook", EntityLabel::Person);
        self.add_phrase("Marie Curie", EntityLabel::Person);
        self.add_phrase("Alan Turing", EntityLabel::Person);

        // Nationalities, languages
        self.add_phrase("American", EntityLabel::Norp);
        self.add_phrase("European", EntityLabel::Norp);
        self.add_phrase("Korean", EntityLabel::Norp);
        self.add_phrase("English", EntityLabel::Language);
        self.add_phrase("French", EntityLabel::Language);
        self.add_phrase("Spanish", EntityLabel::Language);

        // Locations, facilities
        self.add_phrase("Europe", EntityLabel::Loc);
        self.add_phrase("Asia", EntityLabel::Loc);
        self.add_phrase("Pacific Ocean", EntityLabel::Loc);
        self.add_phrase("Mount Everest", EntityLabel::Loc);
        self.add_phrase("Golden Gate Bridge", EntityLabel::Fac);
        self.add_phrase("Eiffel Tower", EntityLabel::Fac);

        // Events, works, laws, products
        self.add_phrase("World War II", EntityLabel::Event);
        self.add_phrase("Olympic Games", EntityLabel::Event);
        self.add_phrase("Mona Lisa", EntityLabel::WorkOfArt);
        self.add_phrase("Hamlet", EntityLabel::WorkOfArt);
        self.add_phrase("First Amendment", EntityLabel::Law);
        self.add_phrase("iPhone", EntityLabel::Product);
        self.add_phrase("Windows", EntityLabel::Product);
        self.add_phrase("Android", EntityLabel::Product);
    }

    /// Add a regex pattern; an invalid expression is skipped
    fn add_pattern(&mut self, pattern: &str, label: EntityLabel) {
        if let Ok(regex) = Regex::new(pattern) {
            self.patterns.push((regex, label));
        }
    }

    /// Add a gazetteer surface form
    fn add_phrase(&mut self, phrase: &str, label: EntityLabel) {
        self.gazetteer.push((phrase.to_string(), label));
    }

    /// Collect all candidate matches, then resolve overlaps keeping the
    /// longest span at each position (leftmost-first on ties).
    fn match_spans(&self, text: &str) -> Vec<TaggedSpan> {
        let mut candidates: Vec<(usize, usize, EntityLabel)> = Vec::new();

        for (phrase, label) in &self.gazetteer {
            for (start, m) in text.match_indices(phrase.as_str()) {
                let end = start + m.len();
                if on_word_boundary(text, start, end) {
                    candidates.push((start, end, *label));
                }
            }
        }

        for (regex, label) in &self.patterns {
            for m in regex.find_iter(text) {
                candidates.push((m.start(), m.end(), *label));
            }
        }

        // Stable sort: start ascending, span length descending. Ties keep
        // gazetteer-before-pattern and pattern priority order.
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut covered: HashSet<usize> = HashSet::new();
        let mut spans = Vec::new();
        for (start, end, label) in candidates {
            if (start..end).any(|i| covered.contains(&i)) {
                continue;
            }
            covered.extend(start..end);
            spans.push(TaggedSpan {
                text: text[start..end].to_string(),
                label: label.as_str().to_string(),
                start,
                end,
                kb_id: None,
            });
        }

        spans.sort_by_key(|s| s.start);
        spans
    }
}

impl Default for LexiconBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject matches embedded in a longer alphanumeric run ("Apples" must not
/// yield "Apple").
fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
    let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
    before_ok && after_ok
}

#[async_trait]
impl RecognitionBackend for LexiconBackend {
    async fn tag_entities(&self, text: &str) -> Result<BackendOutput> {
        let mut spans = self.match_spans(text);
        let mut degraded = None;

        if let Some(linker) = &self.linker {
            for span in &mut spans {
                match linker.link(&span.text).await {
                    Ok(kb_id) => span.kb_id = kb_id,
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            "entity linking unavailable, continuing with unlinked entities"
                        );
                        degraded = Some(format!("linking unavailable: {err}"));
                        break;
                    }
                }
            }
        }

        Ok(BackendOutput::Spans { spans, degraded })
    }

    fn name(&self) -> &str {
        "lexicon"
    }

    fn supports_concurrent_tagging(&self) -> bool {
        true
    }
}
