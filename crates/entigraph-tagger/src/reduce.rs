//! Reduction of backend-native output to the uniform entity sequence.
//!
//! One reduction path per backend variant, selected by the tagged
//! [`BackendOutput`]. Output order is always document order of the first
//! token or span; duplicate mentions are preserved (the graph deduplicates
//! later).

use entigraph_core::{Entity, EntityLabel, EntityList, Result};

use crate::{BackendOutput, TokenRecord};

/// Reduce backend output to the uniform ordered entity list.
pub fn reduce(output: BackendOutput) -> Result<EntityList> {
    match output {
        BackendOutput::Spans { spans, .. } => spans
            .into_iter()
            .map(|span| {
                // Span backends promise closed-set labels; hold them to it.
                span.label.parse::<EntityLabel>()?;
                Ok(Entity::new(span.text, span.label))
            })
            .collect(),
        BackendOutput::Tokens(records) => Ok(merge_fragments(&records)),
    }
}

/// Merge contiguous same-tag token fragments into whole entities.
///
/// A continuation fragment whose predecessor is not an in-progress entity
/// of the same base tag starts a new entity instead of erroring.
fn merge_fragments(records: &[TokenRecord]) -> EntityList {
    let mut entities = Vec::new();
    let mut current: Option<(String, String, usize)> = None; // (base tag, text, last index)

    for record in records {
        let (marker, base) = split_tag(&record.tag);
        let continues = marker == "I"
            && matches!(&current, Some((tag, _, last)) if tag == base && record.index == last + 1);

        if continues {
            if let Some((_, text, last)) = current.as_mut() {
                text.push(' ');
                text.push_str(&record.token);
                *last = record.index;
            }
        } else {
            if let Some((tag, text, _)) = current.take() {
                entities.push(Entity::new(text, tag));
            }
            current = Some((base.to_string(), record.token.clone(), record.index));
        }
    }

    if let Some((tag, text, _)) = current {
        entities.push(Entity::new(text, tag));
    }

    entities
}

/// Split `B-ORG` into `("B", "ORG")`; a tag with no marker counts as a
/// fragment beginning.
fn split_tag(tag: &str) -> (&str, &str) {
    match tag.split_once('-') {
        Some((marker, base)) => (marker, base),
        None => ("B", tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaggedSpan;
    use entigraph_core::EngineError;

    fn span(text: &str, label: &str, start: usize) -> TaggedSpan {
        TaggedSpan {
            text: text.to_string(),
            label: label.to_string(),
            start,
            end: start + text.len(),
            kb_id: None,
        }
    }

    fn record(token: &str, tag: &str, index: usize) -> TokenRecord {
        TokenRecord {
            token: token.to_string(),
            tag: tag.to_string(),
            score: 0.9,
            index,
        }
    }

    #[test]
    fn test_spans_project_in_document_order() {
        let output = BackendOutput::Spans {
            spans: vec![span("Apple", "ORG", 0), span("California", "GPE", 6)],
            degraded: None,
        };
        let entities = reduce(output).unwrap();
        assert_eq!(
            entities,
            vec![Entity::new("Apple", "ORG"), Entity::new("California", "GPE")]
        );
    }

    #[test]
    fn test_span_with_unknown_label_is_rejected() {
        let output = BackendOutput::Spans {
            spans: vec![span("Apple", "BOGUS", 0)],
            degraded: None,
        };
        let err = reduce(output).unwrap_err();
        assert!(matches!(err, EngineError::UnknownLabel(ref s) if s == "BOGUS"));
    }

    #[test]
    fn test_duplicate_mentions_preserved() {
        let output = BackendOutput::Spans {
            spans: vec![span("Apple", "ORG", 0), span("Apple", "ORG", 20)],
            degraded: None,
        };
        assert_eq!(reduce(output).unwrap().len(), 2);
    }

    #[test]
    fn test_iob_fragments_merge() {
        let output = BackendOutput::Tokens(vec![
            record("Steve", "B-PERSON", 0),
            record("Jobs", "I-PERSON", 1),
            record("Apple", "B-ORG", 3),
        ]);
        let entities = reduce(output).unwrap();
        assert_eq!(
            entities,
            vec![
                Entity::new("Steve Jobs", "PERSON"),
                Entity::new("Apple", "ORG"),
            ]
        );
    }

    #[test]
    fn test_orphan_continuation_starts_new_entity() {
        // I- with no in-progress entity of the same base tag: lenient
        // recovery, not an error.
        let output = BackendOutput::Tokens(vec![
            record("York", "I-GPE", 5),
            record("Apple", "B-ORG", 7),
        ]);
        let entities = reduce(output).unwrap();
        assert_eq!(
            entities,
            vec![Entity::new("York", "GPE"), Entity::new("Apple", "ORG")]
        );
    }

    #[test]
    fn test_continuation_across_gap_starts_new_entity() {
        let output = BackendOutput::Tokens(vec![
            record("New", "B-GPE", 0),
            record("York", "I-GPE", 2), // gap at index 1
        ]);
        let entities = reduce(output).unwrap();
        assert_eq!(
            entities,
            vec![Entity::new("New", "GPE"), Entity::new("York", "GPE")]
        );
    }

    #[test]
    fn test_continuation_with_different_base_starts_new_entity() {
        let output = BackendOutput::Tokens(vec![
            record("New", "B-GPE", 0),
            record("Amsterdam", "I-ORG", 1),
        ]);
        let entities = reduce(output).unwrap();
        assert_eq!(
            entities,
            vec![Entity::new("New", "GPE"), Entity::new("Amsterdam", "ORG")]
        );
    }

    #[test]
    fn test_empty_outputs() {
        let spans = BackendOutput::Spans {
            spans: vec![],
            degraded: None,
        };
        assert!(reduce(spans).unwrap().is_empty());

        let tokens = BackendOutput::Tokens(vec![]);
        assert!(reduce(tokens).unwrap().is_empty());
    }
}
