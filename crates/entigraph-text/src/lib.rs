//! entigraph-text - Text normalization ahead of entity recognition
//!
//! Normalization is a pure transformation in three steps, each total:
//! markup stripping (best effort, malformed input never errors), removal of
//! every character that is not an ASCII letter, digit, or whitespace, and
//! stopword filtering with single-space rejoin. Reapplying the whole
//! sequence to its own output is a no-op.

use std::collections::HashSet;

/// Normalizes raw text for a recognition backend.
///
/// Holds the stopword set loaded at construction; matching is
/// case-sensitive against the list exactly as loaded.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stopwords: HashSet<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Create a normalizer with the fixed English stopword list
    pub fn new() -> Self {
        let stopwords = stop_words::get(stop_words::LANGUAGE::English)
            .into_iter()
            .collect();
        Self { stopwords }
    }

    /// Create a normalizer with a custom stopword list
    pub fn with_stopwords<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stopwords: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Normalize raw text: strip markup, filter characters, drop stopwords.
    ///
    /// Returns an owned string, possibly empty if the input was all
    /// stopwords and punctuation.
    pub fn normalize(&self, text: &str) -> String {
        let text = strip_markup(text);
        let text: String = text
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
            .collect();

        text.split_whitespace()
            .filter(|token| !self.stopwords.contains(*token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Strip markup tags from text, yielding content only.
///
/// Best-effort: an unterminated tag swallows the rest of the input, and a
/// stray `<` not opening a tag is kept as text. Tags are replaced by a
/// single space so adjacent content does not fuse into one token. Common
/// character references are decoded afterwards.
pub fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_tag = false;

    while let Some(c) = chars.next() {
        if in_tag {
            if c == '>' {
                in_tag = false;
                out.push(' ');
            }
            continue;
        }
        if c == '<' {
            match chars.peek() {
                Some(&next) if next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?') => {
                    in_tag = true;
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }

    decode_references(&out)
}

/// Decode the handful of character references that survive markup stripping.
fn decode_references(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn normalizer() -> Normalizer {
        Normalizer::new()
    }

    #[test]
    fn test_strips_markup() {
        let n = normalizer();
        assert_eq!(
            n.normalize("<h1>Project Phoenix</h1><p>Redwood Tech</p>"),
            "Project Phoenix Redwood Tech"
        );
    }

    #[test]
    fn test_malformed_markup_does_not_panic() {
        let n = normalizer();
        // Unterminated tag swallows the tail; still a valid (possibly
        // shorter) result, never an error.
        let out = n.normalize("Redwood <a href=");
        assert_eq!(out, "Redwood");

        // A bare '<' that opens no tag stays text and is then filtered.
        assert_eq!(n.normalize("5 < 6"), "5 6");
    }

    #[test]
    fn test_removes_punctuation_and_symbols() {
        let n = normalizer();
        assert_eq!(n.normalize("Apple, Inc.  [2024] #1!"), "Apple Inc 2024 1");
    }

    #[test]
    fn test_removes_stopwords_case_sensitively() {
        let n = normalizer();
        // "is"/"in" are in the list as loaded; capitalized forms are not.
        assert_eq!(n.normalize("Apple is in California."), "Apple California");
        assert!(n.normalize("The company").contains("The"));
    }

    #[test]
    fn test_empty_and_all_stopword_input() {
        let n = normalizer();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("is of the and"), "");
        assert_eq!(n.normalize("... !!! ---"), "");
    }

    #[test]
    fn test_character_references_decoded() {
        let n = Normalizer::with_stopwords(Vec::<String>::new());
        assert_eq!(n.normalize("Johnson &amp; Sons"), "Johnson Sons");
        assert_eq!(n.normalize("a&nbsp;b"), "a b");
    }

    #[test]
    fn test_rejoins_with_single_spaces() {
        let n = normalizer();
        assert_eq!(n.normalize("Apple\t\n  California"), "Apple California");
    }

    #[test]
    fn test_idempotent_on_clean_text() {
        let n = normalizer();
        let once = n.normalize("<b>Apple</b> is in California.");
        assert_eq!(n.normalize(&once), once);
    }

    proptest! {
        // Normalization is idempotent for arbitrary input: the output
        // contains no markup, no filtered characters, and no stopwords,
        // so a second application changes nothing.
        #[test]
        fn prop_normalize_idempotent(input in ".{0,200}") {
            let n = normalizer();
            let once = n.normalize(&input);
            prop_assert_eq!(n.normalize(&once), once);
        }

        #[test]
        fn prop_output_alphabet_is_clean(input in ".{0,200}") {
            let n = normalizer();
            let out = n.normalize(&input);
            prop_assert!(out.chars().all(|c| c.is_ascii_alphanumeric() || c == ' '));
        }
    }
}
