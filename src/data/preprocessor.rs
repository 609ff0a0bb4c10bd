// ============================================================
// Layer 4 — Document Normalizer
// ============================================================
// Turns raw document text into the token sequence that the
// embedding pipeline looks up in the embedding table.
//
// Cleaning steps (applied in order):
//   1. Optionally strip a newsgroup/email header block
//      (everything up to the first blank line)
//   2. Optionally lowercase
//   3. Replace every run of non-letters (digits, punctuation,
//      whitespace, symbols) with a single space
//   4. Split on whitespace
//   5. Drop tokens shorter than `min_token_len` characters
//
// These heuristics are corpus-specific, which is why they sit
// behind the DocumentNormalizer trait: a corpus that needs a
// different cleaning pass supplies a different normalizer and
// the vectorizer never knows.

use regex::Regex;

use crate::domain::traits::DocumentNormalizer;

/// Regex-driven cleaner + whitespace tokenizer.
#[derive(Debug, Clone)]
pub struct RegexNormalizer {
    non_letters:   Regex,
    min_token_len: usize,
    lowercase:     bool,
    strip_headers: bool,
}

impl RegexNormalizer {
    pub fn new(min_token_len: usize) -> Self {
        Self {
            // only ASCII letters survive; the pretrained tables are keyed on plain words
            non_letters:   Regex::new(r"[^A-Za-z]+").expect("static regex"),
            min_token_len,
            lowercase:     true,
            strip_headers: false,
        }
    }

    /// Keep the original casing (case-sensitive embedding tables).
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Drop the `Key: value` header block of newsgroup postings.
    pub fn with_strip_headers(mut self, strip: bool) -> Self {
        self.strip_headers = strip;
        self
    }
}

impl Default for RegexNormalizer {
    fn default() -> Self {
        Self::new(2)
    }
}

impl DocumentNormalizer for RegexNormalizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let body = if self.strip_headers { strip_header_block(text) } else { text };
        let body = if self.lowercase { body.to_lowercase() } else { body.to_string() };

        self.non_letters
            .replace_all(&body, " ")
            .split_whitespace()
            .filter(|t| t.chars().count() >= self.min_token_len)
            .map(str::to_string)
            .collect()
    }
}

/// Everything after the first blank line; the whole text if the
/// text does not start with a header block.
pub fn strip_header_block(text: &str) -> &str {
    let first = text.lines().next().unwrap_or("");
    if !looks_like_header(first) {
        return text;
    }
    for sep in ["\r\n\r\n", "\n\n"] {
        if let Some(pos) = text.find(sep) {
            return &text[pos + sep.len()..];
        }
    }
    ""
}

fn looks_like_header(line: &str) -> bool {
    match line.split_once(':') {
        Some((key, _)) => {
            !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation_and_digits() {
        let n = RegexNormalizer::new(2);
        assert_eq!(
            n.tokenize("Hello, World! 42 times... it's a-ok"),
            vec!["hello", "world", "times", "it", "ok"]
        );
    }

    #[test]
    fn test_min_token_len() {
        let n = RegexNormalizer::new(4);
        assert_eq!(n.tokenize("the cat sat quietly"), vec!["quietly"]);
    }

    #[test]
    fn test_keeps_case_when_asked() {
        let n = RegexNormalizer::new(1).with_lowercase(false);
        assert_eq!(n.tokenize("New York"), vec!["New", "York"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(RegexNormalizer::default().tokenize("  ... 123 ").is_empty());
    }

    #[test]
    fn test_header_stripping() {
        let post = "From: someone@example.com\nSubject: Re: engines\n\nThe engine stalled.";
        assert_eq!(strip_header_block(post), "The engine stalled.");
        let n = RegexNormalizer::new(2).with_strip_headers(true);
        assert_eq!(n.tokenize(post), vec!["the", "engine", "stalled"]);
    }

    #[test]
    fn test_plain_text_is_not_treated_as_header() {
        let text = "Shares rose sharply.\n\nAnalysts: surprised.";
        assert_eq!(strip_header_block(text), text);
    }

    #[test]
    fn test_tokenize_all_keeps_order() {
        let n = RegexNormalizer::new(1);
        let out = n.tokenize_all(&["b b".to_string(), "a".to_string(), "cc".to_string()]);
        assert_eq!(out, vec![vec!["b", "b"], vec!["a"], vec!["cc"]]);
    }
}
