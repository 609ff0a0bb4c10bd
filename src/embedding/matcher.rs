// ============================================================
// Vocabulary Matcher
// ============================================================
// vocabulary(corpus) ∩ keys(table), plus the share of the
// corpus vocabulary the table covers.
//
// Both failure modes are fatal: with an empty vocabulary the
// coverage ratio is undefined, and with an empty intersection
// every downstream document would vectorize to nothing.

use std::collections::{BTreeSet, HashSet};

use crate::domain::error::PipelineError;
use crate::embedding::table::EmbeddingTable;

/// Result of intersecting a corpus vocabulary with a table.
#[derive(Debug, Clone)]
pub struct VocabularyMatch {
    /// Tokens present in both the corpus and the table
    pub matched: HashSet<String>,

    /// Number of distinct tokens in the corpus
    pub vocabulary_size: usize,

    /// Up to `UNMATCHED_SAMPLE` corpus tokens without an
    /// embedding, lexicographically first, for reporting
    pub unmatched_sample: Vec<String>,
}

const UNMATCHED_SAMPLE: usize = 20;

impl VocabularyMatch {
    /// Percentage of the corpus vocabulary found in the table.
    pub fn coverage(&self) -> f64 {
        self.matched.len() as f64 * 100.0 / self.vocabulary_size as f64
    }
}

/// Distinct tokens across all documents.
pub fn corpus_vocabulary(corpus: &[Vec<String>]) -> BTreeSet<&str> {
    corpus
        .iter()
        .flat_map(|doc| doc.iter().map(String::as_str))
        .collect()
}

/// Intersect the corpus vocabulary with the table's keys.
pub fn match_vocabulary(
    corpus: &[Vec<String>],
    table:  &EmbeddingTable,
) -> Result<VocabularyMatch, PipelineError> {
    let vocabulary = corpus_vocabulary(corpus);
    if vocabulary.is_empty() {
        return Err(PipelineError::EmptyVocabulary);
    }

    let (found, missing): (Vec<&str>, Vec<&str>) =
        vocabulary.iter().copied().partition(|t| table.contains(t));

    let result = VocabularyMatch {
        matched:          found.into_iter().map(str::to_string).collect(),
        vocabulary_size:  vocabulary.len(),
        unmatched_sample: missing
            .into_iter()
            .take(UNMATCHED_SAMPLE)
            .map(str::to_string)
            .collect(),
    };

    tracing::info!(
        "Vocabulary: {} distinct tokens, {} found in embedding table ({:.2}% coverage)",
        result.vocabulary_size,
        result.matched.len(),
        result.coverage(),
    );

    if result.matched.is_empty() {
        return Err(PipelineError::NoMatchedVocabulary {
            vocabulary: result.vocabulary_size,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn docs(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|d| d.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_cat_dog_scenario() {
        let table = EmbeddingTable::from_entries(
            2,
            [("cat", vec![1.0, 1.0]), ("dog", vec![3.0, 3.0])],
        )
        .unwrap();
        let m = match_vocabulary(&docs(&[&["cat", "dog"], &["cat"]]), &table).unwrap();
        let expected: HashSet<String> = ["cat", "dog"].iter().map(|s| s.to_string()).collect();
        assert_eq!(m.matched, expected);
        assert_eq!(m.coverage(), 100.0);
        assert!(m.unmatched_sample.is_empty());
    }

    #[test]
    fn test_partial_coverage() {
        let table = EmbeddingTable::from_entries(1, [("a", vec![0.0])]).unwrap();
        let m = match_vocabulary(&docs(&[&["a", "b"], &["c", "d", "a"]]), &table).unwrap();
        assert_eq!(m.vocabulary_size, 4);
        assert_eq!(m.coverage(), 25.0);
        assert_eq!(m.unmatched_sample, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_empty_vocabulary_is_fatal() {
        let table = EmbeddingTable::from_entries(1, [("a", vec![0.0])]).unwrap();
        let err = match_vocabulary(&docs(&[&[], &[]]), &table).unwrap_err();
        assert_eq!(err, PipelineError::EmptyVocabulary);
    }

    #[test]
    fn test_no_match_is_fatal() {
        let table = EmbeddingTable::from_entries(1, [("a", vec![0.0])]).unwrap();
        let err = match_vocabulary(&docs(&[&["x", "y"]]), &table).unwrap_err();
        assert_eq!(err, PipelineError::NoMatchedVocabulary { vocabulary: 2 });
    }

    proptest! {
        #[test]
        fn matched_is_subset_and_coverage_exact(
            corpus in prop::collection::vec(prop::collection::vec("[a-f]{1,2}", 0..8), 1..6),
            keys   in prop::collection::hash_set("[a-f]{1,2}", 1..20),
        ) {
            let table = EmbeddingTable::from_entries(1, keys.iter().map(|k| (k.clone(), vec![0.0]))).unwrap();
            let vocabulary: HashSet<String> = corpus.iter().flatten().cloned().collect();
            match match_vocabulary(&corpus, &table) {
                Ok(m) => {
                    for t in &m.matched {
                        prop_assert!(vocabulary.contains(t));
                        prop_assert!(keys.contains(t));
                    }
                    let expected = vocabulary.intersection(&keys).count();
                    prop_assert_eq!(m.matched.len(), expected);
                    prop_assert_eq!(m.vocabulary_size, vocabulary.len());
                    prop_assert_eq!(
                        m.coverage(),
                        expected as f64 * 100.0 / vocabulary.len() as f64
                    );
                }
                Err(PipelineError::EmptyVocabulary) => prop_assert!(vocabulary.is_empty()),
                Err(PipelineError::NoMatchedVocabulary { .. }) => {
                    prop_assert_eq!(vocabulary.intersection(&keys).count(), 0)
                }
                Err(e) => prop_assert!(false, "unexpected error {e}"),
            }
        }
    }
}
