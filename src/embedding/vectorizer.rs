use std::collections::HashSet;

use crate::domain::error::PipelineError;
use crate::embedding::table::EmbeddingTable;
use crate::embedding::EmbeddedDocument;

/// Look up every token of `tokens` that is in `matched`, in
/// original order. Tokens outside `matched` are skipped;
/// repeated tokens yield repeated vectors.
///
/// `matched` must come from [`match_vocabulary`] against the same
/// table. A matched token that the table cannot resolve is
/// reported as [`PipelineError::TokenNotInTable`].
///
/// [`match_vocabulary`]: crate::embedding::matcher::match_vocabulary
pub fn vectorize(
    tokens:  &[String],
    table:   &EmbeddingTable,
    matched: &HashSet<String>,
) -> Result<EmbeddedDocument, PipelineError> {
    tokens
        .iter()
        .filter(|t| matched.contains(t.as_str()))
        .map(|t| {
            table
                .get(t)
                .map(<[f32]>::to_vec)
                .ok_or_else(|| PipelineError::TokenNotInTable(t.clone()))
        })
        .collect()
}

/// [`vectorize`] every document of a corpus.
pub fn vectorize_corpus(
    corpus:  &[Vec<String>],
    table:   &EmbeddingTable,
    matched: &HashSet<String>,
) -> Result<Vec<EmbeddedDocument>, PipelineError> {
    let embedded: Vec<EmbeddedDocument> = corpus
        .iter()
        .map(|doc| vectorize(doc, table, matched))
        .collect::<Result<_, _>>()?;

    let kept: usize = embedded.iter().map(Vec::len).sum();
    let total: usize = corpus.iter().map(Vec::len).sum();
    tracing::info!(
        "Vectorized {} documents: kept {} of {} tokens",
        embedded.len(),
        kept,
        total,
    );
    Ok(embedded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table() -> EmbeddingTable {
        EmbeddingTable::from_entries(2, [("cat", vec![1.0, 1.0]), ("dog", vec![3.0, 3.0])])
            .unwrap()
    }

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_cat_dog_scenario() {
        let matched = set(&["cat", "dog"]);
        let corpus  = vec![toks(&["cat", "dog"]), toks(&["cat"])];
        let out = vectorize_corpus(&corpus, &table(), &matched).unwrap();
        assert_eq!(out, vec![vec![vec![1.0, 1.0], vec![3.0, 3.0]], vec![vec![1.0, 1.0]]]);
    }

    #[test]
    fn test_drops_unknown_and_keeps_order_and_duplicates() {
        let out = vectorize(
            &toks(&["dog", "the", "cat", "dog"]),
            &table(),
            &set(&["cat", "dog"]),
        )
        .unwrap();
        assert_eq!(out, vec![vec![3.0, 3.0], vec![1.0, 1.0], vec![3.0, 3.0]]);
    }

    #[test]
    fn test_no_matched_tokens_gives_empty_document() {
        let out = vectorize(&toks(&["the", "a"]), &table(), &set(&["cat"])).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_unfiltered_vocabulary_is_a_caller_error() {
        let err = vectorize(&toks(&["cow"]), &table(), &set(&["cow"])).unwrap_err();
        assert_eq!(err, PipelineError::TokenNotInTable("cow".into()));
    }

    proptest! {
        #[test]
        fn length_equals_matched_token_count(
            doc in prop::collection::vec(prop::sample::select(vec!["cat", "dog", "the", "of"]), 0..30),
            use_dog in any::<bool>(),
        ) {
            let matched = if use_dog { set(&["cat", "dog"]) } else { set(&["cat"]) };
            let doc = toks(&doc);
            let out = vectorize(&doc, &table(), &matched).unwrap();
            let expected = doc.iter().filter(|t| matched.contains(*t)).count();
            prop_assert_eq!(out.len(), expected);
            prop_assert!(out.len() <= doc.len());
        }
    }
}
