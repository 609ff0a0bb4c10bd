// ============================================================
// Layer 2 — CoverageUseCase
// ============================================================
// Answers "how much of this corpus does this embedding table
// know?" without training anything:
//
//   Step 1: Load the labelled corpus   (Layer 4 - data)
//   Step 2: Load the embedding table   (Layer 6 - infra)
//   Step 3: Tokenize and match         (Layer 4 / 4b)
//   Step 4: Count documents that would vectorize to nothing

use anyhow::Result;

use crate::data::{loader::CategoryDirLoader, preprocessor::RegexNormalizer};
use crate::domain::traits::{DocumentNormalizer, DocumentSource};
use crate::embedding::matcher::{match_vocabulary, VocabularyMatch};
use crate::infra::embedding_store::{EmbeddingFormat, EmbeddingStore};

#[derive(Debug, Clone)]
pub struct CoverageConfig {
    pub corpus_dir:       String,
    pub embeddings:       String,
    pub embedding_format: EmbeddingFormat,
    pub embedding_limit:  Option<usize>,
    pub min_token_len:    usize,
    pub strip_headers:    bool,
    pub lowercase:        bool,
}

#[derive(Debug, Clone)]
pub struct CoverageReport {
    pub documents:       usize,
    pub total_tokens:    usize,
    /// Tokens (with repeats) that have an embedding
    pub matched_tokens:  usize,
    /// Documents in which no token has an embedding
    pub empty_documents: usize,
    pub vocabulary:      VocabularyMatch,
}

pub struct CoverageUseCase {
    config: CoverageConfig,
}

impl CoverageUseCase {
    pub fn new(config: CoverageConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<CoverageReport> {
        let cfg = &self.config;

        let corpus = CategoryDirLoader::new(&cfg.corpus_dir).load_corpus()?;
        let table = EmbeddingStore::new(&cfg.embeddings, cfg.embedding_format, cfg.embedding_limit)
            .load()?;

        let normalizer = RegexNormalizer::new(cfg.min_token_len)
            .with_strip_headers(cfg.strip_headers)
            .with_lowercase(cfg.lowercase);
        let tokens = normalizer.tokenize_all(&corpus.texts());
        let vocabulary = match_vocabulary(&tokens, &table)?;

        let per_doc: Vec<usize> = tokens
            .iter()
            .map(|doc| doc.iter().filter(|t| vocabulary.matched.contains(t.as_str())).count())
            .collect();

        Ok(CoverageReport {
            documents:       corpus.len(),
            total_tokens:    tokens.iter().map(Vec::len).sum(),
            matched_tokens:  per_doc.iter().sum(),
            empty_documents: per_doc.iter().filter(|&&n| n == 0).count(),
            vocabulary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    fn config(root: &Path, lowercase: bool) -> CoverageConfig {
        CoverageConfig {
            corpus_dir:       root.join("corpus").to_string_lossy().into_owned(),
            embeddings:       root.join("vec.txt").to_string_lossy().into_owned(),
            embedding_format: EmbeddingFormat::Text,
            embedding_limit:  None,
            min_token_len:    2,
            strip_headers:    false,
            lowercase,
        }
    }

    #[test]
    fn test_counts_tokens_and_empty_documents() {
        let root = TempDir::new().unwrap();
        let cat = root.path().join("corpus").join("pets");
        fs::create_dir_all(&cat).unwrap();
        fs::write(cat.join("1.txt"), "cat dog cat zebra").unwrap();
        fs::write(cat.join("2.txt"), "zebra okapi").unwrap();
        fs::write(root.path().join("vec.txt"), "cat 1 0\ndog 0 1\n").unwrap();

        let report = CoverageUseCase::new(config(root.path(), true)).execute().unwrap();

        assert_eq!(report.documents, 2);
        assert_eq!(report.total_tokens, 6);
        assert_eq!(report.matched_tokens, 3);
        assert_eq!(report.empty_documents, 1);
        assert_eq!(report.vocabulary.vocabulary_size, 4);
        assert_eq!(report.vocabulary.matched.len(), 2);
        assert!((report.vocabulary.coverage() - 50.0).abs() < 1e-9);
        assert_eq!(report.vocabulary.unmatched_sample, vec!["okapi", "zebra"]);
    }

    #[test]
    fn test_keep_case_matches_case_sensitively() {
        let root = TempDir::new().unwrap();
        let cat = root.path().join("corpus").join("places");
        fs::create_dir_all(&cat).unwrap();
        fs::write(cat.join("1.txt"), "Paris paris London").unwrap();
        fs::write(root.path().join("vec.txt"), "Paris 1 0\nLondon 0 1\n").unwrap();

        let folded = CoverageUseCase::new(config(root.path(), true)).execute();
        assert!(folded.is_err(), "lowercased tokens never meet capitalised keys");

        let kept = CoverageUseCase::new(config(root.path(), false)).execute().unwrap();
        assert_eq!(kept.matched_tokens, 2);
        assert_eq!(kept.vocabulary.vocabulary_size, 3);
        assert_eq!(kept.vocabulary.unmatched_sample, vec!["paris"]);
    }
}
