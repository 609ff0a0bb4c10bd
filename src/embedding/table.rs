use std::collections::HashMap;

use crate::domain::error::PipelineError;

const MAX_PREALLOC_WORDS:  usize = 1 << 20;
const MAX_PREALLOC_VALUES: usize = 1 << 26;

/// Pretrained word vectors, all of dimension `dim`.
///
/// Vectors are stored back to back in one flat buffer;
/// `index` maps a word to its row.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    dim:    usize,
    index:  HashMap<String, usize>,
    values: Vec<f32>,
}

impl EmbeddingTable {
    /// An empty table for vectors of length `dim`.
    pub fn new(dim: usize) -> Self {
        Self { dim, index: HashMap::new(), values: Vec::new() }
    }

    /// Pre-size for `capacity` words. The hint usually comes from a
    /// file header, so at most `MAX_PREALLOC_WORDS` rows are reserved
    /// up front and the table grows past that as words arrive.
    pub fn with_capacity(dim: usize, capacity: usize) -> Self {
        let words = capacity.min(MAX_PREALLOC_WORDS);
        Self {
            dim,
            index:  HashMap::with_capacity(words),
            values: Vec::with_capacity(words.saturating_mul(dim).min(MAX_PREALLOC_VALUES)),
        }
    }

    /// Build a table from `(word, vector)` pairs.
    #[cfg(test)]
    pub fn from_entries<I, S>(dim: usize, entries: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut table = Self::new(dim);
        for (word, vector) in entries {
            table.insert(word.into(), &vector)?;
        }
        Ok(table)
    }

    /// Add a word. The first vector seen for a word wins; later
    /// duplicates are ignored and `false` is returned.
    pub fn insert(&mut self, word: String, vector: &[f32]) -> Result<bool, PipelineError> {
        if vector.len() != self.dim {
            return Err(PipelineError::DimensionMismatch {
                expected: self.dim,
                found:    vector.len(),
            });
        }
        if self.index.contains_key(&word) {
            return Ok(false);
        }
        self.index.insert(word, self.index.len());
        self.values.extend_from_slice(vector);
        Ok(true)
    }

    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.index.get(word).map(|&row| {
            let start = row * self.dim;
            &self.values[start..start + self.dim]
        })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// All words, in no particular order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }
}
