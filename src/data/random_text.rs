// ============================================================
// Layer 4 — Random Text Generator
// ============================================================
// Builds a corpus whose labels carry NO information about the
// text: every word is drawn uniformly from a word list and every
// label uniformly from the categories, independently.
//
// Any classifier evaluated on such a corpus should score near
// chance (1 / num_classes). A pipeline that does noticeably
// better is leaking labels or overfitting its evaluation.

use anyhow::{bail, Result};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::domain::document::{Corpus, Document};
use crate::domain::traits::DocumentSource;

pub struct RandomTextGenerator {
    words:       Vec<String>,
    documents:   usize,
    num_classes: usize,
    doc_len:     usize,
    seed:        u64,
}

impl RandomTextGenerator {
    pub fn new(
        words:       Vec<String>,
        documents:   usize,
        num_classes: usize,
        doc_len:     usize,
        seed:        u64,
    ) -> Self {
        Self { words, documents, num_classes, doc_len, seed }
    }
}

impl DocumentSource for RandomTextGenerator {
    fn load_corpus(&self) -> Result<Corpus> {
        if self.words.is_empty() {
            bail!("Cannot generate random text from an empty word list");
        }
        if self.num_classes < 2 {
            bail!("Need at least 2 classes, got {}", self.num_classes);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut documents = Vec::with_capacity(self.documents);
        let mut labels    = Vec::with_capacity(self.documents);

        for i in 0..self.documents {
            let text = (0..self.doc_len)
                .filter_map(|_| self.words.choose(&mut rng).map(String::as_str))
                .collect::<Vec<_>>()
                .join(" ");
            documents.push(Document::new(format!("random/{i}"), text));
            labels.push(rng.gen_range(0..self.num_classes));
        }

        let categories = (0..self.num_classes).map(|c| format!("random-{c}")).collect();
        tracing::info!(
            "Generated {} random documents of {} words over {} classes",
            self.documents,
            self.doc_len,
            self.num_classes,
        );
        Ok(Corpus::new(documents, labels, categories)?)
    }
}

/// `n` feature rows of uniform noise in [-1, 1) with independent
/// uniform labels.
pub fn random_features(
    n:           usize,
    dim:         usize,
    num_classes: usize,
    seed:        u64,
) -> (Vec<Vec<f32>>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = (0..n)
        .map(|_| (0..dim).map(|_| rng.gen_range(-1.0f32..1.0)).collect())
        .collect();
    let labels = (0..n).map(|_| rng.gen_range(0..num_classes)).collect();
    (rows, labels)
}
