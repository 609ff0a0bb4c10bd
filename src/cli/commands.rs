// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `evaluate`, `coverage` and
// `sanity`, and all their configurable flags.
//
// Enum-valued flags have their own clap ValueEnum types here and
// are converted into the application's serde enums, so nothing
// below Layer 1 depends on clap.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::{
    coverage_use_case::CoverageConfig,
    evaluate_use_case::{EmptyDocumentPolicy, ExperimentConfig},
    sanity_use_case::SanityConfig,
};
use crate::data::splitter::FoldStrategy;
use crate::embedding::normalizer::LengthPolicy;
use crate::infra::embedding_store::EmbeddingFormat;
use crate::ml::trainer::LogisticRegressionSettings;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cross-validate Naive Bayes and embedding-based logistic
    /// regression on a labelled corpus
    Evaluate(EvaluateArgs),

    /// Report how much of a corpus vocabulary has embeddings
    Coverage(CoverageArgs),

    /// Run both classifiers on random labels; expect chance accuracy
    Sanity(SanityArgs),
}

// ─── Shared flag groups ──────────────────────────────────────────────────────

#[derive(Args, Debug, Clone)]
pub struct EmbeddingArgs {
    /// Pretrained word-vector file (word2vec .bin or text)
    #[arg(long, default_value = "data/embeddings.bin")]
    pub embeddings: String,

    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    pub embedding_format: FormatArg,

    /// Read only the first N words of the embedding file
    #[arg(long)]
    pub embedding_limit: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Corpus root with one subdirectory per category
    #[arg(long, default_value = "data/corpus")]
    pub corpus_dir: String,

    /// Tokens shorter than this are discarded
    #[arg(long, default_value_t = 2)]
    pub min_token_len: usize,

    /// Drop everything before the first blank line of each
    /// document (newsgroup / email headers)
    #[arg(long)]
    pub strip_headers: bool,

    /// Match tokens case-sensitively instead of lowercasing them
    /// (for case-preserving tables such as GoogleNews word2vec)
    #[arg(long)]
    pub keep_case: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LogisticArgs {
    /// Inverse regularisation strength C (larger = weaker penalty)
    #[arg(long, default_value_t = 1.0)]
    pub regularization: f64,

    /// Full-batch optimisation steps per fold
    #[arg(long, default_value_t = 300)]
    pub epochs: usize,

    #[arg(long, default_value_t = 0.05)]
    pub lr: f64,
}

impl From<LogisticArgs> for LogisticRegressionSettings {
    fn from(a: LogisticArgs) -> Self {
        LogisticRegressionSettings {
            regularization: a.regularization,
            epochs:         a.epochs,
            lr:             a.lr,
        }
    }
}

// ─── evaluate ────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[command(flatten)]
    pub embedding: EmbeddingArgs,

    #[command(flatten)]
    pub logistic: LogisticArgs,

    /// Where the embedded-corpus cache and cv_results.csv go
    #[arg(long, default_value = "output")]
    pub output_dir: String,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 10)]
    pub folds: usize,

    #[arg(long, value_enum, default_value_t = FoldStrategyArg::Stratified)]
    pub fold_strategy: FoldStrategyArg,

    /// Shuffle samples before folding; omit for folds in corpus order
    #[arg(long)]
    pub shuffle_seed: Option<u64>,

    /// How documents are brought to a common length before averaging
    #[arg(long, value_enum, default_value_t = LengthPolicyArg::TruncateToMin)]
    pub length_policy: LengthPolicyArg,

    /// Percentile used by truncate-to-percentile
    #[arg(long, default_value_t = 10.0)]
    pub length_percentile: f64,

    /// Documents with no in-vocabulary token: abort the run or drop them
    #[arg(long, value_enum, default_value_t = EmptyDocumentsArg::Abort)]
    pub empty_documents: EmptyDocumentsArg,

    /// Ignore the embedded-corpus cache; the fresh corpus still replaces it
    #[arg(long)]
    pub no_cache: bool,
}

/// The boundary between Layer 1 and Layer 2: the application
/// layer never sees clap types.
impl From<EvaluateArgs> for ExperimentConfig {
    fn from(a: EvaluateArgs) -> Self {
        let length_policy = match a.length_policy {
            LengthPolicyArg::TruncateToMin        => LengthPolicy::TruncateToMin,
            LengthPolicyArg::PadWithZeros         => LengthPolicy::PadWithZeros,
            LengthPolicyArg::TruncateToPercentile => {
                LengthPolicy::TruncateToPercentile(a.length_percentile)
            }
        };
        ExperimentConfig {
            corpus_dir:       a.corpus.corpus_dir,
            embeddings:       a.embedding.embeddings,
            embedding_format: a.embedding.embedding_format.into(),
            embedding_limit:  a.embedding.embedding_limit,
            output_dir:       a.output_dir,
            folds:            a.folds,
            fold_strategy:    a.fold_strategy.into(),
            shuffle_seed:     a.shuffle_seed,
            logistic:         a.logistic.into(),
            length_policy,
            empty_documents:  a.empty_documents.into(),
            min_token_len:    a.corpus.min_token_len,
            strip_headers:    a.corpus.strip_headers,
            lowercase:        !a.corpus.keep_case,
            use_cache:        !a.no_cache,
        }
    }
}

// ─── coverage ────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct CoverageArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[command(flatten)]
    pub embedding: EmbeddingArgs,
}

impl From<CoverageArgs> for CoverageConfig {
    fn from(a: CoverageArgs) -> Self {
        CoverageConfig {
            corpus_dir:       a.corpus.corpus_dir,
            embeddings:       a.embedding.embeddings,
            embedding_format: a.embedding.embedding_format.into(),
            embedding_limit:  a.embedding.embedding_limit,
            min_token_len:    a.corpus.min_token_len,
            strip_headers:    a.corpus.strip_headers,
            lowercase:        !a.corpus.keep_case,
        }
    }
}

// ─── sanity ──────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct SanityArgs {
    #[command(flatten)]
    pub embedding: EmbeddingArgs,

    #[command(flatten)]
    pub logistic: LogisticArgs,

    /// Number of random documents
    #[arg(long, default_value_t = 500)]
    pub documents: usize,

    /// Number of random labels
    #[arg(long, default_value_t = 4)]
    pub classes: usize,

    /// Words per random document
    #[arg(long, default_value_t = 50)]
    pub doc_len: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 10)]
    pub folds: usize,
}

impl From<SanityArgs> for SanityConfig {
    fn from(a: SanityArgs) -> Self {
        SanityConfig {
            embeddings:       a.embedding.embeddings,
            embedding_format: a.embedding.embedding_format.into(),
            embedding_limit:  a.embedding.embedding_limit,
            documents:        a.documents,
            classes:          a.classes,
            doc_len:          a.doc_len,
            seed:             a.seed,
            folds:            a.folds,
            logistic:         a.logistic.into(),
        }
    }
}

// ─── Value enums ─────────────────────────────────────────────────────────────

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Auto,
    Binary,
    Text,
}

impl From<FormatArg> for EmbeddingFormat {
    fn from(a: FormatArg) -> Self {
        match a {
            FormatArg::Auto   => EmbeddingFormat::Auto,
            FormatArg::Binary => EmbeddingFormat::Binary,
            FormatArg::Text   => EmbeddingFormat::Text,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldStrategyArg {
    Stratified,
    Plain,
}

impl From<FoldStrategyArg> for FoldStrategy {
    fn from(a: FoldStrategyArg) -> Self {
        match a {
            FoldStrategyArg::Stratified => FoldStrategy::Stratified,
            FoldStrategyArg::Plain      => FoldStrategy::Plain,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPolicyArg {
    TruncateToMin,
    PadWithZeros,
    TruncateToPercentile,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyDocumentsArg {
    Abort,
    Drop,
}

impl From<EmptyDocumentsArg> for EmptyDocumentPolicy {
    fn from(a: EmptyDocumentsArg) -> Self {
        match a {
            EmptyDocumentsArg::Abort => EmptyDocumentPolicy::Abort,
            EmptyDocumentsArg::Drop  => EmptyDocumentPolicy::Drop,
        }
    }
}
