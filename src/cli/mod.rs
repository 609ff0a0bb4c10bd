// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application);
// this layer only routes and prints.
//
// Three commands are supported:
//   1. `evaluate` — cross-validated Naive Bayes vs. embedding
//                   logistic regression on a labelled corpus
//   2. `coverage` — vocabulary coverage of a corpus by a table
//   3. `sanity`   — the same classifiers on random labels
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, CoverageArgs, EvaluateArgs, SanityArgs};

#[derive(Parser, Debug)]
#[command(
    name = "text-embed-clf",
    version,
    about = "Compare count-based and embedding-based text classifiers with k-fold cross-validation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Coverage(args) => run_coverage(args),
            Commands::Sanity(args)   => run_sanity(args),
        }
    }
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    tracing::info!("Evaluating corpus in: {}", args.corpus.corpus_dir);
    let summary = EvaluateUseCase::new(args.into()).execute()?;

    println!(
        "\n{} documents, {} categories{}",
        summary.documents,
        summary.categories.len(),
        if summary.dropped > 0 {
            format!(" ({} dropped: no in-vocabulary tokens)", summary.dropped)
        } else {
            String::new()
        },
    );
    for (category, count) in summary.categories.iter().zip(&summary.class_counts) {
        println!("  {category:<24} {count:>6}");
    }
    println!();
    for report in &summary.reports {
        println!("{report}");
    }
    println!("\nPer-fold accuracies appended to '{}'", summary.metrics_csv.display());
    Ok(())
}

fn run_coverage(args: CoverageArgs) -> Result<()> {
    use crate::application::coverage_use_case::CoverageUseCase;

    let report = CoverageUseCase::new(args.into()).execute()?;
    let v = &report.vocabulary;

    println!("\nDocuments:          {}", report.documents);
    println!("Vocabulary size:    {}", v.vocabulary_size);
    println!("Matched vocabulary: {} ({:.2}%)", v.matched.len(), v.coverage());
    println!(
        "Matched tokens:     {} of {}",
        report.matched_tokens, report.total_tokens
    );
    println!("Empty documents:    {}", report.empty_documents);
    if !v.unmatched_sample.is_empty() {
        println!("Unmatched sample:   {}", v.unmatched_sample.join(", "));
    }
    Ok(())
}

fn run_sanity(args: SanityArgs) -> Result<()> {
    use crate::application::sanity_use_case::SanityUseCase;

    let summary = SanityUseCase::new(args.into()).execute()?;
    println!("\nRandom labels, chance accuracy {:.2}%", summary.chance * 100.0);
    for report in &summary.reports {
        println!("{report}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::evaluate_use_case::{EmptyDocumentPolicy, ExperimentConfig};
    use crate::embedding::normalizer::LengthPolicy;

    #[test]
    fn test_evaluate_defaults() {
        let cli = Cli::try_parse_from(["text-embed-clf", "evaluate"]).unwrap();
        let Commands::Evaluate(args) = cli.command else { panic!("wrong subcommand") };
        let cfg: ExperimentConfig = args.into();
        assert_eq!(cfg.folds, 10);
        assert_eq!(cfg.logistic.epochs, 300);
        assert_eq!(cfg.length_policy, LengthPolicy::TruncateToMin);
        assert_eq!(cfg.empty_documents, EmptyDocumentPolicy::Abort);
        assert!(cfg.use_cache);
        assert!(cfg.lowercase);
    }

    #[test]
    fn test_evaluate_flags() {
        let cli = Cli::try_parse_from([
            "text-embed-clf", "evaluate",
            "--length-policy", "truncate-to-percentile",
            "--length-percentile", "25",
            "--empty-documents", "drop",
            "--fold-strategy", "plain",
            "--shuffle-seed", "9",
            "--no-cache",
            "--keep-case",
        ])
        .unwrap();
        let Commands::Evaluate(args) = cli.command else { panic!("wrong subcommand") };
        let cfg: ExperimentConfig = args.into();
        assert_eq!(cfg.length_policy, LengthPolicy::TruncateToPercentile(25.0));
        assert_eq!(cfg.empty_documents, EmptyDocumentPolicy::Drop);
        assert_eq!(cfg.shuffle_seed, Some(9));
        assert!(!cfg.use_cache);
        assert!(!cfg.lowercase);
    }

    #[test]
    fn test_coverage_keep_case() {
        use crate::application::coverage_use_case::CoverageConfig;

        let cli = Cli::try_parse_from(["text-embed-clf", "coverage", "--keep-case"]).unwrap();
        let Commands::Coverage(args) = cli.command else { panic!("wrong subcommand") };
        let cfg: CoverageConfig = args.into();
        assert!(!cfg.lowercase);
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["text-embed-clf", "evaluate", "--length-policy", "mean"]).is_err());
    }
}
