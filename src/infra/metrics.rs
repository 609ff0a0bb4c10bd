// ============================================================
// Layer 6 — Fold Metrics Logger
// ============================================================
// Appends per-fold accuracies to a CSV file after every
// cross-validation run, so repeated experiments accumulate in
// one place and can be compared or plotted later.
//
// Output file: <output_dir>/cv_results.csv
//
// Example CSV output:
//   experiment,classifier,fold,accuracy
//   newsgroups,Naive Bayes (token counts),1,0.964000
//   newsgroups,Naive Bayes (token counts),2,0.951000
//   ...

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::ml::cross_validation::CvReport;

const HEADER: &str = "experiment,classifier,fold,accuracy";

pub struct FoldMetricsLogger {
    csv_path: PathBuf,
}

impl FoldMetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;

        let csv_path = dir.join("cv_results.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one row per fold of `report`.
    pub fn log(&self, experiment: &str, report: &CvReport) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        for (fold, acc) in report.fold_accuracies.iter().enumerate() {
            writeln!(
                f,
                "{},{},{},{:.6}",
                csv_field(experiment),
                csv_field(&report.classifier),
                fold + 1,
                acc,
            )?;
        }

        tracing::debug!(
            "Logged {} folds of '{}' to '{}'",
            report.fold_accuracies.len(),
            report.classifier,
            self.csv_path.display(),
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

/// Quote a field if it contains a comma or quote.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
