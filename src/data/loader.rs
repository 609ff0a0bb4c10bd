// ============================================================
// Layer 4 — Category Directory Loader
// ============================================================
// Loads a labelled corpus laid out as one subdirectory per
// category:
//
//   corpus_dir/
//     business/      001.txt 002.txt ...
//     sport/         001.txt ...
//     tech/          ...
//
// The category name is the subdirectory name. Categories are
// sorted lexicographically and numbered from 0, which makes the
// label indices stable across runs and machines.
//
// Encoding policy: files are decoded as UTF-8 and any byte
// sequence that is not valid UTF-8 is DROPPED (not replaced with
// U+FFFD, not fatal). Newsgroup dumps routinely contain stray
// Latin-1 bytes and one bad byte should not cost a document.
//
// A missing or unreadable corpus directory is fatal.

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::document::{Corpus, Document};
use crate::domain::traits::DocumentSource;

/// Loads every file under `<dir>/<category>/`.
pub struct CategoryDirLoader {
    dir: PathBuf,
}

impl CategoryDirLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentSource for CategoryDirLoader {
    fn load_corpus(&self) -> Result<Corpus> {
        if !self.dir.is_dir() {
            bail!("Corpus directory '{}' does not exist", self.dir.display());
        }

        let categories = sorted_entries(&self.dir, |p| p.is_dir())?;
        if categories.is_empty() {
            bail!(
                "Corpus directory '{}' has no category subdirectories",
                self.dir.display()
            );
        }

        let mut documents  = Vec::new();
        let mut labels     = Vec::new();
        let mut names      = Vec::with_capacity(categories.len());

        for (label, cat_dir) in categories.iter().enumerate() {
            let name = file_name(cat_dir);
            let files = sorted_entries(cat_dir, |p| p.is_file())?;
            tracing::debug!("Category {} '{}': {} files", label, name, files.len());

            for path in files {
                let bytes = fs::read(&path)
                    .with_context(|| format!("Cannot read '{}'", path.display()))?;
                let text = decode_dropping_invalid(&bytes);
                documents.push(Document::new(format!("{}/{}", name, file_name(&path)), text));
                labels.push(label);
            }
            names.push(name);
        }

        let corpus = Corpus::new(documents, labels, names)?;
        tracing::info!(
            "Loaded {} documents in {} categories from '{}'",
            corpus.len(),
            corpus.categories().len(),
            self.dir.display(),
        );
        Ok(corpus)
    }
}

/// Non-hidden entries of `dir` accepted by `keep`, sorted by name.
fn sorted_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        let path = entry?.path();
        if file_name(&path).starts_with('.') || !keep(&path) {
            continue;
        }
        entries.push(path);
    }
    entries.sort();
    Ok(entries)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Decode UTF-8, silently skipping every invalid byte sequence.
pub fn decode_dropping_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                // valid_up_to marks a prefix that is always UTF-8
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                // error_len() is None only for a truncated sequence at the end
                match e.error_len() {
                    Some(n) => bytes = &rest[n..],
                    None    => return out,
                }
            }
        }
    }
}
