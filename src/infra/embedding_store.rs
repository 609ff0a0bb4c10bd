// ============================================================
// Layer 6 — Embedding Store
// ============================================================
// Reads a pretrained word-vector file into an EmbeddingTable.
//
// Two on-disk formats are understood:
//
//   binary (word2vec .bin)
//     "<count> <dim>\n"
//     then `count` records of:  word ' ' f32×dim (little-endian)
//     each record optionally followed by '\n'
//
//   text (word2vec / GloVe .txt)
//     optional header line "<count> <dim>"
//     then one line per word:   word v1 v2 ... vD
//
// `Auto` picks binary for a `.bin` extension and text otherwise.
// An optional limit keeps only the first N records, which is
// how large tables are usually trimmed for quick experiments.
//
// When a word appears twice, the first record wins.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::data::loader::decode_dropping_invalid;
use crate::embedding::table::EmbeddingTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingFormat {
    #[default]
    Auto,
    Binary,
    Text,
}

impl EmbeddingFormat {
    /// Resolve `Auto` against the file name.
    pub fn resolve(self, path: &Path) -> EmbeddingFormat {
        match self {
            EmbeddingFormat::Auto => {
                let is_bin = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("bin"));
                if is_bin { EmbeddingFormat::Binary } else { EmbeddingFormat::Text }
            }
            other => other,
        }
    }
}

pub struct EmbeddingStore {
    path:   PathBuf,
    format: EmbeddingFormat,
    limit:  Option<usize>,
}

impl EmbeddingStore {
    pub fn new(path: impl Into<PathBuf>, format: EmbeddingFormat, limit: Option<usize>) -> Self {
        Self { path: path.into(), format, limit }
    }

    /// Load the whole table (or the first `limit` records).
    pub fn load(&self) -> Result<EmbeddingTable> {
        let file = File::open(&self.path).with_context(|| {
            format!("Cannot open embedding file '{}'", self.path.display())
        })?;
        let reader = BufReader::new(file);

        let format = self.format.resolve(&self.path);
        tracing::info!(
            "Loading {:?} embeddings from '{}'{}",
            format,
            self.path.display(),
            self.limit.map(|l| format!(" (first {l} words)")).unwrap_or_default(),
        );

        let table = match format {
            EmbeddingFormat::Binary => read_binary(reader, self.limit),
            _                       => read_text(reader, self.limit),
        }
        .with_context(|| format!("Malformed embedding file '{}'", self.path.display()))?;
        if table.is_empty() {
            bail!("Embedding file '{}' holds no word vectors", self.path.display());
        }

        tracing::info!("Loaded {} word vectors of dimension {}", table.len(), table.dim());
        Ok(table)
    }
}

/// Largest vector length accepted from a file header.
const MAX_DIM: usize = 1 << 16;

/// Parse "<count> <dim>". Returns None if the line is not a header.
fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let count = parts.next()?.parse().ok()?;
    let dim   = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((count, dim))
}

pub fn read_binary(mut r: impl BufRead, limit: Option<usize>) -> Result<EmbeddingTable> {
    let mut header = String::new();
    r.read_line(&mut header).context("Cannot read header line")?;
    let Some((count, dim)) = parse_header(&header) else {
        bail!("Expected '<count> <dim>' header, found {:?}", header.trim_end());
    };
    if dim == 0 || dim > MAX_DIM {
        bail!("Embedding dimension {} is outside 1..={}", dim, MAX_DIM);
    }
    let Some(record_bytes) = dim.checked_mul(4) else {
        bail!("Embedding dimension {} is too large", dim);
    };

    let wanted = limit.map_or(count, |l| l.min(count));
    let mut table  = EmbeddingTable::with_capacity(dim, wanted);
    let mut word   = Vec::new();
    let mut bytes  = vec![0u8; record_bytes];
    let mut vector = vec![0f32; dim];

    for i in 0..wanted {
        word.clear();
        if r.read_until(b' ', &mut word)? == 0 {
            bail!("File ends after {} of {} records", i, count);
        }
        // The separator and any newline left by the previous record
        let start = word.iter().position(|&b| b != b'\n' && b != b'\r').unwrap_or(word.len());
        let end = word.len() - usize::from(word.last() == Some(&b' '));
        if start >= end {
            bail!("Record {} has an empty word", i);
        }

        r.read_exact(&mut bytes)
            .with_context(|| format!("Record {} has a truncated vector", i))?;
        for (v, b) in vector.iter_mut().zip(bytes.chunks_exact(4)) {
            *v = f32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        }

        table.insert(decode_dropping_invalid(&word[start..end]), &vector)?;
    }
    Ok(table)
}

pub fn read_text(r: impl BufRead, limit: Option<usize>) -> Result<EmbeddingTable> {
    let mut table: Option<EmbeddingTable> = None;
    let mut records = 0usize;

    for (lineno, line) in r.split(b'\n').enumerate() {
        if limit.is_some_and(|l| records >= l) {
            break;
        }
        let line = decode_dropping_invalid(&line?);
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        if lineno == 0 {
            if let Some((_, dim)) = parse_header(line) {
                table = Some(EmbeddingTable::new(dim));
                continue;
            }
        }

        let mut parts = line.split(' ');
        let word = parts.next().unwrap_or_default();
        let vector = parts
            .filter(|p| !p.is_empty())
            .map(str::parse::<f32>)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Line {}: bad number", lineno + 1))?;
        if word.is_empty() || vector.is_empty() {
            bail!("Line {}: expected a word followed by its vector", lineno + 1);
        }

        let table = table.get_or_insert_with(|| EmbeddingTable::new(vector.len()));
        table
            .insert(word.to_string(), &vector)
            .with_context(|| format!("Line {}", lineno + 1))?;
        records += 1;
    }

    match table {
        Some(t) => Ok(t),
        None    => bail!("No word vectors found"),
    }
}
