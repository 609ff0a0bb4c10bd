// ============================================================
// Embedded Corpus — flat array dump / reload
// ============================================================
// Vectorizing a large corpus against a multi-gigabyte table is
// the slow part of a run, so the vectorized (pre-normalization)
// documents can be written to disk and read back verbatim.
//
// File layout (all integers and floats little-endian):
//
//   b"EMBC"                 magic
//   u32                     format version (1)
//   u64                     embedding dimension D
//   u64                     document count N
//   u64 × N                 vectors per document
//   f32 × (Σ lengths × D)   vector values, document by document
//
// Floats are written with to_le_bytes, so a save → load round
// trip reproduces every value bit for bit.

use anyhow::{bail, Context, Result};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use crate::domain::error::PipelineError;
use crate::domain::traits::Persistable;
use crate::embedding::EmbeddedDocument;

const MAGIC:   &[u8; 4] = b"EMBC";
const VERSION: u32      = 1;

/// Vectorized documents sharing one embedding dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedCorpus {
    dim:       usize,
    documents: Vec<EmbeddedDocument>,
}

impl EmbeddedCorpus {
    /// Wrap vectorized documents, checking every vector has `dim` values.
    pub fn new(dim: usize, documents: Vec<EmbeddedDocument>) -> Result<Self, PipelineError> {
        for vector in documents.iter().flatten() {
            if vector.len() != dim {
                return Err(PipelineError::DimensionMismatch {
                    expected: dim,
                    found:    vector.len(),
                });
            }
        }
        Ok(Self { dim, documents })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn into_documents(self) -> Vec<EmbeddedDocument> {
        self.documents
    }

    /// Indices of documents with no vectors.
    pub fn empty_indices(&self) -> Vec<usize> {
        self.documents
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Keep only the documents at `keep` (ascending indices).
    pub fn retain_indices(&mut self, keep: &[usize]) {
        let documents = keep.iter().map(|&i| self.documents[i].clone()).collect();
        self.documents = documents;
    }
}

impl Persistable for EmbeddedCorpus {
    fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;
        let mut w = BufWriter::new(file);

        w.write_all(MAGIC)?;
        w.write_all(&VERSION.to_le_bytes())?;
        w.write_all(&(self.dim as u64).to_le_bytes())?;
        w.write_all(&(self.documents.len() as u64).to_le_bytes())?;
        for doc in &self.documents {
            w.write_all(&(doc.len() as u64).to_le_bytes())?;
        }
        for value in self.documents.iter().flatten().flatten() {
            w.write_all(&value.to_le_bytes())?;
        }
        w.flush()
            .with_context(|| format!("Cannot write '{}'", path.display()))?;

        tracing::debug!(
            "Saved embedded corpus ({} documents, dim {}) to '{}'",
            self.documents.len(),
            self.dim,
            path.display(),
        );
        Ok(())
    }

    fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Cannot open '{}'", path.display()))?;
        let mut r = BufReader::new(file);

        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)
            .with_context(|| format!("'{}' is truncated", path.display()))?;
        if &magic != MAGIC {
            bail!("'{}' is not an embedded corpus file", path.display());
        }
        let version = read_u32(&mut r)?;
        if version != VERSION {
            bail!("'{}' has unsupported version {}", path.display(), version);
        }

        let dim   = read_u64(&mut r)? as usize;
        let count = read_u64(&mut r)? as usize;
        let lengths = (0..count)
            .map(|_| read_u64(&mut r).map(|l| l as usize))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("'{}' has a truncated length table", path.display()))?;

        let mut documents = Vec::with_capacity(count);
        let mut buf = vec![0u8; dim * 4];
        for len in lengths {
            let mut doc = Vec::with_capacity(len);
            for _ in 0..len {
                r.read_exact(&mut buf)
                    .with_context(|| format!("'{}' has truncated vector data", path.display()))?;
                doc.push(
                    buf.chunks_exact(4)
                        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                        .collect(),
                );
            }
            documents.push(doc);
        }

        if r.read(&mut [0u8; 1])? != 0 {
            bail!("'{}' has trailing bytes after the vector data", path.display());
        }

        Ok(Self { dim, documents })
    }
}

fn read_u32(r: &mut impl Read) -> Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

fn read_u64(r: &mut impl Read) -> Result<u64> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(u64::from_le_bytes(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_round_trip_is_bit_identical() {
        let corpus = EmbeddedCorpus::new(
            3,
            vec![
                vec![vec![0.1, -0.0, f32::MIN_POSITIVE], vec![1.0e-30, 7.5, -3.25]],
                vec![],
                vec![vec![f32::MAX, f32::MIN, 0.3]],
            ],
        )
        .unwrap();
        let file = NamedTempFile::new().unwrap();
        corpus.save(file.path()).unwrap();
        let loaded = EmbeddedCorpus::load(file.path()).unwrap();

        assert_eq!(loaded.dim(), 3);
        assert_eq!(loaded.len(), 3);
        let bits = |c: &EmbeddedCorpus| -> Vec<Vec<Vec<u32>>> {
            c.clone()
                .into_documents()
                .iter()
                .map(|d| d.iter().map(|v| v.iter().map(|x| x.to_bits()).collect()).collect())
                .collect()
        };
        assert_eq!(bits(&loaded), bits(&corpus));
    }

    #[test]
    fn test_rejects_foreign_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not a corpus").unwrap();
        assert!(EmbeddedCorpus::load(file.path()).is_err());
    }

    #[test]
    fn test_rejects_truncated_file() {
        let corpus = EmbeddedCorpus::new(2, vec![vec![vec![1.0, 2.0], vec![3.0, 4.0]]]).unwrap();
        let file = NamedTempFile::new().unwrap();
        corpus.save(file.path()).unwrap();
        let bytes = std::fs::read(file.path()).unwrap();
        std::fs::write(file.path(), &bytes[..bytes.len() - 2]).unwrap();
        assert!(EmbeddedCorpus::load(file.path()).is_err());
    }

    #[test]
    fn test_new_checks_dimension() {
        let err = EmbeddedCorpus::new(2, vec![vec![vec![1.0]]]).unwrap_err();
        assert_eq!(err, PipelineError::DimensionMismatch { expected: 2, found: 1 });
    }

    #[test]
    fn test_empty_indices_and_retain() {
        let mut c = EmbeddedCorpus::new(1, vec![vec![vec![1.0]], vec![], vec![vec![2.0]]]).unwrap();
        assert_eq!(c.empty_indices(), vec![1]);
        c.retain_indices(&[0, 2]);
        assert_eq!(c.into_documents(), vec![vec![vec![1.0f32]], vec![vec![2.0]]]);
    }
}
