use crate::domain::error::PipelineError;
use crate::embedding::EmbeddedDocument;

/// Element-wise mean of one document's vectors.
///
/// Accumulates in `f64`, so the mean of L copies of a vector is
/// that vector bit for bit.
pub fn average_document(
    document: &[Vec<f32>],
    dim:      usize,
    index:    usize,
) -> Result<Vec<f32>, PipelineError> {
    if document.is_empty() {
        return Err(PipelineError::EmptyDocument { index });
    }

    let mut sum = vec![0.0f64; dim];
    for vector in document {
        if vector.len() != dim {
            return Err(PipelineError::DimensionMismatch {
                expected: dim,
                found:    vector.len(),
            });
        }
        for (acc, &x) in sum.iter_mut().zip(vector) {
            *acc += f64::from(x);
        }
    }

    let n = document.len() as f64;
    Ok(sum.into_iter().map(|s| (s / n) as f32).collect())
}

/// Average every document, giving an N × `dim` feature matrix.
///
/// Fails on the first document with no vectors instead of
/// emitting a NaN row.
pub fn average_documents(
    documents: &[EmbeddedDocument],
    dim:       usize,
) -> Result<Vec<Vec<f32>>, PipelineError> {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| average_document(doc, dim, i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cat_dog_scenario() {
        let docs = vec![vec![vec![1.0, 1.0]], vec![vec![1.0, 1.0]]];
        assert_eq!(average_documents(&docs, 2).unwrap(), vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
    }

    #[test]
    fn test_mean() {
        let docs = vec![vec![vec![1.0, 2.0], vec![3.0, 6.0]]];
        assert_eq!(average_documents(&docs, 2).unwrap(), vec![vec![2.0, 4.0]]);
    }

    #[test]
    fn test_empty_document_is_an_error_not_nan() {
        let docs = vec![vec![vec![1.0, 1.0]], vec![]];
        let err = average_documents(&docs, 2).unwrap_err();
        assert_eq!(err, PipelineError::EmptyDocument { index: 1 });
    }

    #[test]
    fn test_dimension_mismatch() {
        let docs = vec![vec![vec![1.0, 1.0, 1.0]]];
        let err = average_documents(&docs, 2).unwrap_err();
        assert_eq!(err, PipelineError::DimensionMismatch { expected: 2, found: 3 });
    }

    proptest! {
        #[test]
        fn output_shape_is_n_by_d(n in 1usize..8, len in 1usize..6, dim in 1usize..5) {
            let docs: Vec<EmbeddedDocument> = (0..n)
                .map(|i| (0..len).map(|j| vec![(i * j) as f32; dim]).collect())
                .collect();
            let out = average_documents(&docs, dim).unwrap();
            prop_assert_eq!(out.len(), n);
            prop_assert!(out.iter().all(|row| row.len() == dim));
        }

        #[test]
        fn mean_of_identical_vectors_is_exact(
            v   in prop::collection::vec(-1.0e6f32..1.0e6, 1..8),
            len in 1usize..50,
        ) {
            let doc = vec![v.clone(); len];
            prop_assert_eq!(average_document(&doc, v.len(), 0).unwrap(), v);
        }
    }
}
