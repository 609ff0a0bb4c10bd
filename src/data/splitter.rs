// ============================================================
// Layer 4 — Cross-Validation Fold Splitter
// ============================================================
// Partitions sample indices into k (train, test) folds.
// Every sample appears in exactly one test set.
//
// Two strategies:
//   Plain       contiguous blocks of indices; the first n % k
//               folds get one extra sample
//   Stratified  samples of each class are dealt round-robin
//               across the folds, so every fold has roughly the
//               corpus's class proportions
//
// Why shuffle?
//   Corpora loaded from category directories are ORDERED by
//   class. Plain k-fold without shuffling would then hold out
//   whole categories at a time. Stratified folds are immune to
//   that, but shuffling still varies which documents share a
//   fold. With a seed the split is reproducible.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom on a
// seeded StdRng.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoldStrategy {
    #[default]
    Stratified,
    Plain,
}

/// Sample indices of one cross-validation fold, both sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test:  Vec<usize>,
}

/// Build `k` folds over `labels.len()` samples.
pub fn make_folds(
    strategy:     FoldStrategy,
    labels:       &[usize],
    k:            usize,
    shuffle_seed: Option<u64>,
) -> Result<Vec<Fold>, PipelineError> {
    match strategy {
        FoldStrategy::Plain      => k_fold(labels.len(), k, shuffle_seed),
        FoldStrategy::Stratified => stratified_k_fold(labels, k, shuffle_seed),
    }
}

/// Plain k-fold over `n` samples.
pub fn k_fold(n: usize, k: usize, shuffle_seed: Option<u64>) -> Result<Vec<Fold>, PipelineError> {
    check_sizes(n, k)?;

    let mut order: Vec<usize> = (0..n).collect();
    if let Some(seed) = shuffle_seed {
        order.shuffle(&mut StdRng::seed_from_u64(seed));
    }

    let mut assignment = vec![0usize; n];
    let mut start = 0usize;
    for fold in 0..k {
        let size = n / k + usize::from(fold < n % k);
        for &i in &order[start..start + size] {
            assignment[i] = fold;
        }
        start += size;
    }
    Ok(folds_from_assignment(&assignment, k))
}

/// Stratified k-fold: class proportions are kept in every fold.
pub fn stratified_k_fold(
    labels:       &[usize],
    k:            usize,
    shuffle_seed: Option<u64>,
) -> Result<Vec<Fold>, PipelineError> {
    check_sizes(labels.len(), k)?;

    let num_classes = labels.iter().copied().max().map_or(0, |m| m + 1);
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); num_classes];
    for (i, &l) in labels.iter().enumerate() {
        by_class[l].push(i);
    }

    let mut rng = shuffle_seed.map(StdRng::seed_from_u64);
    let mut assignment = vec![0usize; labels.len()];
    // keep dealing where the previous class stopped so fold sizes stay balanced
    let mut next = 0usize;
    for (class, members) in by_class.iter_mut().enumerate() {
        if !members.is_empty() && members.len() < k {
            tracing::warn!(
                "Class {} has only {} members, fewer than {} folds",
                class,
                members.len(),
                k,
            );
        }
        if let Some(rng) = rng.as_mut() {
            members.shuffle(rng);
        }
        for &i in members.iter() {
            assignment[i] = next % k;
            next += 1;
        }
    }
    Ok(folds_from_assignment(&assignment, k))
}

fn check_sizes(n: usize, k: usize) -> Result<(), PipelineError> {
    if k < 2 || n < k {
        return Err(PipelineError::TooFewSamples { folds: k, samples: n });
    }
    Ok(())
}

fn folds_from_assignment(assignment: &[usize], k: usize) -> Vec<Fold> {
    let folds: Vec<Fold> = (0..k)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..assignment.len()).partition(|&i| assignment[i] == fold);
            Fold { train, test }
        })
        .collect();

    tracing::debug!(
        "Built {} folds, test sizes {:?}",
        k,
        folds.iter().map(|f| f.test.len()).collect::<Vec<_>>(),
    );
    folds
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(folds: &[Fold], n: usize) {
        let mut seen = vec![0usize; n];
        for f in folds {
            assert_eq!(f.train.len() + f.test.len(), n);
            for &i in &f.test {
                seen[i] += 1;
                assert!(!f.train.contains(&i));
            }
        }
        assert!(seen.iter().all(|&c| c == 1), "every sample tested exactly once");
    }

    #[test]
    fn test_plain_fold_sizes() {
        let folds = k_fold(23, 10, None).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 2, 2, 2, 2, 2, 2, 2]);
        assert_eq!(folds[0].test, vec![0, 1, 2]);
        assert_partition(&folds, 23);
    }

    #[test]
    fn test_plain_shuffled_is_reproducible() {
        let a = k_fold(50, 5, Some(7)).unwrap();
        let b = k_fold(50, 5, Some(7)).unwrap();
        assert_eq!(a, b);
        assert_partition(&a, 50);
    }

    #[test]
    fn test_stratified_keeps_proportions() {
        // 30 of class 0 followed by 10 of class 1
        let labels: Vec<usize> = (0..40).map(|i| usize::from(i >= 30)).collect();
        let folds = stratified_k_fold(&labels, 10, Some(1)).unwrap();
        assert_partition(&folds, 40);
        for f in &folds {
            assert_eq!(f.test.len(), 4);
            let ones = f.test.iter().filter(|&&i| labels[i] == 1).count();
            assert_eq!(ones, 1);
        }
    }

    #[test]
    fn test_too_few_samples() {
        assert_eq!(
            k_fold(3, 10, None).unwrap_err(),
            PipelineError::TooFewSamples { folds: 10, samples: 3 }
        );
        assert!(stratified_k_fold(&[0, 1, 0], 1, None).is_err());
    }
}
