//! Pairwise business similarity via regularized Pearson correlation.
//!
//! Comparing two businesses means correlating the normalized ratings of the
//! reviewers they share. Knowing who they share is set intersection, which
//! requires each business's reviewers as a set; that data is needed for
//! every pair, so it is computed once up front instead of memoized.
//!
//! ## Algorithm
//! For every unordered pair of distinct businesses:
//! 1. Intersect the two reviewer sets; fewer than two common reviewers and
//!    the pair is skipped outright, with no entry on either side.
//! 2. Build two rating sequences aligned position-by-position over the
//!    common reviewers.
//! 3. Pearson's correlation by the classic sums formulation, then shrinkage
//!    toward zero for small samples: `raw * n / (n + k)`.
//! 4. Negative similarity is not a recommendation signal; drop the pair.
//! 5. Otherwise record a result in both directions, since each business
//!    needs its own ranked candidate list.
//!
//! The pair space is O(businesses²); the first index is partitioned across
//! rayon workers, each emitting a disjoint entry list, and the lists are
//! merged by concatenation. That merge is the only synchronization in the
//! stage.

use crate::recommend::{RecommendationIndex, SimilarityResult};
use data_loader::{RatingRecord, RatingStore};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Default shrinkage constant: a 3-reviewer overlap keeps half its raw
/// correlation, a 27-reviewer overlap keeps ninety percent.
pub const DEFAULT_SHRINKAGE: f64 = 3.0;

/// Computes the pairwise similarity of every eligible business pair and
/// groups the results into a [`RecommendationIndex`].
pub struct SimilarityEngine {
    shrinkage: f64,
}

impl SimilarityEngine {
    /// Create an engine with the default shrinkage constant.
    pub fn new() -> Self {
        Self {
            shrinkage: DEFAULT_SHRINKAGE,
        }
    }

    /// Configure the shrinkage constant (default: 3.0)
    pub fn with_shrinkage(mut self, shrinkage: f64) -> Self {
        self.shrinkage = shrinkage;
        self
    }

    /// Compare every business against every other business.
    ///
    /// Expects normalized ratings; the store is read-only from here on.
    pub fn compute(&self, store: &RatingStore) -> RecommendationIndex {
        // Snapshot the records in id order so pair enumeration and the
        // floating-point sums are reproducible run to run.
        let mut records: Vec<&RatingRecord> = store.businesses().values().collect();
        records.sort_unstable_by(|a, b| a.id.cmp(&b.id));

        let reviewer_sets: Vec<HashSet<&str>> = records
            .iter()
            .map(|record| record.ratings.keys().map(String::as_str).collect())
            .collect();

        let shrinkage = self.shrinkage;
        let entries: Vec<(usize, SimilarityResult)> = (0..records.len().saturating_sub(1))
            .into_par_iter()
            .flat_map_iter(|first| {
                let mut local = Vec::new();
                for second in (first + 1)..records.len() {
                    let mut common: Vec<&str> = reviewer_sets[first]
                        .intersection(&reviewer_sets[second])
                        .copied()
                        .collect();
                    // Need at least two common reviewers for a valid rating
                    if common.len() < 2 {
                        continue;
                    }
                    // Fixed reviewer order keeps the sums deterministic; any
                    // order works as long as both sequences share it.
                    common.sort_unstable();

                    let first_ratings: Vec<f64> =
                        common.iter().map(|r| records[first].ratings[*r]).collect();
                    let second_ratings: Vec<f64> =
                        common.iter().map(|r| records[second].ratings[*r]).collect();

                    let raw = pearson(&first_ratings, &second_ratings);
                    let similarity = shrink(raw, common.len(), shrinkage);
                    // A negatively correlated business is NOT recommended
                    if similarity < 0.0 {
                        continue;
                    }

                    local.push((first, describe(records[second], similarity, common.len())));
                    local.push((second, describe(records[first], similarity, common.len())));
                }
                local
            })
            .collect();

        debug!(
            businesses = records.len(),
            entries = entries.len(),
            "pairwise similarity computed"
        );

        let mut index = RecommendationIndex::new();
        for (target, result) in entries {
            let record = records[target];
            index.insert(record.name.clone(), record.id.clone(), result);
        }
        index.rank_candidates();
        index
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// One direction of a computed pair: the counterpart as a candidate.
fn describe(counterpart: &RatingRecord, similarity: f64, common_raters: usize) -> SimilarityResult {
    SimilarityResult {
        business_id: counterpart.id.clone(),
        name: counterpart.name.clone(),
        avg: counterpart.avg,
        similarity,
        common_raters,
    }
}

/// Pearson's correlation coefficient by the classic sums formulation:
/// both means, both sums of squared deviations, then the covariance over
/// the square root of the variance product. The multi-stage calculation is
/// kept for its computational accuracy on the small inputs this sees.
///
/// The two sequences must be aligned over the same reviewers; unequal
/// lengths mean the caller broke that invariant, and the assertion is the
/// right response to a programming fault.
fn pearson(first: &[f64], second: &[f64]) -> f64 {
    assert_eq!(
        first.len(),
        second.len(),
        "rating sequences must be aligned over the same reviewers"
    );

    let len = first.len();
    // Need at least two data points per sample or there is no variance
    if len < 2 {
        return 0.0;
    }
    let count = len as f64;

    let first_mean: f64 = first.iter().sum::<f64>() / count;
    let second_mean: f64 = second.iter().sum::<f64>() / count;

    let first_variance: f64 = first.iter().map(|x| (x - first_mean).powi(2)).sum();
    let second_variance: f64 = second.iter().map(|y| (y - second_mean).powi(2)).sum();

    let combined = (first_variance * second_variance).sqrt();
    // No variance equals no ratio
    if combined == 0.0 {
        return 0.0;
    }

    let covariance: f64 = first
        .iter()
        .zip(second)
        .map(|(x, y)| (x - first_mean) * (y - second_mean))
        .sum();
    covariance / combined
}

/// Discount a correlation estimated from few samples toward zero:
/// `raw * n / (n + k)`. Compensates for the coefficient's overestimation
/// bias on small overlaps.
fn shrink(raw: f64, samples: usize, k: f64) -> f64 {
    (raw * samples as f64) / (samples as f64 + k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{RatingRecord, RatingStore};

    fn store_with(businesses: &[(&str, &str, &[(&str, f64)])]) -> RatingStore {
        let mut store = RatingStore::new();
        for (id, name, ratings) in businesses {
            let mut record = RatingRecord::new(*id, *name, 0.0);
            for (user, value) in *ratings {
                record.insert_rating(*user, *value);
            }
            record.recompute_avg();
            store.insert_business(record);
        }
        store
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let raw = pearson(&[3.0, 4.0, 5.0], &[3.0, 4.0, 5.0]);
        assert!((raw - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect_anticorrelation() {
        let raw = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert!((raw + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance_is_zero() {
        assert_eq!(pearson(&[2.0, 2.0, 2.0], &[1.0, 3.0, 5.0]), 0.0);
    }

    #[test]
    #[should_panic(expected = "aligned over the same reviewers")]
    fn test_pearson_unaligned_sequences_panic() {
        pearson(&[1.0, 2.0], &[1.0]);
    }

    #[test]
    fn test_shrinkage_halves_three_sample_correlation() {
        assert_eq!(shrink(1.0, 3, 3.0), 0.5);
    }

    #[test]
    fn test_identical_ratings_score_half_after_shrinkage() {
        let store = store_with(&[
            ("b1", "Cafe One", &[("u1", 3.0), ("u2", 4.0), ("u3", 5.0)]),
            ("b2", "Cafe Two", &[("u1", 3.0), ("u2", 4.0), ("u3", 5.0)]),
        ]);

        let index = SimilarityEngine::new().compute(&store);

        let by_id = index.lookup("Cafe One").unwrap();
        let results = &by_id["b1"];
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].business_id, "b2");
        assert!((results[0].similarity - 0.5).abs() < 1e-12);
        assert_eq!(results[0].common_raters, 3);
    }

    #[test]
    fn test_anticorrelated_pair_excluded() {
        let store = store_with(&[
            (
                "b1",
                "Cafe One",
                &[("u1", 1.0), ("u2", 2.0), ("u3", 3.0), ("u4", 4.0), ("u5", 5.0)],
            ),
            (
                "b2",
                "Cafe Two",
                &[("u1", 5.0), ("u2", 4.0), ("u3", 3.0), ("u4", 2.0), ("u5", 1.0)],
            ),
        ]);

        let index = SimilarityEngine::new().compute(&store);

        assert!(index.lookup("Cafe One").is_none());
        assert!(index.lookup("Cafe Two").is_none());
    }

    #[test]
    fn test_single_common_reviewer_skipped_entirely() {
        let store = store_with(&[
            ("b1", "Cafe One", &[("u1", 5.0), ("u2", 4.0)]),
            ("b2", "Cafe Two", &[("u1", 5.0), ("u3", 4.0)]),
        ]);

        let index = SimilarityEngine::new().compute(&store);

        // Only u1 overlaps: no entry on either side, not a zero-valued one
        assert!(index.lookup("Cafe One").is_none());
        assert!(index.lookup("Cafe Two").is_none());
    }

    #[test]
    fn test_zero_variance_pair_kept_at_zero() {
        // A flat rating vector has no variance; the raw correlation is 0.0,
        // which is not negative, so the pair stays with similarity zero.
        let store = store_with(&[
            ("b1", "Cafe One", &[("u1", 2.0), ("u2", 2.0)]),
            ("b2", "Cafe Two", &[("u1", 1.0), ("u2", 3.0)]),
        ]);

        let index = SimilarityEngine::new().compute(&store);

        let results = &index.lookup("Cafe One").unwrap()["b1"];
        assert_eq!(results[0].similarity, 0.0);
    }

    #[test]
    fn test_results_recorded_in_both_directions() {
        let store = store_with(&[
            ("b1", "Cafe One", &[("u1", 3.0), ("u2", 4.0)]),
            ("b2", "Cafe Two", &[("u1", 3.5), ("u2", 4.5)]),
        ]);

        let index = SimilarityEngine::new().compute(&store);

        let forward = &index.lookup("Cafe One").unwrap()["b1"];
        let backward = &index.lookup("Cafe Two").unwrap()["b2"];
        assert_eq!(forward[0].business_id, "b2");
        assert_eq!(backward[0].business_id, "b1");
        assert_eq!(forward[0].similarity, backward[0].similarity);
        assert_eq!(forward[0].name, "Cafe Two");
        assert_eq!(backward[0].name, "Cafe One");
    }
}
