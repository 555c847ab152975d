//! # Recommendation Pipeline
//!
//! This module coordinates the entire recommendation pipeline:
//! 1. Reconcile raw rows into the dual review index
//! 2. Prune inactive reviewers and rarely-reviewed businesses
//! 3. Normalize away per-reviewer rating bias
//! 4. Compute pairwise similarities and rank them into the index
//!
//! The stages run strictly in order; each fully consumes its predecessor's
//! output before the next begins. Per-row and per-rating failures are
//! recovered inside their stage and surfaced in the outcome's reports; the
//! one terminal outcome is a data set that filtering emptied.

use crate::error::{PipelineError, Result};
use crate::recommend::RecommendationIndex;
use crate::similarity::{DEFAULT_SHRINKAGE, SimilarityEngine};
use crate::stages::{Normalizer, PopularityFilter};
use data_loader::{DataLoadError, LoadOutcome, RawReview, load_rows};
use std::time::Instant;
use tracing::info;

/// Default minimum review count for a reviewer to be kept.
pub const DEFAULT_MIN_USER_RATINGS: usize = 60;

/// Default minimum review count for a business to be kept.
pub const DEFAULT_MIN_BUSINESS_RATINGS: usize = 150;

/// Everything a run produces: the queryable index plus the recoverable
/// failures that were skipped along the way.
#[derive(Debug)]
pub struct RunOutcome {
    pub index: RecommendationIndex,
    /// Rows the loader rejected (malformed numbers, inconsistent restates)
    pub skipped_rows: Vec<DataLoadError>,
    /// Ratings the normalizer dropped for referencing missing reviewers
    pub violations: Vec<PipelineError>,
}

/// The explicit top-level workflow object. All inputs arrive as parameters
/// and all state lives in the run; nothing process-wide, nothing retained
/// between runs.
///
/// ## Usage
/// ```ignore
/// let outcome = RecommendationPipeline::new()
///     .with_min_user_ratings(60)
///     .with_min_business_ratings(150)
///     .with_shrinkage(3.0)
///     .run(rows)?;
///
/// if let Some(by_id) = outcome.index.lookup("Cafe One") {
///     // ranked candidates per business id
/// }
/// ```
pub struct RecommendationPipeline {
    min_user_ratings: usize,
    min_business_ratings: usize,
    shrinkage: f64,
}

impl RecommendationPipeline {
    /// Create a pipeline with the reference thresholds (60 reviews per
    /// user, 150 per business, shrinkage 3.0).
    pub fn new() -> Self {
        Self {
            min_user_ratings: DEFAULT_MIN_USER_RATINGS,
            min_business_ratings: DEFAULT_MIN_BUSINESS_RATINGS,
            shrinkage: DEFAULT_SHRINKAGE,
        }
    }

    /// Configure the minimum review count for reviewers.
    pub fn with_min_user_ratings(mut self, min: usize) -> Self {
        self.min_user_ratings = min;
        self
    }

    /// Configure the minimum review count for businesses.
    pub fn with_min_business_ratings(mut self, min: usize) -> Self {
        self.min_business_ratings = min;
        self
    }

    /// Configure the similarity shrinkage constant.
    pub fn with_shrinkage(mut self, shrinkage: f64) -> Self {
        self.shrinkage = shrinkage;
        self
    }

    /// Run the full pipeline over a batch of raw rows.
    ///
    /// Rows must arrive in the order that should win duplicate
    /// (user, business) pairs; for the review export that is chronological.
    ///
    /// Returns [`PipelineError::NoRatingsRemain`] when filtering (or
    /// normalization) leaves no business to recommend from.
    pub fn run(&self, rows: Vec<RawReview>) -> Result<RunOutcome> {
        let started = Instant::now();

        let LoadOutcome { mut store, skipped } = load_rows(rows);

        PopularityFilter::new(self.min_user_ratings, self.min_business_ratings)
            .apply(&mut store);
        if store.businesses().is_empty() {
            return Err(PipelineError::NoRatingsRemain);
        }

        let violations = Normalizer.apply(&mut store);
        if store.businesses().is_empty() {
            return Err(PipelineError::NoRatingsRemain);
        }

        let index = SimilarityEngine::new()
            .with_shrinkage(self.shrinkage)
            .compute(&store);

        info!(
            names = index.name_count(),
            skipped_rows = skipped.len(),
            violations = violations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "recommendation pipeline finished"
        );

        Ok(RunOutcome {
            index,
            skipped_rows: skipped,
            violations,
        })
    }
}

impl Default for RecommendationPipeline {
    fn default() -> Self {
        Self::new()
    }
}
