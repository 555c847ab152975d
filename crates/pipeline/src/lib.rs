//! Staged computation core of the business recommendation engine.
//!
//! This crate provides:
//! - PopularityFilter and Normalizer for pruning and de-biasing the store
//! - SimilarityEngine for regularized pairwise Pearson correlation
//! - RecommendationIndex for name → id → ranked-candidate lookups
//! - RecommendationPipeline tying the stages together
//!
//! ## Architecture
//! The pipeline processes the review store in strict stages:
//! 1. The loader (data-loader crate) reconciles raw rows into the dual index
//! 2. PopularityFilter prunes entities below activity thresholds
//! 3. Normalizer subtracts each reviewer's average from business ratings
//! 4. SimilarityEngine correlates every eligible business pair
//! 5. RecommendationIndex serves ranked lookups by display name
//!
//! ## Example Usage
//! ```ignore
//! use data_loader::read_reviews;
//! use pipeline::RecommendationPipeline;
//!
//! let rows = read_reviews(Path::new("data/reviews.csv"))?;
//! let outcome = RecommendationPipeline::new().run(rows)?;
//!
//! if let Some(by_id) = outcome.index.lookup("Cafe One") {
//!     for (business_id, candidates) in by_id {
//!         // candidates are ranked by similarity descending
//!     }
//! }
//! ```

pub mod error;
pub mod recommend;
pub mod recommender;
pub mod similarity;
pub mod stages;

// Re-export main types
pub use error::{PipelineError, Result};
pub use recommend::{RecommendationIndex, SimilarityResult};
pub use recommender::{RecommendationPipeline, RunOutcome};
pub use similarity::{DEFAULT_SHRINKAGE, SimilarityEngine};
pub use stages::{Normalizer, PopularityFilter};
