//! Error types for the pipeline crate.

use thiserror::Error;

/// Errors raised by the pipeline stages.
///
/// `ReferentialViolation` is per-rating: the normalizer drops the offending
/// rating, reports it, and continues. `NoRatingsRemain` is the one terminal,
/// user-visible outcome: nothing survived filtering, so there is nothing to
/// recommend.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A business rating references a user id missing from the user records
    #[error("business {business_id} holds a rating from unknown user {user_id}")]
    ReferentialViolation {
        business_id: String,
        user_id: String,
    },

    /// Filtering emptied the data set
    #[error("no reviews survived filtering; no recommendations possible")]
    NoRatingsRemain,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PipelineError>;
