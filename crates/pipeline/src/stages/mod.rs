//! Store-mutating stages that run between loading and similarity computation.

pub mod normalize;
pub mod popularity;

pub use normalize::Normalizer;
pub use popularity::PopularityFilter;
