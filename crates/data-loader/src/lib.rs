//! # Data Loader Crate
//!
//! This crate handles ingesting the review CSV export and reconciling its
//! rows into the dual review index the recommendation pipeline runs on.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RatingRecord, RatingStore)
//! - **parser**: Parse the CSV export into raw row structs
//! - **loader**: Reconcile rows into the dual user/business index
//! - **error**: Error types for ingestion and loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{load_rows, read_reviews};
//! use std::path::Path;
//!
//! let rows = read_reviews(Path::new("data/reviews.csv"))?;
//! let outcome = load_rows(rows);
//!
//! let (users, businesses, reviews) = outcome.store.counts();
//! println!("{users} users, {businesses} businesses, {reviews} reviews");
//! println!("{} rows skipped", outcome.skipped.len());
//! ```
//!
//! Every accepted review lands in two records: the user's, keyed by business
//! id, and the business's, keyed by user id. Rows that fail the numeric or
//! consistency checks are skipped and reported, never fatal.

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod loader;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use loader::{LoadOutcome, load_rows};
pub use parser::{EXPECTED_COLUMNS, RawReview, read_reviews, read_reviews_from_reader};
pub use types::{BusinessId, RatingRecord, RatingStore, UserId};
