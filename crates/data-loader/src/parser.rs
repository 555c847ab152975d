//! Parser for the review CSV export.
//!
//! One file, fifteen columns, and the first row restates the column names
//! verbatim. Rows are the join between the user, the business, and the
//! review; splitting that join back apart is the loader's job, not ours.
//!
//! Rust concepts you'll see here:
//! - Typed CSV decoding with serde's `Deserialize`
//! - Error handling with the `?` operator
//! - Keeping fields as strings at a trust boundary

use crate::error::{DataLoadError, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The column list the file's header row must restate, in order.
pub const EXPECTED_COLUMNS: [&str; 15] = [
    "user_id",
    "business_id",
    "date",
    "review_id",
    "stars",
    "usefulvotes_review",
    "user_name",
    "categories",
    "biz_name",
    "latitude",
    "longitude",
    "business_avg",
    "business_review_count",
    "user_avg",
    "user_review_count",
];

/// One raw review row, exactly as it appears in the file.
///
/// Every field is a `String`, including the numeric ones: converting
/// `stars`/`user_avg`/`business_avg` is the loader's responsibility, so that
/// a non-numeric value is a per-row skip instead of a file-level failure.
/// The loader consumes only user_id, business_id, stars, user_name, biz_name,
/// business_avg and user_avg; the rest pass through unused.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReview {
    pub user_id: String,
    pub business_id: String,
    pub date: String,
    pub review_id: String,
    pub stars: String,
    pub usefulvotes_review: String,
    pub user_name: String,
    pub categories: String,
    pub biz_name: String,
    pub latitude: String,
    pub longitude: String,
    pub business_avg: String,
    pub business_review_count: String,
    pub user_avg: String,
    pub user_review_count: String,
}

impl RawReview {
    /// Build a row from the fields the loader actually consumes, leaving the
    /// pass-through columns empty. Rows do not have to come from a file.
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        user_avg: impl Into<String>,
        business_id: impl Into<String>,
        biz_name: impl Into<String>,
        business_avg: impl Into<String>,
        stars: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            business_id: business_id.into(),
            date: String::new(),
            review_id: String::new(),
            stars: stars.into(),
            usefulvotes_review: String::new(),
            user_name: user_name.into(),
            categories: String::new(),
            biz_name: biz_name.into(),
            latitude: String::new(),
            longitude: String::new(),
            business_avg: business_avg.into(),
            business_review_count: String::new(),
            user_avg: user_avg.into(),
            user_review_count: String::new(),
        }
    }
}

/// Read review rows from a CSV file, validating the header first.
pub fn read_reviews(path: &Path) -> Result<Vec<RawReview>> {
    let file = File::open(path)?;
    read_reviews_from_reader(file)
}

/// Read review rows from any CSV source.
///
/// The first record must restate [`EXPECTED_COLUMNS`] verbatim; a missing or
/// reordered header is reported as [`DataLoadError::HeaderMismatch`] before
/// any row is decoded.
pub fn read_reviews_from_reader<R: Read>(source: R) -> Result<Vec<RawReview>> {
    let mut reader = csv::Reader::from_reader(source);

    let headers = reader.headers()?;
    if headers.len() != EXPECTED_COLUMNS.len()
        || headers.iter().zip(EXPECTED_COLUMNS).any(|(found, expected)| found != expected)
    {
        return Err(DataLoadError::HeaderMismatch {
            expected: EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            found: headers.iter().map(|c| c.to_string()).collect(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: RawReview = record?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "user_id,business_id,date,review_id,stars,usefulvotes_review,\
user_name,categories,biz_name,latitude,longitude,business_avg,business_review_count,\
user_avg,user_review_count";

    #[test]
    fn test_read_valid_rows() {
        let data = format!(
            "{HEADER}\n\
             u1,b1,2012-01-01,r1,5,0,Ann,Food,Cafe One,0.0,0.0,4.1,200,3.5,80\n\
             u2,b1,2012-01-02,r2,3,1,Ben,Food,Cafe One,0.0,0.0,4.1,200,3.0,65\n"
        );

        let rows = read_reviews_from_reader(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id, "u1");
        assert_eq!(rows[0].biz_name, "Cafe One");
        assert_eq!(rows[1].stars, "3");
    }

    #[test]
    fn test_quoted_comma_in_name() {
        let data = format!(
            "{HEADER}\n\
             u1,b1,2012-01-01,r1,4,0,Ann,Food,\"Soup, Salad & Co\",0.0,0.0,4.1,200,3.5,80\n"
        );

        let rows = read_reviews_from_reader(data.as_bytes()).unwrap();
        assert_eq!(rows[0].biz_name, "Soup, Salad & Co");
    }

    #[test]
    fn test_header_mismatch_reported() {
        let data = "user_id,wrong_column,stars\nu1,b1,5\n";

        let err = read_reviews_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::HeaderMismatch { .. }));
    }
}
