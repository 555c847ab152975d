//! Builds the dual review index from raw rows.
//!
//! Each file row is the join between a user, a business, and one review.
//! Loading splits the join back into the two record collections, verifying
//! along the way that every repeated entity id restates the same display
//! name and running average it arrived with the first time.
//!
//! Rust concepts you'll see here:
//! - Per-row error recovery (skip and report, keep going)
//! - The `?` operator against a row-scoped helper
//! - HashMap-backed reconciliation of duplicate identities

use crate::error::{DataLoadError, Result};
use crate::parser::RawReview;
use crate::types::{RatingRecord, RatingStore};
use tracing::{info, warn};

/// The result of loading a batch of rows: the populated store plus every
/// per-row error that caused a skip. Bad rows never abort the batch.
#[derive(Debug)]
pub struct LoadOutcome {
    pub store: RatingStore,
    pub skipped: Vec<DataLoadError>,
}

/// Build a [`RatingStore`] from a sequence of raw review rows.
///
/// Rows are consumed in order, and a repeated (user, business) pair keeps the
/// later value: last write wins. Feed rows in the order that should win
/// (for the review export that is chronological order); the loader does not
/// reorder them.
///
/// Per-row failures ([`DataLoadError::MalformedInput`],
/// [`DataLoadError::DataInconsistency`]) are logged, collected into the
/// outcome, and the row is skipped.
pub fn load_rows<I>(rows: I) -> LoadOutcome
where
    I: IntoIterator<Item = RawReview>,
{
    let mut store = RatingStore::new();
    let mut skipped = Vec::new();

    for row in rows {
        if let Err(error) = reconcile_row(&mut store, &row) {
            warn!(%error, user_id = %row.user_id, business_id = %row.business_id, "row skipped");
            skipped.push(error);
        }
    }

    let (users, businesses, reviews) = store.counts();
    info!(users, businesses, reviews, skipped = skipped.len(), "review data loaded");

    LoadOutcome { store, skipped }
}

/// Apply one row to the store, or say why it cannot be applied.
fn reconcile_row(store: &mut RatingStore, row: &RawReview) -> Result<()> {
    let stars = parse_numeric(&row.stars, "stars")?;
    let user_avg = parse_numeric(&row.user_avg, "user_avg")?;
    let business_avg = parse_numeric(&row.business_avg, "business_avg")?;

    // A known user must restate its name and average exactly. A new user is
    // not inserted yet: the business check below may still reject the row.
    let mut insert_user = false;
    match store.get_user(&row.user_id) {
        Some(user) => check_consistency("user", user, &row.user_name, user_avg)?,
        None => insert_user = true,
    }

    match store.get_business(&row.business_id) {
        Some(business) => check_consistency("business", business, &row.biz_name, business_avg)?,
        None => {
            store.insert_business(RatingRecord::new(
                &row.business_id,
                &row.biz_name,
                business_avg,
            ));
        }
    }

    if insert_user {
        store.insert_user(RatingRecord::new(&row.user_id, &row.user_name, user_avg));
    }

    store.insert_rating(&row.user_id, &row.business_id, stars);
    Ok(())
}

fn parse_numeric(value: &str, field: &str) -> Result<f64> {
    value.trim().parse().map_err(|_| DataLoadError::MalformedInput {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn check_consistency(entity: &str, record: &RatingRecord, name: &str, avg: f64) -> Result<()> {
    let (stored_name, stored_avg) = record.summary();
    // Exact equality is the contract: the row restates the same dataset-wide
    // running average the entity arrived with, down to the last digit.
    if stored_name != name || stored_avg != avg {
        return Err(DataLoadError::DataInconsistency {
            entity: entity.to_string(),
            id: record.id.clone(),
            stored_name: stored_name.to_string(),
            stored_avg,
            name: name.to_string(),
            avg,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user: &str, business: &str, stars: &str) -> RawReview {
        RawReview::new(
            user,
            format!("Name {user}"),
            "3.5",
            business,
            format!("Biz {business}"),
            "4.0",
            stars,
        )
    }

    #[test]
    fn test_single_row_populates_both_sides() {
        let outcome = load_rows(vec![row("u1", "b1", "5")]);

        assert!(outcome.skipped.is_empty());
        let store = &outcome.store;
        assert_eq!(store.counts(), (1, 1, 1));
        assert_eq!(store.get_user("u1").unwrap().ratings["b1"], 5.0);
        assert_eq!(store.get_business("b1").unwrap().ratings["u1"], 5.0);
        assert_eq!(store.get_user("u1").unwrap().avg, 3.5);
        assert_eq!(store.get_business("b1").unwrap().avg, 4.0);
    }

    #[test]
    fn test_duplicate_pair_last_write_wins() {
        let outcome = load_rows(vec![row("u1", "b1", "2"), row("u1", "b1", "4")]);

        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.store.get_user("u1").unwrap().ratings["b1"], 4.0);
        assert_eq!(outcome.store.get_business("b1").unwrap().ratings["u1"], 4.0);
    }

    #[test]
    fn test_malformed_stars_skips_row() {
        let outcome = load_rows(vec![row("u1", "b1", "five"), row("u2", "b1", "4")]);

        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(
            outcome.skipped[0],
            DataLoadError::MalformedInput { ref field, .. } if field == "stars"
        ));
        // The bad row left nothing behind; the good row still loaded.
        assert!(outcome.store.get_user("u1").is_none());
        assert_eq!(outcome.store.counts(), (1, 1, 1));
    }

    #[test]
    fn test_user_mismatch_skips_row() {
        let mut second = row("u1", "b2", "4");
        second.user_name = "Somebody Else".to_string();

        let outcome = load_rows(vec![row("u1", "b1", "5"), second]);

        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(
            outcome.skipped[0],
            DataLoadError::DataInconsistency { ref entity, .. } if entity == "user"
        ));
        // The mismatching row created no business record either.
        assert!(outcome.store.get_business("b2").is_none());
    }

    #[test]
    fn test_business_mismatch_leaves_new_user_uncreated() {
        let mut second = row("u2", "b1", "4");
        second.business_avg = "1.0".to_string();

        let outcome = load_rows(vec![row("u1", "b1", "5"), second]);

        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(
            outcome.skipped[0],
            DataLoadError::DataInconsistency { ref entity, .. } if entity == "business"
        ));
        // u2 was new but its only row was rejected by the business check.
        assert!(outcome.store.get_user("u2").is_none());
    }

    #[test]
    fn test_malformed_user_avg_reported() {
        let mut bad = row("u1", "b1", "5");
        bad.user_avg = "n/a".to_string();

        let outcome = load_rows(vec![bad]);

        assert_eq!(outcome.store.counts(), (0, 0, 0));
        assert!(matches!(
            outcome.skipped[0],
            DataLoadError::MalformedInput { ref field, .. } if field == "user_avg"
        ));
    }
}
