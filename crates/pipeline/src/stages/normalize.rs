//! Removes per-reviewer rating bias from business ratings.
//!
//! Some reviewers like every business and some hate nearly all of them. To
//! make business ratings comparable across reviewers, each rating is
//! replaced by its difference from that reviewer's average, taken at the
//! time of normalization.

use crate::error::PipelineError;
use data_loader::RatingStore;
use tracing::{debug, warn};

/// Rewrites every business rating as `rating - reviewer_average` and
/// recomputes business averages over the shifted values. The user records
/// are left untouched.
///
/// A business rating whose reviewer is missing from the user records is a
/// referential violation: that single rating is dropped, logged, and
/// reported; a business left with no ratings is dropped entirely. The
/// shifted averages land near zero but not necessarily at it.
pub struct Normalizer;

impl Normalizer {
    /// Normalize the store in place, returning the violations encountered.
    pub fn apply(&self, store: &mut RatingStore) -> Vec<PipelineError> {
        let mut violations = Vec::new();

        let (users, businesses) = store.parts_mut();
        businesses.retain(|business_id, record| {
            record.ratings.retain(|user_id, rating| match users.get(user_id) {
                Some(user) => {
                    *rating -= user.avg;
                    true
                }
                None => {
                    warn!(%business_id, %user_id, "rating dropped: reviewer missing from user records");
                    violations.push(PipelineError::ReferentialViolation {
                        business_id: business_id.clone(),
                        user_id: user_id.clone(),
                    });
                    false
                }
            });
            if record.ratings.is_empty() {
                // Every rating referenced a missing reviewer
                return false;
            }
            record.recompute_avg();
            true
        });

        debug!(
            businesses = store.businesses().len(),
            violations = violations.len(),
            "ratings normalized"
        );
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::RatingRecord;

    #[test]
    fn test_ratings_shift_by_reviewer_average() {
        let mut store = RatingStore::new();
        store.insert_user(RatingRecord::new("u1", "Ann", 4.0));
        store.insert_user(RatingRecord::new("u2", "Ben", 2.0));
        store.insert_business(RatingRecord::new("b1", "Cafe One", 3.5));
        store.insert_rating("u1", "b1", 5.0);
        store.insert_rating("u2", "b1", 2.0);

        let violations = Normalizer.apply(&mut store);

        assert!(violations.is_empty());
        let b1 = store.get_business("b1").unwrap();
        assert_eq!(b1.ratings["u1"], 1.0);
        assert_eq!(b1.ratings["u2"], 0.0);
        // Average recomputed over the shifted values
        assert_eq!(b1.avg, 0.5);
        // User records keep their original values
        assert_eq!(store.get_user("u1").unwrap().ratings["b1"], 5.0);
        assert_eq!(store.get_user("u1").unwrap().avg, 4.0);
    }

    #[test]
    fn test_missing_reviewer_drops_single_rating() {
        let mut store = RatingStore::new();
        store.insert_user(RatingRecord::new("u1", "Ann", 4.0));
        store.insert_business(RatingRecord::new("b1", "Cafe One", 3.5));
        store.insert_rating("u1", "b1", 5.0);
        // Plant a rating from a reviewer that has no user record
        let (_, businesses) = store.parts_mut();
        businesses
            .get_mut("b1")
            .unwrap()
            .insert_rating("ghost", 3.0);

        let violations = Normalizer.apply(&mut store);

        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            PipelineError::ReferentialViolation { ref user_id, .. } if user_id == "ghost"
        ));
        let b1 = store.get_business("b1").unwrap();
        assert_eq!(b1.rating_count(), 1);
        assert_eq!(b1.ratings["u1"], 1.0);
    }

    #[test]
    fn test_business_with_only_ghost_ratings_is_dropped() {
        let mut store = RatingStore::new();
        store.insert_business(RatingRecord::new("b1", "Cafe One", 3.5));
        let (_, businesses) = store.parts_mut();
        businesses
            .get_mut("b1")
            .unwrap()
            .insert_rating("ghost", 3.0);

        let violations = Normalizer.apply(&mut store);

        assert_eq!(violations.len(), 1);
        assert!(store.get_business("b1").is_none());
    }
}
