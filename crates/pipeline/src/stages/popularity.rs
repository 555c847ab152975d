//! Filter to prune inactive reviewers and rarely-reviewed businesses.
//!
//! Shrinks a data set to a tractable size while biasing it toward the most
//! active reviewers and the most reviewed businesses. Pearson correlation
//! over a handful of shared reviews is noise; the thresholds cut that off at
//! the source.

use data_loader::{RatingRecord, RatingStore};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Removes users and businesses below activity thresholds.
///
/// ## Algorithm
/// Single pass, decided entirely from pre-filter counts:
/// 1. Collect the set of user ids with fewer than `min_user_ratings` reviews
///    and business ids with fewer than `min_business_ratings` reviews.
/// 2. Remove those records, then strip every retained record of ratings
///    whose counterpart is in the opposite drop set and recompute its
///    average from what is left.
/// 3. A retained record stripped of its last rating is dropped as well.
///
/// Records emptied in step 3 are NOT re-checked against their own
/// counterparts' thresholds; the pass runs once, it does not iterate to a
/// fixpoint. Applying the filter again when nothing violates the thresholds
/// leaves the store unchanged.
pub struct PopularityFilter {
    min_user_ratings: usize,
    min_business_ratings: usize,
}

impl PopularityFilter {
    /// Create a filter with the given activity thresholds.
    pub fn new(min_user_ratings: usize, min_business_ratings: usize) -> Self {
        Self {
            min_user_ratings,
            min_business_ratings,
        }
    }

    /// Prune the store in place.
    pub fn apply(&self, store: &mut RatingStore) {
        // Membership cannot be tested while pruning is in progress because
        // rating counts change under the deletions. Decide everything first.
        let drop_users: HashSet<String> = store
            .users()
            .iter()
            .filter(|(_, record)| record.rating_count() < self.min_user_ratings)
            .map(|(id, _)| id.clone())
            .collect();
        let drop_businesses: HashSet<String> = store
            .businesses()
            .iter()
            .filter(|(_, record)| record.rating_count() < self.min_business_ratings)
            .map(|(id, _)| id.clone())
            .collect();

        let (users_before, businesses_before, _) = store.counts();
        let (users, businesses) = store.parts_mut();
        prune_side(users, &drop_users, &drop_businesses);
        prune_side(businesses, &drop_businesses, &drop_users);

        let (users_after, businesses_after, _) = store.counts();
        debug!(
            users_before,
            users_after, businesses_before, businesses_after, "popularity filter applied"
        );
    }
}

/// Remove dropped records from one side and dropped counterparts' ratings
/// from the records that remain, recomputing averages as counts change.
fn prune_side(
    records: &mut HashMap<String, RatingRecord>,
    drop_records: &HashSet<String>,
    drop_counterparts: &HashSet<String>,
) {
    records.retain(|id, record| {
        if drop_records.contains(id) {
            return false;
        }
        record
            .ratings
            .retain(|counterpart, _| !drop_counterparts.contains(counterpart));
        if record.ratings.is_empty() {
            // Every review this record had was with a dropped counterpart.
            // It goes too, without re-checking anyone else's counts.
            return false;
        }
        record.recompute_avg();
        true
    });
}
