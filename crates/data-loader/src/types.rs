//! Core domain types for the review dataset.
//!
//! This module defines the fundamental data structures used throughout the system.
//! Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (UserId, BusinessId)
//! - Structs with public fields
//! - Derive macros for common traits
//! - HashMap for id-keyed lookups

use serde::Serialize;
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================
// Ids in the review dataset are opaque string hashes, not integers.
// These aliases keep user ids and business ids from being mixed up.

/// Unique identifier for a reviewer
pub type UserId = String;

/// Unique identifier for a business
pub type BusinessId = String;

// =============================================================================
// RatingRecord
// =============================================================================

/// One side of the dual review index: an entity (user or business) together
/// with its display name, its ratings keyed by counterpart id, and the running
/// average of those ratings.
///
/// A user record keys its ratings by business id; a business record keys its
/// ratings by user id. The same review value is stored in both records.
///
/// The `avg` field starts as the dataset-supplied running average that arrived
/// with the entity's rows (it covers the entity's full review history, not just
/// the rows in one file). After any post-load mutation the caller restores
/// `avg == mean(ratings.values())` via [`RatingRecord::recompute_avg`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingRecord {
    pub id: String,
    pub name: String,
    /// Ratings keyed by counterpart id (business ids inside a user record,
    /// user ids inside a business record). Keys are unique, so a repeated
    /// (user, business) pair overwrites the earlier value.
    pub ratings: HashMap<String, f64>,
    pub avg: f64,
}

impl RatingRecord {
    /// Create an empty record with the given identity and running average.
    pub fn new(id: impl Into<String>, name: impl Into<String>, avg: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ratings: HashMap::new(),
            avg,
        }
    }

    /// The data a repeated row must restate exactly: display name and average.
    pub fn summary(&self) -> (&str, f64) {
        (&self.name, self.avg)
    }

    /// Upsert a rating for the given counterpart. Last write wins.
    pub fn insert_rating(&mut self, counterpart: impl Into<String>, value: f64) {
        self.ratings.insert(counterpart.into(), value);
    }

    /// Number of ratings currently held by this record.
    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }

    /// Recompute `avg` as the mean of the current rating values.
    ///
    /// Callers never keep a record with zero ratings (emptied records are
    /// dropped from the store), so an empty map just leaves `avg` at 0.0.
    pub fn recompute_avg(&mut self) {
        if self.ratings.is_empty() {
            self.avg = 0.0;
            return;
        }
        let total: f64 = self.ratings.values().sum();
        self.avg = total / self.ratings.len() as f64;
    }
}

// =============================================================================
// RatingStore - The Dual Review Index
// =============================================================================

/// In-memory dual index of review data: every accepted review is stored twice,
/// once in the reviewer's record keyed by business id and once in the
/// business's record keyed by user id.
///
/// The two sides cross-reference each other by plain id strings resolved with
/// a map lookup, never by embedded links, so the structural cycle between
/// users and businesses never becomes an ownership cycle.
#[derive(Debug, Default)]
pub struct RatingStore {
    users: HashMap<UserId, RatingRecord>,
    businesses: HashMap<BusinessId, RatingRecord>,
}

impl RatingStore {
    /// Creates a new, empty RatingStore
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            businesses: HashMap::new(),
        }
    }

    // Getters - Note: These return references (&T) not owned values (T)

    /// Get a user record by id
    pub fn get_user(&self, id: &str) -> Option<&RatingRecord> {
        self.users.get(id)
    }

    /// Get a business record by id
    pub fn get_business(&self, id: &str) -> Option<&RatingRecord> {
        self.businesses.get(id)
    }

    /// All user records, keyed by user id
    pub fn users(&self) -> &HashMap<UserId, RatingRecord> {
        &self.users
    }

    /// All business records, keyed by business id
    pub fn businesses(&self) -> &HashMap<BusinessId, RatingRecord> {
        &self.businesses
    }

    /// Mutable access to both sides at once.
    ///
    /// The filter stage prunes both maps and the normalizer reads user
    /// averages while rewriting business ratings; handing out the two
    /// disjoint borrows together keeps that possible under one `&mut self`.
    pub fn parts_mut(
        &mut self,
    ) -> (
        &mut HashMap<UserId, RatingRecord>,
        &mut HashMap<BusinessId, RatingRecord>,
    ) {
        (&mut self.users, &mut self.businesses)
    }

    // Mutators - used during data loading

    /// Insert a user record into the store
    pub fn insert_user(&mut self, record: RatingRecord) {
        self.users.insert(record.id.clone(), record);
    }

    /// Insert a business record into the store
    pub fn insert_business(&mut self, record: RatingRecord) {
        self.businesses.insert(record.id.clone(), record);
    }

    /// Upsert a review into both sides of the dual index.
    ///
    /// Both records must already exist; the loader creates them before
    /// calling this. The two stored copies always carry the same value.
    pub fn insert_rating(&mut self, user_id: &str, business_id: &str, stars: f64) {
        if let Some(user) = self.users.get_mut(user_id) {
            user.insert_rating(business_id, stars);
        }
        if let Some(business) = self.businesses.get_mut(business_id) {
            business.insert_rating(user_id, stars);
        }
    }

    /// Get counts for debugging/validation: (users, businesses, reviews)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_reviews = self.users.values().map(|r| r.rating_count()).sum();
        (self.users.len(), self.businesses.len(), total_reviews)
    }
}
