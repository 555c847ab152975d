//! Grouping and ranking of similarity results.
//!
//! Lookups are by business display name, but different locations of one
//! chain share a name. The index is therefore an explicit two-level map,
//! name then business id, each id carrying its own ranked candidate list.

use data_loader::BusinessId;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One recommendation candidate: a counterpart business, its display name,
/// its post-normalization review average, the shrinkage-adjusted similarity
/// in [-1, 1], and how many common reviewers the estimate rests on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub business_id: BusinessId,
    pub name: String,
    pub avg: f64,
    pub similarity: f64,
    pub common_raters: usize,
}

/// Two-level lookup structure: display name → business id → candidates
/// ranked by similarity descending.
///
/// The nesting is fixed-arity on purpose: a name that is absent means "no
/// recommendations", and that is distinct from a name mapping to ids with
/// empty lists (which the engine never produces). Nothing auto-vivifies.
#[derive(Debug, Default)]
pub struct RecommendationIndex {
    by_name: HashMap<String, HashMap<BusinessId, Vec<SimilarityResult>>>,
}

impl RecommendationIndex {
    /// Creates a new, empty index
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }

    /// Append a candidate under the given business. Ranking happens once at
    /// the end via [`RecommendationIndex::rank_candidates`].
    pub(crate) fn insert(
        &mut self,
        name: String,
        business_id: BusinessId,
        result: SimilarityResult,
    ) {
        self.by_name
            .entry(name)
            .or_default()
            .entry(business_id)
            .or_default()
            .push(result);
    }

    /// Sort every candidate list by similarity descending, equal scores by
    /// ascending business id. The secondary key makes the ordering
    /// reproducible no matter how the parallel merge interleaved entries.
    pub(crate) fn rank_candidates(&mut self) {
        for businesses in self.by_name.values_mut() {
            for candidates in businesses.values_mut() {
                candidates.sort_by(|a, b| {
                    b.similarity
                        .partial_cmp(&a.similarity)
                        .unwrap_or(Ordering::Equal)
                        .then_with(|| a.business_id.cmp(&b.business_id))
                });
            }
        }
    }

    /// Look up recommendations by display name.
    ///
    /// `None` means the name is unknown, so no recommendations. `Some` hands
    /// back the complete mapping from business id to its full ranked list;
    /// trimming to a display limit is the caller's concern, applied after
    /// this lookup (a non-positive limit conventionally meaning unlimited).
    pub fn lookup(&self, name: &str) -> Option<&HashMap<BusinessId, Vec<SimilarityResult>>> {
        self.by_name.get(name)
    }

    /// Number of distinct display names with recommendations
    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }

    /// True when no business has any recommendation
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
