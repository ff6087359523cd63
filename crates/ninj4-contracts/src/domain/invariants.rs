//! # Domain Invariants
//!
//! Checks over values assembled from several independent reads. Reads are
//! not consistent across block heights, so violations are reported, not
//! enforced.

use std::collections::HashSet;

use super::entities::CollectionState;

/// `total_minted <= max_supply` whenever a cap is known.
#[must_use]
pub fn invariant_minted_within_supply(state: &CollectionState) -> bool {
    state.max_supply == 0 || state.total_minted <= state.max_supply
}

/// Owned token ids contain no duplicates.
#[must_use]
pub fn invariant_unique_token_ids(ids: &[u64]) -> bool {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().all(|id| seen.insert(*id))
}
