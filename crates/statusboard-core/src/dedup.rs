//! First-occurrence deduplication.

use std::collections::HashSet;
use std::hash::Hash;

/// Keep only the first item for each key, preserving input order.
pub fn uniq_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key_fn: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key_fn(item)))
        .collect()
}
