// Utility functions for recsys-service

use std::collections::HashSet;
use std::hash::Hash;

/// Keep the first occurrence of every key, preserving input order
pub fn dedup_preserving_order<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen: HashSet<K> = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Deduplicate, then truncate to `k`
pub fn dedup_truncate<T, K, F>(items: impl IntoIterator<Item = T>, k: usize, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut unique = dedup_preserving_order(items, key);
    unique.truncate(k);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let unique = dedup_preserving_order(vec![3_u64, 1, 3, 2, 1], |t| *t);
        assert_eq!(unique, vec![3, 1, 2]);
    }

    #[test]
    fn test_dedup_truncate() {
        let unique = dedup_truncate(vec![5_u64, 5, 4, 3, 2], 2, |t| *t);
        assert_eq!(unique, vec![5, 4]);

        let none = dedup_truncate(vec![5_u64, 4], 0, |t| *t);
        assert!(none.is_empty());
    }

    #[test]
    fn test_dedup_by_field() {
        let pairs = vec![(1_u64, 0.9), (2, 0.8), (1, 0.7)];
        let unique = dedup_preserving_order(pairs, |(id, _)| *id);
        assert_eq!(unique, vec![(1, 0.9), (2, 0.8)]);
    }
}
