//! Count-keyed grouping of a window snapshot

use crate::config::RankTruncation;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// Groups with a count at or below this are noise and never reported
pub const NOISE_THRESHOLD: u64 = 2;

/// Tokens sharing one occurrence count within a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankGroup {
    pub count: u64,
    /// Sorted ascending
    pub tokens: Vec<String>,
}

/// Tokens bucketed by their count, highest count first
#[derive(Debug, Default)]
pub struct FrequencyGroups {
    buckets: BTreeMap<Reverse<u64>, Vec<String>>,
}

impl FrequencyGroups {
    pub fn from_counts(counts: &HashMap<String, u64>) -> Self {
        let mut buckets: BTreeMap<Reverse<u64>, Vec<String>> = BTreeMap::new();
        for (token, count) in counts {
            buckets.entry(Reverse(*count)).or_default().push(token.clone());
        }
        Self { buckets }
    }

    /// Number of distinct counts
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Buckets in descending count order, tokens within a bucket unsorted
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[String])> {
        self.buckets
            .iter()
            .map(|(Reverse(count), tokens)| (*count, tokens.as_slice()))
    }

    /// Drop noise, sort each bucket and keep the top groups
    pub fn rank(self, rank_max_threshold: usize, truncation: RankTruncation) -> Vec<RankGroup> {
        let limit = truncation.group_limit(rank_max_threshold);
        let mut groups = Vec::with_capacity(limit.min(self.buckets.len()));

        for (Reverse(count), mut tokens) in self.buckets {
            if groups.len() >= limit {
                break;
            }
            if count <= NOISE_THRESHOLD {
                // Everything after this is smaller
                break;
            }
            tokens.sort_unstable();
            groups.push(RankGroup { count, tokens });
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(t, c)| (t.to_string(), *c)).collect()
    }

    #[test]
    fn test_groups_descending() {
        let input = counts(&[("a", 1), ("b", 7), ("c", 3), ("d", 7)]);
        let groups = FrequencyGroups::from_counts(&input);

        let keys: Vec<u64> = groups.iter().map(|(c, _)| c).collect();
        assert_eq!(keys, vec![7, 3, 1]);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_iter_buckets_hold_tied_tokens() {
        let input = counts(&[("b", 7), ("d", 7), ("c", 3)]);
        let groups = FrequencyGroups::from_counts(&input);

        let (count, tokens) = groups.iter().next().unwrap();
        let mut tokens = tokens.to_vec();
        tokens.sort();
        assert_eq!(count, 7);
        assert_eq!(tokens, vec!["b", "d"]);
    }

    #[test]
    fn test_rank_filters_noise() {
        let groups = FrequencyGroups::from_counts(&counts(&[("a", 1), ("b", 2), ("c", 3)]));
        let ranked = groups.rank(10, RankTruncation::Exact);

        assert_eq!(
            ranked,
            vec![RankGroup {
                count: 3,
                tokens: vec!["c".to_string()]
            }]
        );
    }

    #[test]
    fn test_rank_ties_sorted() {
        let input = counts(&[("zeta", 5), ("alpha", 5), ("mid", 5), ("x", 4)]);
        let groups = FrequencyGroups::from_counts(&input);
        let ranked = groups.rank(1, RankTruncation::Exact);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].count, 5);
        assert_eq!(ranked[0].tokens, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_rank_truncation_modes() {
        let input = counts(&[("a", 9), ("b", 8), ("c", 7), ("d", 6), ("e", 5)]);

        let exact = FrequencyGroups::from_counts(&input).rank(2, RankTruncation::Exact);
        assert_eq!(exact.iter().map(|g| g.count).collect::<Vec<_>>(), vec![9, 8]);

        let legacy = FrequencyGroups::from_counts(&input).rank(2, RankTruncation::Legacy);
        assert_eq!(legacy.iter().map(|g| g.count).collect::<Vec<_>>(), vec![9, 8, 7]);
    }

    #[test]
    fn test_rank_fewer_groups_than_threshold() {
        let input = counts(&[("a", 4), ("b", 3), ("c", 1)]);

        for truncation in [RankTruncation::Exact, RankTruncation::Legacy] {
            let ranked = FrequencyGroups::from_counts(&input).rank(2, truncation);
            assert_eq!(ranked.len(), 2);
        }
    }

    #[test]
    fn test_rank_empty() {
        let groups = FrequencyGroups::from_counts(&HashMap::new());
        assert!(groups.is_empty());
        assert!(groups.rank(3, RankTruncation::Exact).is_empty());
    }
}
