//! Per-window token occurrence counts

use std::collections::HashMap;

/// Counts taken out of an [`Accumulator`] at the end of a window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub counts: HashMap<String, u64>,
    /// Sum of all counts
    pub total: u64,
    /// Occurrences refused by the cardinality cap
    pub dropped: u64,
}

impl WindowSnapshot {
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Running multiset of tokens seen since the last reset
///
/// Every tracked token has a count of at least 1 and `total` always equals
/// the sum of the counts.
#[derive(Debug, Default)]
pub struct Accumulator {
    counts: HashMap<String, u64>,
    total: u64,
    max_distinct: Option<usize>,
    dropped: u64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator that tracks at most `max_distinct` tokens per window
    ///
    /// Once full, tokens already tracked keep counting and new ones are dropped.
    pub fn with_max_distinct(max_distinct: Option<usize>) -> Self {
        Self {
            max_distinct,
            ..Self::default()
        }
    }

    /// Count one occurrence of every token. Returns the number recorded.
    pub fn record<I, S>(&mut self, tokens: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut recorded = 0;

        for token in tokens {
            let token = token.as_ref();

            if let Some(count) = self.counts.get_mut(token) {
                *count += 1;
            } else if self.has_room() {
                self.counts.insert(token.to_owned(), 1);
            } else {
                if self.dropped == 0 {
                    log::warn!(
                        "⚠️  Distinct token cap of {} reached, dropping new tokens this window",
                        self.counts.len()
                    );
                }
                self.dropped += 1;
                continue;
            }

            self.total += 1;
            recorded += 1;
        }

        recorded
    }

    /// Hand out the current counts and start an empty window
    pub fn snapshot_and_reset(&mut self) -> WindowSnapshot {
        let snapshot = WindowSnapshot {
            counts: std::mem::take(&mut self.counts),
            total: self.total,
            dropped: self.dropped,
        };
        self.total = 0;
        self.dropped = 0;
        snapshot
    }

    /// Copy of the current counts, state untouched
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            counts: self.counts.clone(),
            total: self.total,
            dropped: self.dropped,
        }
    }

    pub fn count(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of occurrences recorded this window
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn has_room(&self) -> bool {
        self.max_distinct.map_or(true, |cap| self.counts.len() < cap)
    }
}
