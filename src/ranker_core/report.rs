//! Rendered output of one reporting window

use super::frequency::RankGroup;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// 1 for the first report of this ranker
    pub run_index: u64,
    pub generated_at: DateTime<Utc>,
    /// Token occurrences counted in the window
    pub total_occurrences: u64,
    pub distinct_tokens: usize,
    /// Occurrences refused by the distinct token cap
    pub dropped_occurrences: u64,
    pub groups: Vec<RankGroup>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// `At <time>, total # of hashtags received in run#<n>: <total>`
    pub fn summary_line(&self) -> String {
        format!(
            "At {}, total # of hashtags received in run#{}: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.run_index,
            self.total_occurrences
        )
    }

    /// One `\t<count> ==> [tokens]` line per group
    ///
    /// Counts are right-aligned to the width of the first row's count. The
    /// width never grows for later rows.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let mut width = 0;

        for group in &self.groups {
            let label = group.count.to_string();
            if width == 0 {
                width = label.len();
            }
            out.push_str(&format!(
                "\t{:>width$} ==> [{}]\n",
                label,
                group.tokens.join(", "),
                width = width
            ));
        }

        out
    }
}
