//! Single-process host for the ranker
//!
//! Event sources parse input lines and push [`HashtagEvent`]s into a bounded
//! mpsc channel. One ingestion task owns the [`FrequencyRanker`] and drains
//! the channel. It reports on the cooperative or the independent timer.
//!
//! [`HashtagEvent`]: crate::ranker_core::HashtagEvent
//! [`FrequencyRanker`]: crate::ranker_core::FrequencyRanker

pub mod ingestion;
pub mod reader;

pub use ingestion::{start_ranker_ingestion, IngestionSummary};
pub use reader::{forward_lines, run_event_source, EventSource, SourceStats, TailReader};
