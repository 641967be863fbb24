//! Ranker Core - windowed hashtag frequency ranking
//!
//! # Architecture
//!
//! ```text
//! HashtagEvent → Accumulator (token → count, per window)
//!     ↓ interval elapsed
//! WindowSnapshot → FrequencyGroups (count → tokens, descending)
//!     ↓ noise filter, tie sort, truncation
//! Report → ReportSink (log table, JSONL)
//! ```

pub mod accumulator;
pub mod event;
pub mod frequency;
pub mod jsonl_sink;
pub mod ranker;
pub mod report;
pub mod sink;

pub use accumulator::{Accumulator, WindowSnapshot};
pub use event::{extract_hashtags, HashtagEvent};
pub use frequency::{FrequencyGroups, RankGroup, NOISE_THRESHOLD};
pub use jsonl_sink::JsonlReportWriter;
pub use ranker::{FrequencyRanker, RankerError};
pub use report::Report;
pub use sink::{LogSink, ReportSink, ReportSinkError};
