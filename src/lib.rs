//! tagrank - streaming hashtag frequency ranking
//!
//! Counts hashtags per time window and periodically reports the most frequent
//! ones grouped by count. See [`ranker_core::FrequencyRanker`].

pub mod config;
pub mod pipeline;
pub mod ranker_core;

pub use config::{ConfigError, HostConfig, InputFormat, RankTruncation, RankerConfig, TimerMode};
pub use ranker_core::{FrequencyRanker, HashtagEvent, Report};
