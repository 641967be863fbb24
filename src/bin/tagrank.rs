//! tagrank - rank hashtags from an event stream
//!
//! ## Usage
//!
//! ```bash
//! LOG_INTERVAL_SECS=30 RANK_MAX_THRESHOLD=10 cargo run --release --bin tagrank < events.jsonl
//! INPUT_PATH=events.jsonl cargo run --release --bin tagrank -- --follow
//! ```
//!
//! ## Environment Variables
//!
//! - LOG_INTERVAL_SECS - Seconds between reports (required)
//! - RANK_MAX_THRESHOLD - Number of count groups per report (required)
//! - MAX_DISTINCT_TOKENS - Per-window distinct hashtag cap (default: unbounded)
//! - RANK_TRUNCATION - exact | legacy (default: exact)
//! - TIMER_MODE - cooperative | independent (default: cooperative)
//! - INPUT_PATH - Events file (default: stdin)
//! - INPUT_FORMAT - jsonl | text (default: jsonl)
//! - REPORT_OUTPUT_PATH - Append reports as JSONL (default: log only)
//! - EVENT_CHANNEL_BUFFER - Channel size between reader and ranker (default: 10000)
//! - RUST_LOG - Logging level (optional, default: info)

use tagrank::config::{HostConfig, RankerConfig};
use tagrank::pipeline::{run_event_source, start_ranker_ingestion, EventSource};
use tagrank::ranker_core::{FrequencyRanker, HashtagEvent, JsonlReportWriter};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let ranker_config = RankerConfig::from_env()?;
    let host_config = HostConfig::from_env()?;
    let source = EventSource::from_config(&host_config);

    log::info!("🚀 Starting tagrank");
    log::info!("   Input: {} ({})", source.describe(), host_config.input_format.as_str());
    log::info!("   Report interval: {}s", ranker_config.log_interval_secs);
    log::info!(
        "   Rank threshold: {} ({} truncation)",
        ranker_config.rank_max_threshold,
        ranker_config.truncation.as_str()
    );
    log::info!("   Timer: {}", host_config.timer_mode.as_str());
    match ranker_config.max_distinct_tokens {
        Some(cap) => log::info!("   Distinct hashtag cap: {}", cap),
        None => log::info!("   Distinct hashtag cap: none"),
    }

    let mut ranker = FrequencyRanker::new(ranker_config);
    if let Some(path) = &host_config.report_output_path {
        ranker.add_sink(Box::new(JsonlReportWriter::new(path)?));
    }

    let (tx, rx) = mpsc::channel::<HashtagEvent>(host_config.channel_buffer);

    let source_handle = tokio::spawn(run_event_source(source, host_config.input_format, tx));

    let summary = start_ranker_ingestion(rx, ranker, host_config.timer_mode).await;

    match source_handle.await? {
        Ok(stats) => {
            if stats.malformed > 0 {
                log::warn!("⚠️  {} malformed events were skipped", stats.malformed);
            }
        }
        Err(e) => {
            log::error!("❌ Event source failed: {}", e);
            return Err(e.into());
        }
    }

    if summary.sink_errors > 0 {
        log::warn!("⚠️  {} reports failed to reach a sink", summary.sink_errors);
    }

    Ok(())
}
