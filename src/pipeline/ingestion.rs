//! Ranker ingestion - async channel processor for hashtag events
//!
//! The ranker lives inside this task and is never shared, so no lock is
//! needed. Producers only see the sending half of the channel.

use crate::config::TimerMode;
use crate::ranker_core::{FrequencyRanker, HashtagEvent, RankerError, Report};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, Instant, Interval, MissedTickBehavior};

/// Counters for one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionSummary {
    pub events_processed: u64,
    /// Hashtags carried by the processed events
    pub hashtags_received: u64,
    pub reports_emitted: u64,
    pub sink_errors: u64,
}

/// Feed events from `rx` into the ranker until the channel closes
///
/// - `Cooperative`: the interval is checked on every event, as the ranker does
///   on its own.
/// - `Independent`: events are only recorded and a tokio interval closes the
///   window on the wall clock, even while the stream is silent.
///
/// When the channel closes, whatever is left in the open window is emitted as
/// a final report.
pub async fn start_ranker_ingestion(
    mut rx: mpsc::Receiver<HashtagEvent>,
    mut ranker: FrequencyRanker,
    timer_mode: TimerMode,
) -> IngestionSummary {
    let interval_secs = ranker.config().log_interval_secs;

    log::info!("🚀 Starting hashtag ingestion");
    log::info!("   ├─ Report interval: {}s ({} timer)", interval_secs, timer_mode.as_str());
    log::info!(
        "   ├─ Rank threshold: {} ({})",
        ranker.config().rank_max_threshold,
        ranker.config().truncation.as_str()
    );
    log::info!("   └─ Waiting for events...");

    let independent = timer_mode == TimerMode::Independent;
    let mut flush_timer = if independent {
        // A zero period would panic in tokio
        let mut timer = interval(Duration::from_secs(interval_secs.max(1)));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer.tick().await; // Skip first immediate tick
        Some(timer)
    } else {
        None
    };

    let mut summary = IngestionSummary::default();

    loop {
        tokio::select! {
            maybe_event = rx.recv() => {
                let event = match maybe_event {
                    Some(event) => event,
                    None => break,
                };

                summary.events_processed += 1;
                summary.hashtags_received += event.len() as u64;

                if independent {
                    ranker.record(&event);
                } else {
                    let result = ranker.on_event_at(&event, Instant::now().into_std());
                    track_report(&mut summary, result);
                }
            }

            _ = next_flush(&mut flush_timer) => {
                let result = ranker.flush(Instant::now().into_std());
                track_report(&mut summary, result.map(Some));
            }
        }
    }

    if !ranker.accumulator().is_empty() {
        log::info!("🏁 Event stream closed, emitting final report");
        let result = ranker.flush(Instant::now().into_std());
        track_report(&mut summary, result.map(Some));
    }

    if let Err(e) = ranker.flush_sinks() {
        log::error!("❌ Failed to flush report sinks: {}", e);
    }

    log::info!(
        "✅ Ingestion finished: {} events, {} hashtags, {} reports",
        summary.events_processed,
        summary.hashtags_received,
        summary.reports_emitted
    );

    summary
}

/// Next independent tick; never resolves without a timer
async fn next_flush(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn track_report(summary: &mut IngestionSummary, result: Result<Option<Report>, RankerError>) {
    match result {
        Ok(Some(report)) => {
            summary.reports_emitted += 1;
            log::debug!(
                "📊 run#{} emitted {} groups ({} hashtags)",
                report.run_index,
                report.groups.len(),
                report.total_occurrences
            );
        }
        Ok(None) => {}
        Err(e) => {
            // The window is already closed; the report is lost for that sink only
            summary.reports_emitted += 1;
            summary.sink_errors += 1;
            log::error!("❌ Report emission failed: {}", e);
        }
    }
}
