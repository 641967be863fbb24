//! FrequencyRanker - windowed hashtag counting with periodic ranked reports
//!
//! Every event goes into the accumulator. After that the elapsed time since
//! the last report is checked. Once it reaches the configured interval the
//! window is snapshotted, grouped by count, ranked, handed to the sinks and
//! reset. No background clock is involved, so a stream that goes quiet does
//! not report until its next event arrives. Hosts that want wall-clock
//! reports call [`FrequencyRanker::flush`] from their own timer.

use super::accumulator::Accumulator;
use super::event::HashtagEvent;
use super::frequency::FrequencyGroups;
use super::report::Report;
use super::sink::{LogSink, ReportSink, ReportSinkError};
use crate::config::RankerConfig;
use chrono::Utc;
use std::time::Instant;

#[derive(Debug)]
pub enum RankerError {
    /// The host delivered an event that does not match the event contract
    MalformedEvent(serde_json::Error),
    Sink(ReportSinkError),
}

impl From<serde_json::Error> for RankerError {
    fn from(err: serde_json::Error) -> Self {
        RankerError::MalformedEvent(err)
    }
}

impl From<ReportSinkError> for RankerError {
    fn from(err: ReportSinkError) -> Self {
        RankerError::Sink(err)
    }
}

impl std::fmt::Display for RankerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankerError::MalformedEvent(e) => write!(f, "Malformed event: {}", e),
            RankerError::Sink(e) => write!(f, "Report sink error: {}", e),
        }
    }
}

impl std::error::Error for RankerError {}

pub struct FrequencyRanker {
    config: RankerConfig,
    accumulator: Accumulator,
    sinks: Vec<Box<dyn ReportSink>>,
    last_report: Instant,
    run_counter: u64,
}

impl FrequencyRanker {
    /// Ranker reporting through the log, clock started now
    pub fn new(config: RankerConfig) -> Self {
        Self::with_sinks(config, vec![Box::new(LogSink)])
    }

    pub fn with_sinks(config: RankerConfig, sinks: Vec<Box<dyn ReportSink>>) -> Self {
        Self::started_at(config, sinks, Instant::now())
    }

    /// Ranker whose first window opened at `start`
    pub fn started_at(
        config: RankerConfig,
        sinks: Vec<Box<dyn ReportSink>>,
        start: Instant,
    ) -> Self {
        let accumulator = Accumulator::with_max_distinct(config.max_distinct_tokens);
        Self {
            config,
            accumulator,
            sinks,
            last_report: start,
            run_counter: 0,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn ReportSink>) {
        log::debug!("Adding {} report sink", sink.sink_type());
        self.sinks.push(sink);
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// Number of reports produced so far
    pub fn run_counter(&self) -> u64 {
        self.run_counter
    }

    /// Parse a JSONL event and process it
    pub fn process_line(&mut self, line: &str) -> Result<Option<Report>, RankerError> {
        let event = HashtagEvent::from_jsonl(line)?;
        self.on_event(&event)
    }

    /// Record an event and report if the interval has elapsed
    pub fn on_event(&mut self, event: &HashtagEvent) -> Result<Option<Report>, RankerError> {
        self.on_event_at(event, Instant::now())
    }

    pub fn on_event_at(
        &mut self,
        event: &HashtagEvent,
        now: Instant,
    ) -> Result<Option<Report>, RankerError> {
        self.record(event);

        if self.is_due(now) {
            return self.flush(now).map(Some);
        }

        Ok(None)
    }

    /// Record an event without checking the timer
    pub fn record(&mut self, event: &HashtagEvent) -> usize {
        self.accumulator.record(&event.hashtags)
    }

    /// Whether the window opened at the last report has lasted long enough
    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_report).as_secs() >= self.config.log_interval_secs
    }

    /// Close the current window: rank, emit, reset and restart the clock
    ///
    /// The window is reset even when a sink fails; the first sink error is
    /// returned after every sink has been tried.
    pub fn flush(&mut self, now: Instant) -> Result<Report, RankerError> {
        let snapshot = self.accumulator.snapshot_and_reset();
        self.last_report = now;
        self.run_counter += 1;

        let distinct_tokens = snapshot.distinct();
        let groups = FrequencyGroups::from_counts(&snapshot.counts)
            .rank(self.config.rank_max_threshold, self.config.truncation);

        let report = Report {
            run_index: self.run_counter,
            generated_at: Utc::now(),
            total_occurrences: snapshot.total,
            distinct_tokens,
            dropped_occurrences: snapshot.dropped,
            groups,
        };

        if report.dropped_occurrences > 0 {
            log::warn!(
                "⚠️  run#{}: {} occurrences dropped by the distinct token cap",
                report.run_index,
                report.dropped_occurrences
            );
        }

        let mut first_error = None;
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.emit(&report) {
                log::error!("❌ Failed to emit report to {} sink: {}", sink.sink_type(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(report),
        }
    }

    /// Flush every sink's buffered output
    pub fn flush_sinks(&mut self) -> Result<(), RankerError> {
        for sink in self.sinks.iter_mut() {
            sink.flush()?;
        }
        Ok(())
    }
}
