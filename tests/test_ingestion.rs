//! Integration tests for the async host: channel → ingestion loop → sinks
//!
//! Runs on a paused tokio clock so interval timing is deterministic.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tagrank::config::{RankerConfig, TimerMode};
use tagrank::pipeline::{forward_lines, start_ranker_ingestion};
use tagrank::ranker_core::{
    FrequencyRanker, HashtagEvent, JsonlReportWriter, Report, ReportSink, ReportSinkError,
};
use tagrank::InputFormat;
use tokio::sync::mpsc;

#[derive(Clone, Default)]
struct CollectingSink(Arc<Mutex<Vec<Report>>>);

impl CollectingSink {
    fn reports(&self) -> Vec<Report> {
        self.0.lock().unwrap().clone()
    }
}

impl ReportSink for CollectingSink {
    fn emit(&mut self, report: &Report) -> Result<(), ReportSinkError> {
        self.0.lock().unwrap().push(report.clone());
        Ok(())
    }

    fn sink_type(&self) -> &'static str {
        "collecting"
    }
}

fn ranker(interval: u64, threshold: usize, sink: &CollectingSink) -> FrequencyRanker {
    FrequencyRanker::started_at(
        RankerConfig::new(interval, threshold).unwrap(),
        vec![Box::new(sink.clone())],
        tokio::time::Instant::now().into_std(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_cooperative_reports_only_on_events() {
    let sink = CollectingSink::default();
    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(start_ranker_ingestion(
        rx,
        ranker(10, 2, &sink),
        TimerMode::Cooperative,
    ));

    tx.send(HashtagEvent::new(["a", "b", "a", "c", "a", "b"])).await.unwrap();
    tx.send(HashtagEvent::new(["b"])).await.unwrap();

    // Interval passes with no input: nothing is reported
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(sink.reports().is_empty());

    // Next event triggers the check
    tx.send(HashtagEvent::new(["a"])).await.unwrap();
    drop(tx);
    let summary = handle.await.unwrap();

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].total_occurrences, 7);
    assert_eq!(reports[0].groups.len(), 2);
    assert_eq!(reports[0].groups[0].count, 4);
    assert_eq!(reports[0].groups[0].tokens, vec!["a"]);
    assert_eq!(reports[0].groups[1].count, 3);
    assert_eq!(reports[0].groups[1].tokens, vec!["b"]);

    assert_eq!(summary.events_processed, 3);
    assert_eq!(summary.hashtags_received, 7);
    assert_eq!(summary.reports_emitted, 1);
    assert_eq!(summary.sink_errors, 0);
}

#[tokio::test(start_paused = true)]
async fn test_independent_timer_reports_silent_stream() {
    let sink = CollectingSink::default();
    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(start_ranker_ingestion(
        rx,
        ranker(10, 5, &sink),
        TimerMode::Independent,
    ));

    tx.send(HashtagEvent::new(["x", "x", "x", "y"])).await.unwrap();

    // No further events; the wall-clock timer closes the window
    tokio::time::sleep(Duration::from_secs(11)).await;

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].total_occurrences, 4);
    assert_eq!(reports[0].groups.len(), 1);
    assert_eq!(reports[0].groups[0].tokens, vec!["x"]);

    // Second window is empty but still reported
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(sink.reports().len(), 2);
    assert_eq!(sink.reports()[1].total_occurrences, 0);

    drop(tx);
    let summary = handle.await.unwrap();
    assert_eq!(summary.reports_emitted, 2);
    assert_eq!(summary.events_processed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_final_report_on_close() {
    let sink = CollectingSink::default();
    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(start_ranker_ingestion(
        rx,
        ranker(60, 3, &sink),
        TimerMode::Cooperative,
    ));

    tx.send(HashtagEvent::new(["late", "late", "late"])).await.unwrap();
    drop(tx);
    let summary = handle.await.unwrap();

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].run_index, 1);
    assert_eq!(reports[0].groups[0].tokens, vec!["late"]);
    assert_eq!(summary.reports_emitted, 1);
}

#[tokio::test(start_paused = true)]
async fn test_closed_empty_stream_emits_nothing() {
    let sink = CollectingSink::default();
    let (tx, rx) = mpsc::channel::<HashtagEvent>(4);
    drop(tx);

    let summary = start_ranker_ingestion(rx, ranker(10, 3, &sink), TimerMode::Cooperative).await;

    assert!(sink.reports().is_empty());
    assert_eq!(summary.events_processed, 0);
    assert_eq!(summary.reports_emitted, 0);
}

#[tokio::test]
async fn test_zero_interval_cooperative_reports_every_event() {
    // Public fields allow bypassing RankerConfig::new validation
    let sink = CollectingSink::default();
    let mut config = RankerConfig::new(10, 3).unwrap();
    config.log_interval_secs = 0;
    let ranker = FrequencyRanker::with_sinks(config, vec![Box::new(sink.clone())]);

    let (tx, rx) = mpsc::channel(4);
    tx.send(HashtagEvent::new(["a", "a", "a"])).await.unwrap();
    tx.send(HashtagEvent::new(["b"])).await.unwrap();
    drop(tx);

    let summary = start_ranker_ingestion(rx, ranker, TimerMode::Cooperative).await;

    assert_eq!(summary.reports_emitted, 2);
    let reports = sink.reports();
    assert_eq!(reports[0].groups[0].tokens, vec!["a"]);
    assert_eq!(reports[1].total_occurrences, 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_independent_does_not_panic() {
    let sink = CollectingSink::default();
    let mut config = RankerConfig::new(10, 3).unwrap();
    config.log_interval_secs = 0;
    let ranker = FrequencyRanker::started_at(
        config,
        vec![Box::new(sink.clone())],
        tokio::time::Instant::now().into_std(),
    );

    let (tx, rx) = mpsc::channel(4);
    let handle = tokio::spawn(start_ranker_ingestion(rx, ranker, TimerMode::Independent));

    tx.send(HashtagEvent::new(["x", "x", "x"])).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    drop(tx);
    handle.await.unwrap();

    let reports = sink.reports();
    assert!(!reports.is_empty());
    assert_eq!(reports[0].groups[0].tokens, vec!["x"]);
}

#[tokio::test]
async fn test_lines_to_jsonl_reports() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = temp_dir.path().join("reports.jsonl");

    let input = "\
{\"hashtags\":[\"rust\",\"rust\"]}
not json at all
{\"hashtags\":[\"rust\",\"tokio\",\"tokio\",\"tokio\"]}
";

    let mut ranker = FrequencyRanker::with_sinks(RankerConfig::new(3600, 10).unwrap(), Vec::new());
    ranker.add_sink(Box::new(JsonlReportWriter::new(&output).unwrap()));

    let (tx, rx) = mpsc::channel(8);
    let ingestion = tokio::spawn(start_ranker_ingestion(rx, ranker, TimerMode::Cooperative));

    let stats = forward_lines(tokio::io::BufReader::new(input.as_bytes()), InputFormat::Jsonl, &tx)
        .await
        .unwrap();
    drop(tx);
    let summary = ingestion.await.unwrap();

    assert_eq!(stats.events_sent, 2);
    assert_eq!(stats.malformed, 1);
    assert_eq!(summary.reports_emitted, 1);

    let contents = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["total_occurrences"], 6);
    assert_eq!(lines[0]["groups"][0]["count"], 3);
    assert_eq!(lines[0]["groups"][0]["tokens"][0], "rust");
    assert_eq!(lines[0]["groups"][0]["tokens"][1], "tokio");
}
