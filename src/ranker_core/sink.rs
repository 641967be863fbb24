//! Report sink trait and the log-backed default sink

use super::report::Report;

#[derive(Debug)]
pub enum ReportSinkError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl From<std::io::Error> for ReportSinkError {
    fn from(err: std::io::Error) -> Self {
        ReportSinkError::Io(err)
    }
}

impl From<serde_json::Error> for ReportSinkError {
    fn from(err: serde_json::Error) -> Self {
        ReportSinkError::Serialization(err)
    }
}

impl std::fmt::Display for ReportSinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportSinkError::Io(e) => write!(f, "IO error: {}", e),
            ReportSinkError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for ReportSinkError {}

/// Destination for finished reports
pub trait ReportSink: Send {
    /// Hand over one report
    fn emit(&mut self, report: &Report) -> Result<(), ReportSinkError>;

    /// Flush pending writes to storage
    fn flush(&mut self) -> Result<(), ReportSinkError> {
        Ok(())
    }

    /// Get sink type for logging
    fn sink_type(&self) -> &'static str;
}

/// Writes the summary line and the table through the `log` facade
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn emit(&mut self, report: &Report) -> Result<(), ReportSinkError> {
        log::info!("{}", report.summary_line());
        log::info!("\n{}", report.render_table());
        Ok(())
    }

    fn sink_type(&self) -> &'static str {
        "log"
    }
}
