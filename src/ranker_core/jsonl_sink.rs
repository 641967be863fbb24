//! JSONL sink - appends every report as one JSON object per line

use super::report::Report;
use super::sink::{ReportSink, ReportSinkError};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct JsonlReportWriter {
    path: PathBuf,
    writer: BufWriter<std::fs::File>,
}

impl JsonlReportWriter {
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        log::info!("📝 Writing reports to: {}", path.display());

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonlReportWriter {
    fn emit(&mut self, report: &Report) -> Result<(), ReportSinkError> {
        let json = serde_json::to_string(report)?;
        writeln!(self.writer, "{}", json)?;
        // Reports are infrequent, keep the file current
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReportSinkError> {
        self.writer.flush()?;
        Ok(())
    }

    fn sink_type(&self) -> &'static str {
        "JSONL"
    }
}

impl Drop for JsonlReportWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
