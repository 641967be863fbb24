//! Event sources: stdin, a file, or a tailed file feeding the ranker channel

use crate::config::{HostConfig, InputFormat};
use crate::ranker_core::HashtagEvent;
use std::io::SeekFrom;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::sleep;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    Stdin,
    File(PathBuf),
    /// Read lines appended to the file, following rotation
    Follow(PathBuf),
}

impl EventSource {
    pub fn from_config(config: &HostConfig) -> Self {
        match (&config.input_path, config.follow) {
            (Some(path), true) => EventSource::Follow(path.clone()),
            (Some(path), false) => EventSource::File(path.clone()),
            (None, _) => EventSource::Stdin,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            EventSource::Stdin => "stdin".to_string(),
            EventSource::File(path) => path.display().to_string(),
            EventSource::Follow(path) => format!("{} (follow)", path.display()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub lines_read: u64,
    pub events_sent: u64,
    pub malformed: u64,
}

/// Read `source` line by line and send parsed events to `tx`
///
/// Malformed lines are logged and skipped. Returns when the input ends or the
/// receiver is dropped; a followed file only ends with the receiver.
pub async fn run_event_source(
    source: EventSource,
    format: InputFormat,
    tx: mpsc::Sender<HashtagEvent>,
) -> std::io::Result<SourceStats> {
    log::info!("📖 Reading {} events from {}", format.as_str(), source.describe());

    match source {
        EventSource::Stdin => forward_lines(BufReader::new(tokio::io::stdin()), format, &tx).await,
        EventSource::File(path) => {
            let file = File::open(&path).await?;
            forward_lines(BufReader::new(file), format, &tx).await
        }
        EventSource::Follow(path) => {
            let mut reader = TailReader::new(path);
            reader.start().await?;

            let mut stats = SourceStats::default();
            loop {
                let line = tokio::select! {
                    line = reader.read_line() => line?,
                    _ = tx.closed() => break,
                };
                if let Some(line) = line {
                    if !forward_line(&line, format, &tx, &mut stats).await {
                        break;
                    }
                }
            }
            Ok(stats)
        }
    }
}

/// Forward every line of `reader` until EOF
pub async fn forward_lines<R>(
    reader: R,
    format: InputFormat,
    tx: &mpsc::Sender<HashtagEvent>,
) -> std::io::Result<SourceStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = SourceStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if !forward_line(&line, format, tx, &mut stats).await {
            break;
        }
    }

    log::info!(
        "📖 Input finished: {} lines, {} events, {} malformed",
        stats.lines_read,
        stats.events_sent,
        stats.malformed
    );

    Ok(stats)
}

/// Returns false once the receiver is gone
async fn forward_line(
    line: &str,
    format: InputFormat,
    tx: &mpsc::Sender<HashtagEvent>,
    stats: &mut SourceStats,
) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return true;
    }
    stats.lines_read += 1;

    match HashtagEvent::parse(line, format) {
        Ok(event) => {
            if tx.send(event).await.is_err() {
                log::warn!("⚠️  Ranker channel closed, stopping input");
                return false;
            }
            stats.events_sent += 1;
        }
        Err(e) => {
            stats.malformed += 1;
            log::error!("❌ Skipping malformed event ({}): {}", e, line);
        }
    }

    true
}

/// Follows a growing file line by line, reopening it when it is rotated
///
/// Text is only handed out once its terminating newline has been written, so
/// a writer flushing half a line never produces a truncated event.
/// `read_line` is not cancellation safe while a read is in flight.
pub struct TailReader {
    path: PathBuf,
    file: Option<BufReader<File>>,
    inode: Option<u64>,
    poll_interval: Duration,
    /// Bytes of the current line read so far, without its newline yet
    pending: String,
}

impl TailReader {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: None,
            inode: None,
            poll_interval: Duration::from_millis(100),
            pending: String::new(),
        }
    }

    /// Start following the file from its current end
    pub async fn start(&mut self) -> std::io::Result<()> {
        self.open(SeekFrom::End(0)).await?;
        log::info!("📖 Started tailing: {}", self.path.display());
        Ok(())
    }

    async fn open(&mut self, position: SeekFrom) -> std::io::Result<()> {
        let file = File::open(&self.path).await?;
        let metadata = file.metadata().await?;

        #[cfg(unix)]
        {
            self.inode = Some(metadata.ino());
        }
        #[cfg(not(unix))]
        let _ = metadata;

        let mut reader = BufReader::new(file);
        reader.seek(position).await?;
        self.file = Some(reader);
        Ok(())
    }

    /// Read the next complete non-empty line, waiting for it if necessary
    pub async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            let reader = self.file.as_mut().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "File not opened")
            })?;

            let mut chunk = String::new();
            if reader.read_line(&mut chunk).await? == 0 {
                // Old file fully drained before switching to its replacement
                if self.detect_rotation().await? {
                    log::info!("🔄 File rotation detected, reopening: {}", self.path.display());
                    if !self.pending.is_empty() {
                        log::warn!(
                            "⚠️  Discarding unterminated line from rotated file: {}",
                            self.pending.trim()
                        );
                        self.pending.clear();
                    }
                    self.open(SeekFrom::Start(0)).await?;
                    continue;
                }
                sleep(self.poll_interval).await;
                continue;
            }

            self.pending.push_str(&chunk);
            if !self.pending.ends_with('\n') {
                // Writer is mid-line, wait for the rest
                continue;
            }

            let line = std::mem::take(&mut self.pending);
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    /// Detect if the file has been rotated (inode changed)
    ///
    /// A path that is missing for a moment while being replaced is not a rotation yet.
    async fn detect_rotation(&mut self) -> std::io::Result<bool> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };

        #[cfg(unix)]
        {
            Ok(self.inode.map_or(false, |old| old != metadata.ino()))
        }

        #[cfg(not(unix))]
        {
            // Size shrinking below our position means the file was replaced
            match self.file.as_mut() {
                Some(file) => {
                    let current_pos = file.stream_position().await?;
                    Ok(metadata.len() < current_pos)
                }
                None => Ok(false),
            }
        }
    }
}
