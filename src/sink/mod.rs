//! Durable destinations for reassembled messages.
//!
//! A [`FlushedMessage`] is what remains of a pending message once it has left
//! the store and passed through the payload transform. Sinks receive it by
//! reference and append it to their output; they never see a message twice.
//! [`SinkWriter`] fans each message out to the human-readable [`LineLog`] and
//! the CSV [`TabularLog`].

pub mod error;
mod line_log;
mod tabular;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
pub use error::SinkError;
pub use line_log::{LineLog, TEXT_MARKER, render_record};
pub use tabular::{COLUMNS, TabularLog, encode_record, row_fields};
use tokio::{
    fs::{self, File, OpenOptions},
    io::{AsyncWrite, BufWriter},
};

use crate::{frame::FrameMetadata, store::MessageId};

/// A message ready to be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlushedMessage {
    id: MessageId,
    rows: Vec<FrameMetadata>,
    text: String,
    complete: bool,
}

impl FlushedMessage {
    /// Construct a flushed message.
    #[must_use]
    pub fn new(id: MessageId, rows: Vec<FrameMetadata>, text: String, complete: bool) -> Self {
        Self {
            id,
            rows,
            text,
            complete,
        }
    }

    /// Identifier shared by all rows.
    #[must_use]
    pub const fn id(&self) -> MessageId { self.id }

    /// Per-fragment metadata rows in arrival order.
    #[must_use]
    pub fn rows(&self) -> &[FrameMetadata] { &self.rows }

    /// Final, possibly transformed, text.
    #[must_use]
    pub fn text(&self) -> &str { &self.text }

    /// Whether the message completed before it was flushed.
    #[must_use]
    pub const fn is_complete(&self) -> bool { self.complete }
}

/// Destination for flushed messages.
#[async_trait]
pub trait MessageSink: Send {
    /// Append one message.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the record could not be written.
    async fn write(&mut self, message: &FlushedMessage) -> Result<(), SinkError>;

    /// Push buffered records to the destination.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if flushing fails.
    async fn flush(&mut self) -> Result<(), SinkError>;
}

/// Sink that keeps messages in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Vec<FlushedMessage>,
    flushes: usize,
}

impl MemorySink {
    /// Messages written so far.
    #[must_use]
    pub fn messages(&self) -> &[FlushedMessage] { &self.messages }

    /// Number of times the sink was flushed.
    #[must_use]
    pub const fn flushes(&self) -> usize { self.flushes }

    /// Consume the sink, returning the written messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<FlushedMessage> { self.messages }
}

#[async_trait]
impl MessageSink for MemorySink {
    async fn write(&mut self, message: &FlushedMessage) -> Result<(), SinkError> {
        self.messages.push(message.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.flushes += 1;
        Ok(())
    }
}

/// Locations of the two output files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    /// Human-readable log.
    pub line_log: PathBuf,
    /// CSV log.
    pub tabular_log: PathBuf,
}

impl OutputPaths {
    /// `out_<timestamp>.txt` and `out_<timestamp>.csv` inside `dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use pagerframe::sink::OutputPaths;
    ///
    /// let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).single().expect("valid time");
    /// let paths = OutputPaths::timestamped("output", at);
    /// assert_eq!(paths.line_log.to_str(), Some("output/out_20240501T123000Z.txt"));
    /// ```
    #[must_use]
    pub fn timestamped(dir: impl AsRef<Path>, at: DateTime<Utc>) -> Self {
        let stem = format!("out_{}", at.format("%Y%m%dT%H%M%SZ"));
        let dir = dir.as_ref();
        Self {
            line_log: dir.join(format!("{stem}.txt")),
            tabular_log: dir.join(format!("{stem}.csv")),
        }
    }
}

/// File-backed writer type opened by [`SinkWriter::open`].
pub type FileSinkWriter = SinkWriter<BufWriter<File>, BufWriter<File>>;

/// Writes every message to both the line log and the tabular log.
#[derive(Debug)]
pub struct SinkWriter<L, T> {
    lines: LineLog<L>,
    table: TabularLog<T>,
}

impl<L, T> SinkWriter<L, T>
where
    L: AsyncWrite + Unpin + Send,
    T: AsyncWrite + Unpin + Send,
{
    /// Combine an already prepared line log and tabular log.
    pub fn new(lines: LineLog<L>, table: TabularLog<T>) -> Self { Self { lines, table } }

    /// Flush both logs and return the underlying writers.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if either log fails to flush.
    pub async fn finish(mut self) -> Result<(L, T), SinkError> {
        MessageSink::flush(&mut self).await?;
        Ok((self.lines.into_inner(), self.table.into_inner()))
    }
}

impl FileSinkWriter {
    /// Open (creating if needed) both output files for appending.
    ///
    /// The CSV header is written only when the tabular file is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if a file or its directory cannot be
    /// created, or [`SinkError::Write`] if the header cannot be written.
    pub async fn open(paths: &OutputPaths) -> Result<Self, SinkError> {
        let lines = LineLog::new(BufWriter::new(open_append(&paths.line_log).await?));
        let table_file = open_append(&paths.tabular_log).await?;
        let existing = table_file
            .metadata()
            .await
            .map_err(|source| SinkError::Open {
                path: paths.tabular_log.clone(),
                source,
            })?
            .len();
        let table = if existing == 0 {
            TabularLog::start(BufWriter::new(table_file)).await?
        } else {
            TabularLog::resume(BufWriter::new(table_file))
        };
        Ok(Self::new(lines, table))
    }
}

async fn open_append(path: &Path) -> Result<File, SinkError> {
    let open_error = |source| SinkError::Open {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(open_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(open_error)
}

#[async_trait]
impl<L, T> MessageSink for SinkWriter<L, T>
where
    L: AsyncWrite + Unpin + Send,
    T: AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, message: &FlushedMessage) -> Result<(), SinkError> {
        self.lines.write(message).await?;
        self.table.write(message).await
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.lines.flush().await?;
        self.table.flush().await
    }
}

#[cfg(test)]
mod tests;
