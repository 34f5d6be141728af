//! Structured CSV log with one row per fragment.

use std::borrow::Cow;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{FlushedMessage, MessageSink, SinkError};
use crate::frame::FrameMetadata;

/// Column names, in order.
pub const COLUMNS: [&str; 14] = [
    "protocol",
    "transmission",
    "frame_cycle",
    "frame_num",
    "frame_phase",
    "capcode",
    "address_ls",
    "address_gs",
    "page_type",
    "frag_indicator",
    "frag_cont",
    "frag_flag",
    "message",
    "message_id",
];

const DELIMITER: char = ',';
const QUOTE: char = '"';
const TERMINATOR: &str = "\r\n";

/// Writes CSV rows; every fragment row of a message repeats its final text
/// and id.
#[derive(Debug)]
pub struct TabularLog<W> {
    writer: W,
}

impl<W> TabularLog<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Wrap `writer` and emit the header row.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Write`] if the header cannot be written.
    pub async fn start(mut writer: W) -> Result<Self, SinkError> {
        writer.write_all(encode_record(&COLUMNS).as_bytes()).await?;
        Ok(Self { writer })
    }

    /// Wrap `writer` whose destination already holds a header row.
    pub fn resume(writer: W) -> Self { Self { writer } }

    /// Consume the log, returning the underlying writer.
    pub fn into_inner(self) -> W { self.writer }
}

/// Quote a field when it contains a delimiter, quote or line break.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([DELIMITER, QUOTE, '\r', '\n']) {
        let doubled = field.replace(QUOTE, "\"\"");
        Cow::Owned(format!("{QUOTE}{doubled}{QUOTE}"))
    } else {
        Cow::Borrowed(field)
    }
}

/// Encode one CSV record including its terminator.
#[must_use]
pub fn encode_record<S: AsRef<str>>(fields: &[S]) -> String {
    let mut record = fields
        .iter()
        .map(|field| escape(field.as_ref()))
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string());
    record.push_str(TERMINATOR);
    record
}

/// Column values for one fragment row.
#[must_use]
pub fn row_fields(row: &FrameMetadata, message: &FlushedMessage) -> [String; 14] {
    let (indicator, continuation, flag) = row.fragmentation.map_or_else(
        || (String::new(), String::new(), String::new()),
        |fragmentation| {
            (
                fragmentation.indicator.to_string(),
                fragmentation.continuation.to_string(),
                fragmentation.flag.letter().to_string(),
            )
        },
    );
    [
        row.protocol.to_string(),
        row.transmission.to_string(),
        row.timing.cycle.to_string(),
        row.timing.frame.to_string(),
        row.timing.phase.to_string(),
        row.capcode.to_string(),
        row.address.locality.to_string(),
        row.address.scope.to_string(),
        row.page_type.to_string(),
        indicator,
        continuation,
        flag,
        message.text().to_owned(),
        message.id().to_string(),
    ]
}

#[async_trait]
impl<W> MessageSink for TabularLog<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, message: &FlushedMessage) -> Result<(), SinkError> {
        let rows: String = message
            .rows()
            .iter()
            .map(|row| encode_record(&row_fields(row, message)))
            .collect();
        self.writer.write_all(rows.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().await?;
        Ok(())
    }
}
