//! Human-readable append-only log.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{FlushedMessage, MessageSink, SinkError};

/// Prefix of the line carrying the final message text.
pub const TEXT_MARKER: &str = "└─ ";

/// Writes each message as its metadata rows, a text line and a blank line.
///
/// ```text
/// FLEX|1600/2|00.001.A|0001234567|LS|5|ALN|3.1.F
/// FLEX|1600/2|00.002.A|0001234567|LS|5|ALN|3.0.C
/// └─ HELLO WORLD
///
/// ```
#[derive(Debug)]
pub struct LineLog<W> {
    writer: W,
}

impl<W> LineLog<W> {
    /// Wrap `writer`.
    pub fn new(writer: W) -> Self { Self { writer } }

    /// Consume the log, returning the underlying writer.
    pub fn into_inner(self) -> W { self.writer }
}

/// Render one message record.
#[must_use]
pub fn render_record(message: &FlushedMessage) -> String {
    let mut record = String::new();
    for row in message.rows() {
        record.push_str(&row.to_string());
        record.push('\n');
    }
    record.push_str(TEXT_MARKER);
    record.push_str(message.text());
    record.push_str("\n\n");
    record
}

#[async_trait]
impl<W> MessageSink for LineLog<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, message: &FlushedMessage) -> Result<(), SinkError> {
        self.writer
            .write_all(render_record(message).as_bytes())
            .await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().await?;
        Ok(())
    }
}
