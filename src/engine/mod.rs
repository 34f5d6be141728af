//! Reassembly controller driving the parser, store, transform and sink.
//!
//! [`Engine`] consumes input strictly in order. For each line it parses a
//! frame, feeds it to the [`RetentionStore`], and passes every message the
//! store releases through the payload transform into the sink before the next
//! line is read. [`Engine::run`] drains the store and flushes the sink on every
//! exit path: end of input, cancellation, or a fatal error.

pub mod error;

pub use error::EngineError;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    select,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use crate::{
    config::EngineConfig,
    frame::{DecodedFrame, NotAFrame, parse_bytes, parse_line},
    sink::{FlushedMessage, MessageSink},
    store::{PendingMessage, RetentionPolicy, RetentionStore},
    transform::PayloadTransform,
};

/// Counters describing a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Input lines read.
    pub lines_read: u64,
    /// Lines accepted as frames.
    pub frames: u64,
    /// Lines skipped as non-frames.
    pub skipped: u64,
    /// Messages handed to the sink.
    pub messages_written: u64,
    /// Incomplete messages forced out by the retention policy.
    pub evicted: u64,
    /// Messages flushed by the terminal drain.
    pub drained: u64,
    /// Whether the run ended because of cancellation.
    pub interrupted: bool,
}

/// Frame-reassembly engine owning all run state.
pub struct Engine<S> {
    store: RetentionStore,
    transform: Box<dyn PayloadTransform>,
    sink: S,
    summary: RunSummary,
}

impl<S> Engine<S>
where
    S: MessageSink,
{
    /// Create an engine writing to `sink`.
    #[must_use]
    pub fn new(policy: RetentionPolicy, transform: Box<dyn PayloadTransform>, sink: S) -> Self {
        Self {
            store: RetentionStore::new(policy),
            transform,
            sink,
            summary: RunSummary::default(),
        }
    }

    /// Create an engine from validated configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig, sink: S) -> Self {
        Self::new(config.retention, config.transform.build(), sink)
    }

    /// Read `input` to the end, or until `shutdown` is cancelled, then drain
    /// the store and flush the sink.
    ///
    /// The drain and flush also run when the loop aborts with an error; the
    /// original error is returned and a failure of the drain is logged.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when reading input, transforming a message or
    /// writing to the sink fails.
    pub async fn run<R>(
        &mut self,
        input: R,
        shutdown: &CancellationToken,
    ) -> Result<RunSummary, EngineError>
    where
        R: AsyncBufRead + Unpin,
    {
        let consumed = self.consume(input, shutdown).await;
        let closed = self.close().await;
        match (consumed, closed) {
            (Ok(()), Ok(())) => {
                let summary = self.summary;
                info!(
                    lines = summary.lines_read,
                    frames = summary.frames,
                    skipped = summary.skipped,
                    messages = summary.messages_written,
                    evicted = summary.evicted,
                    drained = summary.drained,
                    interrupted = summary.interrupted,
                    "reassembly finished"
                );
                Ok(summary)
            }
            (Err(err), Ok(())) | (Ok(()), Err(err)) => Err(err),
            (Err(err), Err(close_err)) => {
                warn!(error = %close_err, "drain after a failed run also failed");
                Err(err)
            }
        }
    }

    async fn consume<R>(&mut self, mut input: R, shutdown: &CancellationToken) -> Result<(), EngineError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = select! {
                biased;
                () = shutdown.cancelled() => {
                    self.summary.interrupted = true;
                    info!(pending = self.store.len(), "shutdown requested; draining");
                    return Ok(());
                }
                read = input.read_until(b'\n', &mut line) => read.map_err(EngineError::Input)?,
            };
            if read == 0 {
                return Ok(());
            }
            self.process_bytes(&line).await?;
        }
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        let drained = self.drain().await;
        let flushed = self.sink.flush().await;
        drained?;
        flushed?;
        Ok(())
    }

    /// Process one raw input line.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if a released message cannot be transformed or
    /// written. Lines that are not frames are skipped.
    pub async fn process_bytes(&mut self, line: &[u8]) -> Result<(), EngineError> {
        self.summary.lines_read += 1;
        match parse_bytes(line) {
            Ok(frame) => self.process_frame(frame).await,
            Err(reason) => {
                self.skip(&reason);
                Ok(())
            }
        }
    }

    /// Process one input line.
    ///
    /// # Errors
    ///
    /// See [`process_bytes`](Self::process_bytes).
    pub async fn process_line(&mut self, line: &str) -> Result<(), EngineError> {
        self.summary.lines_read += 1;
        match parse_line(line) {
            Ok(frame) => self.process_frame(frame).await,
            Err(reason) => {
                self.skip(&reason);
                Ok(())
            }
        }
    }

    /// Feed an already decoded frame to the store and emit what it releases.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if a released message cannot be transformed or
    /// written.
    pub async fn process_frame(&mut self, frame: DecodedFrame) -> Result<(), EngineError> {
        self.summary.frames += 1;
        for message in self.store.observe(frame).into_messages() {
            if !message.is_complete() {
                self.summary.evicted += 1;
            }
            self.emit(message).await?;
        }
        Ok(())
    }

    /// Flush every pending message, oldest first, returning how many were
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if a message cannot be transformed or written.
    pub async fn drain(&mut self) -> Result<usize, EngineError> {
        let drained = self.store.drain();
        let count = drained.len();
        for message in drained {
            self.summary.drained += 1;
            self.emit(message).await?;
        }
        Ok(count)
    }

    fn skip(&mut self, reason: &NotAFrame) {
        self.summary.skipped += 1;
        trace!(%reason, "skipping non-frame line");
    }

    async fn emit(&mut self, message: PendingMessage) -> Result<(), EngineError> {
        let complete = message.is_complete();
        let (id, rows, text) = message.into_parts();
        let text = self.transform.transform_message(&rows, &text)?;
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.capcode = self.transform.transform_capcode(&row.capcode);
                row
            })
            .collect();
        self.sink
            .write(&FlushedMessage::new(id, rows, text, complete))
            .await?;
        self.summary.messages_written += 1;
        Ok(())
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn summary(&self) -> RunSummary { self.summary }

    /// The retention store.
    #[must_use]
    pub const fn store(&self) -> &RetentionStore { &self.store }

    /// Borrow the sink.
    #[must_use]
    pub fn sink(&self) -> &S { &self.sink }

    /// Consume the engine, returning the sink.
    #[must_use]
    pub fn into_sink(self) -> S { self.sink }
}
