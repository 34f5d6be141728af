//! Errors that abort a reassembly run.

use std::io;

use thiserror::Error;

use crate::{sink::SinkError, transform::TransformError};

/// Fatal failures of the reassembly loop.
///
/// Malformed input lines are not errors; they are skipped.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Reading the input stream failed.
    #[error("failed to read input: {0}")]
    Input(#[source] io::Error),
    /// A sink rejected a record.
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// The payload transform failed.
    #[error("payload transform failed: {0}")]
    Transform(#[from] TransformError),
}
