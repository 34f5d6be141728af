//! Errors raised by message sinks.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures opening or writing an output file. Always fatal to a run.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The output file could not be created or opened for appending.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing or flushing a record failed.
    #[error("failed to write record: {0}")]
    Write(#[from] io::Error),
}
