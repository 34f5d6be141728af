//! Shared utilities for integration tests.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use pagerframe::{
    Engine,
    RetentionPolicy,
    SinkWriter,
    sink::{LineLog, TabularLog},
    transform::Identity,
};
use rstest::fixture;

/// Opening fragment of the reference message.
pub const HELLO: &str = "FLEX|1600/2|00.001.A|0001234567|LS|5|ALN|3.1.F|HELLO ";
/// Closing fragment of the reference message.
pub const WORLD: &str = "FLEX|1600/2|00.002.A|0001234567|LS|5|ALN|3.0.C|WORLD";

/// Writer pair capturing both logs in memory.
pub type MemoryWriter = SinkWriter<Vec<u8>, Vec<u8>>;

/// Sink writer over in-memory buffers, with the CSV header already written.
pub async fn memory_writer() -> MemoryWriter {
    let table = TabularLog::start(Vec::new())
        .await
        .expect("header into memory");
    SinkWriter::new(LineLog::new(Vec::new()), table)
}

/// Default engine over in-memory logs.
#[fixture]
pub async fn engine() -> Engine<MemoryWriter> {
    Engine::new(
        RetentionPolicy::DEFAULT,
        Box::new(Identity),
        memory_writer().await,
    )
}

/// Join frame lines into newline-terminated input.
pub fn input(lines: &[&str]) -> Vec<u8> {
    lines
        .iter()
        .flat_map(|line| line.bytes().chain(std::iter::once(b'\n')))
        .collect()
}
