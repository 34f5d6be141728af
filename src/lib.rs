//! Reassembly of decoded pager frames into complete messages.
//!
//! Upstream decoders emit one pipe-delimited line per received frame. Long
//! alphanumeric pages arrive split across several frames, possibly
//! interleaved with traffic for other capcodes. This crate parses those lines
//! ([`frame`]), groups fragments per capcode under a bounded retention policy
//! ([`store`]), optionally rewrites the text ([`transform`]) and appends each
//! finished message to a line log and a CSV log ([`sink`]). [`engine`] drives
//! the whole pipeline over an async line source and guarantees that nothing
//! held in memory is lost when the run ends.
//!
//! [`synth`] produces realistic synthetic traffic for exercising the pipeline
//! without a radio.

pub mod cli;
pub mod config;
pub mod engine;
pub mod frame;
pub mod sink;
pub mod store;
pub mod synth;
pub mod transform;

pub use config::{ConfigError, EngineConfig, InputSource};
pub use engine::{Engine, EngineError, RunSummary};
pub use frame::{Capcode, DecodedFrame, FragmentFlag, FrameMetadata, NotAFrame, parse_line};
pub use sink::{FileSinkWriter, FlushedMessage, MessageSink, OutputPaths, SinkError, SinkWriter};
pub use store::{MessageId, Observation, PendingMessage, RetentionPolicy, RetentionStore};
pub use transform::{PayloadTransform, TransformError, TransformKind};
