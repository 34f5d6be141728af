//! Command line interface for the `pagerframe` binary.
//!
//! Kept free of crate-internal imports so the build script can include it to
//! render the manual page.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Retention policy bounding incomplete messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Keep at most `--bound` incomplete messages.
    #[default]
    Count,
    /// Evict an incomplete message `--bound` frames after it started.
    Delay,
}

/// Transform applied to message text before it is written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TransformArg {
    /// Write plaintext.
    #[default]
    None,
    /// Replace text with its SHA-256 digest.
    Digest,
    /// Replace text and capcodes with their SHA-256 digests.
    DigestAll,
    /// Encrypt text with ChaCha20-Poly1305 under `--seal-key`.
    Seal,
}

/// Command line arguments for the `pagerframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "pagerframe",
    version,
    about = "Reassemble decoded pager frames into complete messages"
)]
pub struct Cli {
    /// Retention policy for incomplete messages.
    #[arg(long, value_enum, default_value_t = PolicyArg::Count)]
    pub policy: PolicyArg,
    /// Bound used by the retention policy.
    #[arg(long, default_value_t = 10)]
    pub bound: usize,
    /// Payload transform.
    #[arg(long, value_enum, default_value_t = TransformArg::None)]
    pub transform: TransformArg,
    /// 256-bit key as 64 hex characters, required by `--transform seal`.
    #[arg(long, value_name = "HEX")]
    pub seal_key: Option<String>,
    /// Directory for the timestamped output files.
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,
    /// Line log path, overriding the timestamped default.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// CSV log path, overriding the timestamped default.
    #[arg(long)]
    pub csv_file: Option<PathBuf>,
    /// Read frames from a file instead of standard input.
    #[arg(long, short)]
    pub input: Option<PathBuf>,
}
