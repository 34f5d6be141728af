//! Validated run configuration.
//!
//! [`EngineConfig::from_cli`] turns parsed arguments into the retention
//! policy, payload transform, output paths and input source used by a run.
//! All checks happen here so the engine never sees an invalid combination.

use std::{fmt, num::NonZeroUsize, path::PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    cli::{Cli, PolicyArg, TransformArg},
    sink::OutputPaths,
    store::RetentionPolicy,
    transform::{SealKey, TransformError, TransformKind},
};

/// Problems detected while validating the command line.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The retention bound was zero.
    #[error("retention bound must be at least 1")]
    ZeroBound,
    /// `seal` was selected without a key.
    #[error("the seal transform requires --seal-key")]
    MissingSealKey,
    /// A key was supplied for a transform that does not use one.
    #[error("--seal-key is only valid with --transform seal")]
    UnusedSealKey,
    /// The supplied key could not be decoded.
    #[error("invalid seal key: {0}")]
    InvalidSealKey(#[source] TransformError),
}

/// Where frame lines are read from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input.
    #[default]
    Stdin,
    /// A file read to its end.
    File(PathBuf),
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("stdin"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Everything a run needs, validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Bound on incomplete messages.
    pub retention: RetentionPolicy,
    /// Transform applied before writing.
    pub transform: TransformKind,
    /// Output file locations.
    pub outputs: OutputPaths,
    /// Frame source.
    pub input: InputSource,
}

impl EngineConfig {
    /// Build a configuration from parsed arguments.
    ///
    /// `started` timestamps the default output file names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero bound, a missing or malformed seal
    /// key, or a key given without the seal transform.
    pub fn from_cli(cli: &Cli, started: DateTime<Utc>) -> Result<Self, ConfigError> {
        let bound = NonZeroUsize::new(cli.bound).ok_or(ConfigError::ZeroBound)?;
        let retention = match cli.policy {
            PolicyArg::Count => RetentionPolicy::CountBound(bound),
            PolicyArg::Delay => RetentionPolicy::DelayBound(bound),
        };

        let transform = match (cli.transform, cli.seal_key.as_deref()) {
            (TransformArg::Seal, Some(hex)) => TransformKind::Seal(
                hex.parse::<SealKey>()
                    .map_err(ConfigError::InvalidSealKey)?,
            ),
            (TransformArg::Seal, None) => return Err(ConfigError::MissingSealKey),
            (_, Some(_)) => return Err(ConfigError::UnusedSealKey),
            (TransformArg::None, None) => TransformKind::Identity,
            (TransformArg::Digest, None) => TransformKind::Digest,
            (TransformArg::DigestAll, None) => TransformKind::DigestAll,
        };

        let defaults = OutputPaths::timestamped(&cli.output_dir, started);
        let outputs = OutputPaths {
            line_log: cli.log_file.clone().unwrap_or(defaults.line_log),
            tabular_log: cli.csv_file.clone().unwrap_or(defaults.tabular_log),
        };

        let input = cli
            .input
            .clone()
            .map_or(InputSource::Stdin, InputSource::File);

        Ok(Self {
            retention,
            transform,
            outputs,
            input,
        })
    }
}
