//! Error types surfaced by the pruner.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the pruning pipeline.
pub type PruneResult<T> = Result<T, PruneError>;

/// Failures that abort a cleanup run.
///
/// Only directory enumeration is fatal. Per-file read and delete failures are logged and
/// recorded in the [`crate::CleanupReport`] instead.
#[derive(Debug, Error)]
pub enum PruneError {
  /// A directory exists but could not be enumerated.
  #[error("failed to read directory {}: {source}", path.display())]
  ReadDir {
    /// Directory that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: io::Error,
  },
}

/// Errors that can occur while loading the pruner configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: io::Error,
  },
  /// Failed to parse the JSON configuration file.
  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}
