//! Configuration loader describing where the build output lives.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::project::{
  AssetLayout, DEFAULT_ASSET_PREFIX, DEFAULT_DIST_DIR, DEFAULT_SERVER_MARKER, DirectoryLayout,
};

/// File name looked up in the working directory when no explicit config is given.
pub const DEFAULT_CONFIG_FILE: &str = "asset-pruner.config.json";

/// Discoverable pruner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrunerConfig {
  /// Build output directory containing the rendered pages.
  pub dist_dir: PathBuf,
  /// Asset prefix below the output directory, also used as the URL prefix in pages.
  pub asset_prefix: String,
  /// Whether CSS and JS chunks share the prefix directory or use `css/` and `js/` below it.
  pub layout: DirectoryLayout,
  /// Substring identifying server-runtime chunks in log output.
  pub server_marker: String,
  /// Report orphaned files without removing them.
  pub dry_run: bool,
  /// Treat any per-file deletion failure as a failed run.
  pub fail_on_delete_error: bool,
}

impl Default for PrunerConfig {
  fn default() -> Self {
    Self {
      dist_dir: PathBuf::from(DEFAULT_DIST_DIR),
      asset_prefix: DEFAULT_ASSET_PREFIX.into(),
      layout: DirectoryLayout::Unified,
      server_marker: DEFAULT_SERVER_MARKER.into(),
      dry_run: false,
      fail_on_delete_error: false,
    }
  }
}

impl PrunerConfig {
  /// Look for [`DEFAULT_CONFIG_FILE`] in the provided directory.
  ///
  /// A missing file yields the defaults; an unreadable or malformed one is an error.
  pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    match fs::read_to_string(&candidate) {
      Ok(content) => Self::parse(&candidate, &content),
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
      Err(source) => Err(ConfigError::Io {
        path: candidate,
        source,
      }),
    }
  }

  /// Read configuration from a specific JSON file, which must exist.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(path, &content)
  }

  fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
    serde_json::from_str(content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Build the asset layout described by this configuration.
  pub fn to_layout(&self) -> AssetLayout {
    AssetLayout::new(self.dist_dir.clone(), &self.asset_prefix, self.layout)
      .with_server_marker(self.server_marker.clone())
  }
}
