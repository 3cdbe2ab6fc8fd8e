//! Data structures produced while analysing and pruning a build.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

/// Asset names referenced directly from rendered pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferencedAssets {
  /// Stylesheets referenced through `href` attributes.
  pub css: BTreeSet<String>,
  /// Script chunks referenced through `src` or island loader attributes.
  ///
  /// These seed the import closure and are not the final reachable set.
  pub js: BTreeSet<String>,
}

impl ReferencedAssets {
  /// Returns `true` when no page referenced any asset.
  pub fn is_empty(&self) -> bool {
    self.css.is_empty() && self.js.is_empty()
  }
}

/// Classification attached to an orphaned asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrphanKind {
  /// Stylesheet no page links to.
  Stylesheet,
  /// Script chunk that imports the server runtime and never ships to the browser.
  ServerChunk,
  /// Script chunk that no page or reachable chunk imports.
  ClientChunk,
}

impl OrphanKind {
  /// Tag used in per-file log lines.
  pub fn label(self) -> &'static str {
    match self {
      Self::Stylesheet => "orphaned CSS",
      Self::ServerChunk => "server-side chunk",
      Self::ClientChunk => "orphaned client chunk",
    }
  }
}

/// Asset found on disk that nothing reachable refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orphan {
  /// Bare file name.
  pub name: String,
  /// Full path to the file.
  pub path: PathBuf,
  /// Diagnostic classification; has no influence on deletion.
  pub kind: OrphanKind,
}

/// Record of an asset removed (or, in dry-run mode, selected for removal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedAsset {
  /// Bare file name.
  pub name: String,
  /// Full path to the file.
  pub path: PathBuf,
  /// Diagnostic classification.
  pub kind: OrphanKind,
}

/// Orphan that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionFailure {
  /// Path that could not be removed.
  pub path: PathBuf,
  /// Rendered I/O error.
  pub error: String,
}

/// Outcome of a single cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
  /// Whether files were only reported rather than removed.
  pub dry_run: bool,
  /// Number of orphans removed.
  pub deleted_count: usize,
  /// Orphans removed, in processing order.
  pub deleted_files: Vec<DeletedAsset>,
  /// Orphans whose removal failed.
  pub failures: Vec<DeletionFailure>,
}

impl CleanupReport {
  /// Create an empty report.
  pub fn new(dry_run: bool) -> Self {
    Self {
      dry_run,
      ..Self::default()
    }
  }

  pub(crate) fn record_deleted(&mut self, orphan: Orphan) {
    self.deleted_count += 1;
    self.deleted_files.push(DeletedAsset {
      name: orphan.name,
      path: orphan.path,
      kind: orphan.kind,
    });
  }

  pub(crate) fn record_failure(&mut self, path: PathBuf, error: impl ToString) {
    self.failures.push(DeletionFailure {
      path,
      error: error.to_string(),
    });
  }

  /// Returns `true` when at least one orphan could not be removed.
  pub fn has_failures(&self) -> bool {
    !self.failures.is_empty()
  }

  /// Names of the removed files.
  pub fn deleted_names(&self) -> impl Iterator<Item = &str> {
    self.deleted_files.iter().map(|asset| asset.name.as_str())
  }

  /// Final line printed after a run.
  pub fn summary_line(&self) -> String {
    match (self.deleted_count, self.dry_run) {
      (0, _) => "No orphaned asset files found".to_string(),
      (count, true) => format!("Would clean up {count} orphaned asset file(s)"),
      (count, false) => format!("Cleaned up {count} orphaned asset file(s)"),
    }
  }
}
