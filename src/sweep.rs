//! Classification of on-disk assets and removal of the orphaned ones.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

use log::{info, warn};

use crate::error::{PruneError, PruneResult};
use crate::models::{CleanupReport, Orphan, OrphanKind};

/// Strategy used to dispose of orphaned assets.
pub trait AssetRemover {
  /// Remove the file at `path`.
  fn remove(&self, path: &Path) -> io::Result<()>;

  /// Returns `true` when the remover leaves files in place.
  fn is_dry_run(&self) -> bool {
    false
  }
}

/// Unlinks orphaned files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl AssetRemover for FsRemover {
  fn remove(&self, path: &Path) -> io::Result<()> {
    fs::remove_file(path)
  }
}

/// Reports orphaned files without touching the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRemover;

impl AssetRemover for DryRunRemover {
  fn remove(&self, _path: &Path) -> io::Result<()> {
    Ok(())
  }

  fn is_dry_run(&self) -> bool {
    true
  }
}

/// List the regular files in `dir` carrying `extension`, sorted by name.
///
/// A missing directory yields an empty listing. Names that are not valid UTF-8 cannot be
/// referenced from a page and are left alone with a warning.
pub fn list_assets(dir: &Path, extension: &str) -> PruneResult<Vec<String>> {
  let read_dir_error = |source: io::Error| PruneError::ReadDir {
    path: dir.to_path_buf(),
    source,
  };

  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
    Err(err) => return Err(read_dir_error(err)),
  };

  let mut names = Vec::new();
  for entry in entries {
    let entry = entry.map_err(read_dir_error)?;
    if !entry.file_type().is_ok_and(|ft| ft.is_file()) {
      continue;
    }

    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else {
      warn!(
        "leaving {} in place: file name is not valid UTF-8",
        entry.path().display()
      );
      continue;
    };

    if Path::new(name).extension().is_some_and(|ext| ext == extension) {
      names.push(name.to_string());
    }
  }

  names.sort();
  Ok(names)
}

/// Select the listed assets that are not in `reachable`, tagging each with `kind_of`.
pub fn classify_orphans<F>(
  dir: &Path,
  listing: &[String],
  reachable: &BTreeSet<String>,
  mut kind_of: F,
) -> Vec<Orphan>
where
  F: FnMut(&Path) -> OrphanKind,
{
  listing
    .iter()
    .filter(|name| !reachable.contains(*name))
    .map(|name| {
      let path = dir.join(name);
      let kind = kind_of(&path);
      Orphan {
        name: name.clone(),
        path,
        kind,
      }
    })
    .collect()
}

/// Whether the chunk at `path` pulls in the server runtime.
///
/// Unreadable chunks count as client chunks; the answer only affects log output.
pub fn is_server_chunk(path: &Path, marker: &str) -> bool {
  if marker.is_empty() {
    return false;
  }
  fs::read(path)
    .map(|bytes| String::from_utf8_lossy(&bytes).contains(marker))
    .unwrap_or(false)
}

/// Remove every orphan, recording successes and failures in `report`.
///
/// A failed removal is logged and processing continues with the next file.
pub fn sweep_orphans<R>(orphans: Vec<Orphan>, remover: &R, report: &mut CleanupReport)
where
  R: AssetRemover + ?Sized,
{
  let verb = if remover.is_dry_run() {
    "Would delete"
  } else {
    "Deleted"
  };

  for orphan in orphans {
    match remover.remove(&orphan.path) {
      Ok(()) => {
        info!("{verb} {}: {}", orphan.kind.label(), orphan.name);
        report.record_deleted(orphan);
      }
      Err(err) => {
        warn!("failed to delete {}: {err}", orphan.path.display());
        report.record_failure(orphan.path, err);
      }
    }
  }
}
