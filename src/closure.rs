//! Transitive closure of same-directory imports between script chunks.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;

fn relative_import_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"\b(?:from|import)\s*\(?\s*["']\./([^"'/\\]+\.js)["']"#)
      .expect("invalid relative import regex")
  })
}

/// Collect the sibling chunks a script imports.
///
/// Recognises static `import ... from "./x.js"`, re-exports, bare side-effect imports and
/// dynamic `import("./x.js")`, with either quote style and with or without whitespace as
/// minifiers emit it. Imports that leave the directory are ignored.
pub fn scan_relative_imports(source: &str) -> BTreeSet<String> {
  relative_import_pattern()
    .captures_iter(source)
    .map(|caps| caps[1].to_string())
    .collect()
}

/// Expand `seed` to every chunk in `js_dir` reachable through relative imports.
///
/// Each chunk is scanned at most once, so import cycles terminate. Imported names without a
/// matching file in `js_dir` are skipped and never enter the result; seeds are kept as given.
pub fn expand_import_closure(seed: &BTreeSet<String>, js_dir: &Path) -> BTreeSet<String> {
  let mut reachable = seed.clone();
  let mut pending: Vec<String> = seed.iter().cloned().collect();
  let mut processed = BTreeSet::new();

  while let Some(chunk) = pending.pop() {
    if !processed.insert(chunk.clone()) {
      continue;
    }

    let path = js_dir.join(&chunk);
    let bytes = match fs::read(&path) {
      Ok(bytes) => bytes,
      Err(err) if err.kind() == ErrorKind::NotFound => {
        debug!("referenced chunk {chunk} is not in {}", js_dir.display());
        continue;
      }
      Err(err) => {
        warn!("could not scan imports of {}: {err}", path.display());
        continue;
      }
    };

    for target in scan_relative_imports(&String::from_utf8_lossy(&bytes)) {
      if reachable.contains(&target) {
        continue;
      }
      if !js_dir.join(&target).is_file() {
        debug!("{chunk} imports missing chunk {target}");
        continue;
      }
      reachable.insert(target.clone());
      pending.push(target);
    }
  }

  reachable
}
