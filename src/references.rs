//! Extraction of asset references from rendered HTML pages.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{PruneError, PruneResult};
use crate::models::ReferencedAssets;
use crate::project::AssetLayout;

/// Attributes through which pages load script chunks. The last two are emitted by the
/// island hydration markup (`<astro-island component-url=... renderer-url=...>`).
const SCRIPT_ATTRIBUTES: &str = "src|component-url|renderer-url";

/// Compiled attribute patterns for one asset layout.
#[derive(Debug, Clone)]
pub struct ReferencePatterns {
  stylesheet: Regex,
  script: Regex,
}

impl ReferencePatterns {
  /// Compile the reference patterns for the URL prefixes of `layout`.
  pub fn new(layout: &AssetLayout) -> Self {
    let stylesheet = Regex::new(&format!(
      r#"href\s*=\s*["']{}([^"'?#/]+\.css)(?:[?#][^"']*)?["']"#,
      regex::escape(&layout.css_url_path())
    ))
    .expect("invalid stylesheet reference regex");

    let script = Regex::new(&format!(
      r#"(?:{})\s*=\s*["']{}([^"'?#/]+\.js)(?:[?#][^"']*)?["']"#,
      SCRIPT_ATTRIBUTES,
      regex::escape(&layout.js_url_path())
    ))
    .expect("invalid script reference regex");

    Self { stylesheet, script }
  }

  /// Add every asset referenced by `html` to `refs`.
  pub fn scan(&self, html: &str, refs: &mut ReferencedAssets) {
    for caps in self.stylesheet.captures_iter(html) {
      refs.css.insert(caps[1].to_string());
    }
    for caps in self.script.captures_iter(html) {
      refs.js.insert(caps[1].to_string());
    }
  }
}

/// Recursively list the `*.html` pages below `root`.
///
/// A missing root yields an empty list so partial builds still clean up. Failing to
/// enumerate the root itself is fatal; unreadable nested entries are skipped.
pub fn collect_html_files(root: &Path) -> PruneResult<Vec<PathBuf>> {
  match fs::read_dir(root) {
    Ok(_) => {}
    Err(err) if err.kind() == ErrorKind::NotFound => {
      debug!("no build output at {}, nothing to scan", root.display());
      return Ok(Vec::new());
    }
    Err(source) => {
      return Err(PruneError::ReadDir {
        path: root.to_path_buf(),
        source,
      });
    }
  }

  let mut pages = Vec::new();
  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = match entry {
      Ok(entry) => entry,
      Err(err) => {
        warn!("skipping unreadable entry below {}: {err}", root.display());
        continue;
      }
    };

    if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "html") {
      pages.push(entry.into_path());
    }
  }

  Ok(pages)
}

/// Scan every rendered page of the build for stylesheet and script references.
pub fn extract_references(layout: &AssetLayout) -> PruneResult<ReferencedAssets> {
  let patterns = ReferencePatterns::new(layout);
  let pages = collect_html_files(&layout.dist_root)?;
  let mut refs = ReferencedAssets::default();

  for page in &pages {
    match fs::read(page) {
      Ok(bytes) => patterns.scan(&String::from_utf8_lossy(&bytes), &mut refs),
      Err(err) => warn!("skipping unreadable page {}: {err}", page.display()),
    }
  }

  debug!(
    "scanned {} page(s): {} stylesheet(s), {} script entry chunk(s)",
    pages.len(),
    refs.css.len(),
    refs.js.len()
  );
  if refs.is_empty() && !pages.is_empty() {
    warn!(
      "no page references an asset under {} or {}; every asset will be treated as orphaned",
      layout.css_url_path(),
      layout.js_url_path()
    );
  }
  Ok(refs)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::project::DirectoryLayout;
  use tempfile::tempdir;

  fn unified() -> AssetLayout {
    AssetLayout::new("dist", "_astro", DirectoryLayout::Unified)
  }

  fn scan(layout: &AssetLayout, html: &str) -> ReferencedAssets {
    let mut refs = ReferencedAssets::default();
    ReferencePatterns::new(layout).scan(html, &mut refs);
    refs
  }

  #[test]
  fn extracts_stylesheets_and_scripts() {
    let refs = scan(
      &unified(),
      r#"<link rel="stylesheet" href="/_astro/style.aaa111.css">
         <script type="module" src="/_astro/main.abc123.js"></script>"#,
    );

    assert_eq!(refs.css.iter().collect::<Vec<_>>(), vec!["style.aaa111.css"]);
    assert_eq!(refs.js.iter().collect::<Vec<_>>(), vec!["main.abc123.js"]);
  }

  #[test]
  fn extracts_island_loader_attributes() {
    let refs = scan(
      &unified(),
      r#"<astro-island uid="x" component-url="/_astro/Counter.b1.js" renderer-url="/_astro/client.c2.js" ssr></astro-island>"#,
    );

    assert!(refs.js.contains("Counter.b1.js"));
    assert!(refs.js.contains("client.c2.js"));
    assert!(refs.css.is_empty());
  }

  #[test]
  fn accepts_single_quotes_and_query_strings() {
    let refs = scan(
      &unified(),
      "<link href='/_astro/a.css?v=2'><script src = '/_astro/b.js#x'></script>",
    );

    assert!(refs.css.contains("a.css"));
    assert!(refs.js.contains("b.js"));
  }

  #[test]
  fn ignores_other_prefixes_and_extensions() {
    let refs = scan(
      &unified(),
      r#"<link href="/assets/other.css"><script src="https://cdn.example.com/_astro/x.js"></script>
         <img src="/_astro/photo.webp"><link href="/_astro/sub/nested.css"><a href="/_astro/x.js">"#,
    );

    assert!(refs.is_empty());
  }

  #[test]
  fn split_layout_uses_typed_prefixes() {
    let layout = AssetLayout::new("dist", "assets", DirectoryLayout::Split);
    let refs = scan(
      &layout,
      r#"<link href="/assets/css/site.1.css"><script src="/assets/js/app.2.js"></script>
         <script src="/assets/css/wrong.js"></script>"#,
    );

    assert!(refs.css.contains("site.1.css"));
    assert!(refs.js.contains("app.2.js"));
    assert_eq!(refs.js.len(), 1);
  }

  #[test]
  fn empty_prefix_matches_assets_at_site_root() {
    let layout = AssetLayout::new("dist", "", DirectoryLayout::Unified);
    let refs = scan(
      &layout,
      r#"<link href="/site.css"><script src="/app.js"></script>
         <script src="//cdn.example.com/lib.js"></script><link href="/blog/print.css">"#,
    );

    assert_eq!(refs.css.iter().collect::<Vec<_>>(), vec!["site.css"]);
    assert_eq!(refs.js.iter().collect::<Vec<_>>(), vec!["app.js"]);
  }

  #[test]
  fn missing_root_produces_no_pages() {
    let temp = tempdir().unwrap();
    let pages = collect_html_files(&temp.path().join("dist")).unwrap();
    assert!(pages.is_empty());
  }

  #[test]
  fn root_that_is_not_a_directory_is_fatal() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("dist");
    fs::write(&root, "not a directory").unwrap();

    let err = collect_html_files(&root).unwrap_err();
    assert!(matches!(err, PruneError::ReadDir { ref path, .. } if *path == root));
  }

  #[test]
  fn pages_without_asset_links_reference_nothing() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("dist");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("index.html"), r#"<link href="/static/site.css">"#).unwrap();

    let layout = AssetLayout::new(&root, "_astro", DirectoryLayout::Unified);
    assert!(extract_references(&layout).unwrap().is_empty());
  }

  #[test]
  fn walks_nested_pages() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("dist");
    fs::create_dir_all(root.join("de/blog/post")).unwrap();
    fs::create_dir_all(root.join("_astro")).unwrap();
    fs::write(
      root.join("index.html"),
      r#"<link href="/_astro/home.1.css">"#,
    )
    .unwrap();
    fs::write(
      root.join("de/blog/post/index.html"),
      r#"<script src="/_astro/post.2.js"></script>"#,
    )
    .unwrap();
    fs::write(root.join("_astro/post.2.js"), "src=\"/_astro/fake.js\"").unwrap();

    let layout = AssetLayout::new(&root, "_astro", DirectoryLayout::Unified);
    assert_eq!(collect_html_files(&root).unwrap().len(), 2);

    let refs = extract_references(&layout).unwrap();
    assert!(refs.css.contains("home.1.css"));
    assert!(refs.js.contains("post.2.js"));
    assert!(!refs.js.contains("fake.js"));
  }
}
