//! Description of where a static build writes its pages and hashed asset chunks.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Conventional build output directory.
pub const DEFAULT_DIST_DIR: &str = "dist";

/// Asset prefix used by the unified `_astro/` output.
pub const DEFAULT_ASSET_PREFIX: &str = "_astro";

/// Import path fragment that only server-rendered chunks pull in.
pub const DEFAULT_SERVER_MARKER: &str = "astro/dist/runtime/server/";

/// How CSS and JS chunks are distributed beneath the asset prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryLayout {
  /// Stylesheets and scripts share `<prefix>/`.
  #[default]
  Unified,
  /// Stylesheets live in `<prefix>/css/` and scripts in `<prefix>/js/`.
  Split,
}

/// Resolved layout of a build output tree.
///
/// The same prefix is used both for the on-disk directory below `dist_root` and for the
/// absolute URL path that rendered pages use to reference the assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
  /// Root of the build output containing the rendered `*.html` pages.
  pub dist_root: PathBuf,
  /// Asset prefix relative to the root, without surrounding slashes.
  pub asset_prefix: String,
  /// Whether CSS and JS chunks share one directory.
  pub directory_layout: DirectoryLayout,
  /// Substring identifying chunks that belong to the server runtime.
  pub server_marker: String,
}

impl AssetLayout {
  /// Create a layout using the default server marker.
  pub fn new(
    dist_root: impl Into<PathBuf>,
    asset_prefix: &str,
    directory_layout: DirectoryLayout,
  ) -> Self {
    Self {
      dist_root: dist_root.into(),
      asset_prefix: asset_prefix.trim_matches('/').to_string(),
      directory_layout,
      server_marker: DEFAULT_SERVER_MARKER.to_string(),
    }
  }

  /// Replace the server-runtime marker.
  pub fn with_server_marker(mut self, marker: impl Into<String>) -> Self {
    self.server_marker = marker.into();
    self
  }

  /// URL path segment (no leading slash) under which pages reference stylesheets.
  pub fn css_url_prefix(&self) -> String {
    self.url_prefix_for("css")
  }

  /// URL path segment (no leading slash) under which pages reference scripts.
  pub fn js_url_prefix(&self) -> String {
    self.url_prefix_for("js")
  }

  /// Absolute URL path, with leading and trailing slash, of referenced stylesheets.
  ///
  /// An empty prefix yields `/`, meaning assets sit directly below the site root.
  pub fn css_url_path(&self) -> String {
    absolute_url_path(&self.css_url_prefix())
  }

  /// Absolute URL path, with leading and trailing slash, of referenced scripts.
  pub fn js_url_path(&self) -> String {
    absolute_url_path(&self.js_url_prefix())
  }

  /// Directory holding the generated stylesheets.
  pub fn css_dir(&self) -> PathBuf {
    join_url_segments(&self.dist_root, &self.css_url_prefix())
  }

  /// Directory holding the generated script chunks.
  pub fn js_dir(&self) -> PathBuf {
    join_url_segments(&self.dist_root, &self.js_url_prefix())
  }

  fn url_prefix_for(&self, kind: &str) -> String {
    match (self.directory_layout, self.asset_prefix.is_empty()) {
      (DirectoryLayout::Unified, _) => self.asset_prefix.clone(),
      (DirectoryLayout::Split, true) => kind.to_string(),
      (DirectoryLayout::Split, false) => format!("{}/{}", self.asset_prefix, kind),
    }
  }
}

impl Default for AssetLayout {
  fn default() -> Self {
    Self::new(DEFAULT_DIST_DIR, DEFAULT_ASSET_PREFIX, DirectoryLayout::Unified)
  }
}

fn absolute_url_path(url_prefix: &str) -> String {
  let segments: Vec<&str> = url_prefix
    .split('/')
    .filter(|segment| !segment.is_empty())
    .collect();
  if segments.is_empty() {
    "/".to_string()
  } else {
    format!("/{}/", segments.join("/"))
  }
}

fn join_url_segments(root: &Path, url_prefix: &str) -> PathBuf {
  url_prefix
    .split('/')
    .filter(|segment| !segment.is_empty())
    .fold(root.to_path_buf(), |path, segment| path.join(segment))
}
