//! Cleanup orchestrator tying reference extraction, import closure and removal together.

use log::debug;

use crate::closure::expand_import_closure;
use crate::error::PruneResult;
use crate::models::{CleanupReport, OrphanKind};
use crate::project::AssetLayout;
use crate::references::extract_references;
use crate::sweep::{AssetRemover, classify_orphans, is_server_chunk, list_assets, sweep_orphans};

/// Removes stylesheets and script chunks that no rendered page can reach.
#[derive(Debug, Clone)]
pub struct AssetPruner {
  layout: AssetLayout,
}

impl AssetPruner {
  /// Create a pruner for the provided build layout.
  pub fn new(layout: AssetLayout) -> Self {
    Self { layout }
  }

  /// Analyse the build output and hand every orphan to `remover`.
  ///
  /// All reads finish before the first removal. Stylesheets are matched against page
  /// references only; scripts against the import closure of the page references.
  pub fn run<R>(&self, remover: &R) -> PruneResult<CleanupReport>
  where
    R: AssetRemover + ?Sized,
  {
    let references = extract_references(&self.layout)?;

    let css_dir = self.layout.css_dir();
    let js_dir = self.layout.js_dir();
    let stylesheets = list_assets(&css_dir, "css")?;
    let scripts = list_assets(&js_dir, "js")?;

    let reachable_scripts = expand_import_closure(&references.js, &js_dir);
    debug!(
      "{} script chunk(s) reachable from {} entry chunk(s)",
      reachable_scripts.len(),
      references.js.len()
    );

    let css_orphans = classify_orphans(&css_dir, &stylesheets, &references.css, |_| {
      OrphanKind::Stylesheet
    });
    let marker = self.layout.server_marker.as_str();
    let js_orphans = classify_orphans(&js_dir, &scripts, &reachable_scripts, |path| {
      if is_server_chunk(path, marker) {
        OrphanKind::ServerChunk
      } else {
        OrphanKind::ClientChunk
      }
    });

    let mut report = CleanupReport::new(remover.is_dry_run());
    sweep_orphans(css_orphans, remover, &mut report);
    sweep_orphans(js_orphans, remover, &mut report);
    Ok(report)
  }
}
