use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use asset_pruner::{AssetPruner, CleanupReport, DryRunRemover, FsRemover, PrunerConfig};
use clap::Parser;
use log::{error, info};

/// Remove CSS and JS chunks that no rendered page can reach.
#[derive(Debug, Parser)]
#[command(name = "asset-pruner", version, about, long_about = None)]
struct Cli {
  /// Build output directory [default: from config, then "dist"]
  #[arg(long)]
  dist: Option<PathBuf>,

  /// Configuration file [default: asset-pruner.config.json when present]
  #[arg(long)]
  config: Option<PathBuf>,

  /// Report orphaned files without deleting them
  #[arg(long)]
  dry_run: bool,

  /// Fail when any orphaned file could not be deleted
  #[arg(long)]
  strict: bool,

  /// Print the cleanup report as JSON on stdout
  #[arg(long)]
  json: bool,
}

fn main() -> ExitCode {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    .format_timestamp(None)
    .format_target(false)
    .init();

  match run(Cli::parse()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      error!("Asset cleanup failed: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let config = match &cli.config {
    Some(path) => PrunerConfig::from_path(path)?,
    None => {
      let cwd = std::env::current_dir().context("failed to resolve the working directory")?;
      PrunerConfig::discover(&cwd)?
    }
  };
  let config = apply_overrides(&cli, config);

  let pruner = AssetPruner::new(config.to_layout());
  let report = if config.dry_run {
    pruner.run(&DryRunRemover)?
  } else {
    pruner.run(&FsRemover)?
  };

  if cli.json {
    println!("{}", render_json(&report)?);
  }
  info!("{}", report.summary_line());

  check_failures(&config, &report)
}

/// Command line flags take precedence over the configuration file.
fn apply_overrides(cli: &Cli, mut config: PrunerConfig) -> PrunerConfig {
  if let Some(dist) = &cli.dist {
    config.dist_dir = dist.clone();
  }
  config.dry_run |= cli.dry_run;
  config.fail_on_delete_error |= cli.strict;
  config
}

fn render_json(report: &CleanupReport) -> Result<String> {
  serde_json::to_string_pretty(report).context("failed to serialise cleanup report")
}

fn check_failures(config: &PrunerConfig, report: &CleanupReport) -> Result<()> {
  if config.fail_on_delete_error && report.has_failures() {
    bail!(
      "{} orphaned asset file(s) could not be deleted",
      report.failures.len()
    );
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use asset_pruner::{AssetLayout, AssetRemover, DirectoryLayout};
  use std::fs;
  use std::io;
  use std::path::Path;
  use tempfile::tempdir;

  struct ReadOnlyDisk;

  impl AssetRemover for ReadOnlyDisk {
    fn remove(&self, _path: &Path) -> io::Result<()> {
      Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only file system"))
    }
  }

  fn failed_report() -> CleanupReport {
    let temp = tempdir().unwrap();
    let root = temp.path().join("dist");
    fs::create_dir_all(root.join("_astro")).unwrap();
    fs::write(root.join("_astro/orphan.js"), "").unwrap();

    let layout = AssetLayout::new(&root, "_astro", DirectoryLayout::Unified);
    AssetPruner::new(layout).run(&ReadOnlyDisk).unwrap()
  }

  #[test]
  fn no_flags_keep_config_values() {
    let cli = Cli::parse_from(["asset-pruner"]);
    let config = PrunerConfig {
      dist_dir: PathBuf::from("build"),
      dry_run: true,
      ..PrunerConfig::default()
    };

    assert_eq!(apply_overrides(&cli, config.clone()), config);
  }

  #[test]
  fn flags_override_config() {
    let cli = Cli::parse_from(["asset-pruner", "--dist", "out", "--dry-run", "--strict"]);
    let config = apply_overrides(&cli, PrunerConfig::default());

    assert_eq!(config.dist_dir, PathBuf::from("out"));
    assert!(config.dry_run);
    assert!(config.fail_on_delete_error);
  }

  #[test]
  fn failed_deletions_are_tolerated_by_default() {
    let report = failed_report();
    assert!(report.has_failures());
    assert!(check_failures(&PrunerConfig::default(), &report).is_ok());
  }

  #[test]
  fn strict_mode_fails_on_deletion_errors() {
    let report = failed_report();
    let cli = Cli::parse_from(["asset-pruner", "--strict"]);
    let config = apply_overrides(&cli, PrunerConfig::default());

    let err = check_failures(&config, &report).unwrap_err();
    assert_eq!(err.to_string(), "1 orphaned asset file(s) could not be deleted");
  }

  #[test]
  fn strict_config_passes_clean_runs() {
    let config = PrunerConfig {
      fail_on_delete_error: true,
      ..PrunerConfig::default()
    };
    assert!(check_failures(&config, &CleanupReport::new(false)).is_ok());
  }

  #[test]
  fn json_report_lists_failures() {
    let json = render_json(&failed_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["deletedCount"], 0);
    assert_eq!(value["dryRun"], false);
    assert_eq!(value["failures"].as_array().map(Vec::len), Some(1));
  }
}
