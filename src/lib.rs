#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod closure;
pub mod config;
pub mod error;
pub mod models;
pub mod project;
pub mod pruner;
pub mod references;
pub mod sweep;

pub use config::PrunerConfig;
pub use error::{ConfigError, PruneError, PruneResult};
pub use models::{CleanupReport, DeletedAsset, DeletionFailure, OrphanKind, ReferencedAssets};
pub use project::{AssetLayout, DirectoryLayout};
pub use pruner::AssetPruner;
pub use sweep::{AssetRemover, DryRunRemover, FsRemover};
