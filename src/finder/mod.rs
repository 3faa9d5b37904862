// src/finder/mod.rs

//! Pluggable strategies that enumerate candidate static files.
//!
//! A finder answers one question: "which files do you serve, as
//! (relative path, absolute location) pairs?". Concrete finders are looked up
//! by identifier in a [`FinderRegistry`], so the set used at runtime comes
//! straight from `[paths].finders` in the config.
//!
//! - [`filesystem`]: explicitly configured source directories.
//! - [`app_directories`]: one static directory per application.
//! - [`ignore`]: compiled ignore globs shared by all finders.

pub mod app_directories;
pub mod filesystem;
pub mod ignore;
pub mod registry;
mod walk;

use std::fmt::Debug;
use std::path::PathBuf;

use anyhow::Result;

pub use app_directories::AppDirectoriesFinder;
pub use filesystem::FileSystemFinder;
pub use ignore::IgnorePatterns;
pub use registry::{FinderContext, FinderFactory, FinderRegistry};

/// A file a finder can serve.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StaticFile {
    /// Path as it would be published, forward slashes (e.g. `css/site.scss`).
    pub relative_path: String,
    /// Where the file lives on disk.
    pub location: PathBuf,
}

impl StaticFile {
    pub fn new(relative_path: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            location: location.into(),
        }
    }
}

/// Capability shared by every finder strategy.
///
/// `enumerate` is called again on every resolve; finders keep no state
/// between calls.
pub trait Finder: Send + Sync + Debug {
    /// Identifier this finder was registered under.
    fn name(&self) -> &str;

    /// List candidate files, skipping anything matched by `ignore`.
    fn enumerate(&self, ignore: &IgnorePatterns) -> Result<Vec<StaticFile>>;
}
