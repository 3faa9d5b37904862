// src/watch/resolver.rs

//! Turns the configured finders into the set of directories to watch.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::{Result, StylewatchError};
use crate::finder::{Finder, FinderContext, FinderRegistry, IgnorePatterns};
use crate::fs::FileSystem;
use crate::watch::filter::has_watched_extension;

/// Deduplicated, ordered set of directories to watch recursively.
pub type WatchSet = BTreeSet<PathBuf>;

/// Holds live finders plus the filters applied to what they report.
///
/// `resolve` is a pure read: it re-enumerates every finder and returns a
/// fresh `WatchSet` each time.
#[derive(Debug)]
pub struct PathResolver {
    finders: Vec<Box<dyn Finder>>,
    extensions: Vec<String>,
    ignore: IgnorePatterns,
    build_output_root: PathBuf,
}

impl PathResolver {
    pub fn new(
        finders: Vec<Box<dyn Finder>>,
        extensions: Vec<String>,
        ignore: IgnorePatterns,
        build_output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            finders,
            extensions,
            ignore,
            build_output_root: build_output_root.into(),
        }
    }

    /// Instantiate every finder named in `[paths].finders`.
    ///
    /// Fails with `ConfigError` on the first identifier the registry cannot
    /// resolve. Relative paths are resolved against `root_dir`.
    pub fn from_config(
        cfg: &ConfigFile,
        root_dir: &Path,
        registry: &FinderRegistry,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let ctx = FinderContext {
            settings: &cfg.finder,
            root_dir,
            fs: &fs,
        };

        let finders = cfg
            .paths
            .finders
            .iter()
            .map(|spec| registry.instantiate(spec, &ctx))
            .collect::<Result<Vec<_>>>()?;

        let ignore = IgnorePatterns::new(&cfg.paths.ignore_patterns)?;

        Ok(Self::new(
            finders,
            cfg.paths.extensions.clone(),
            ignore,
            root_dir.join(&cfg.paths.build_output_root),
        ))
    }

    pub fn build_output_root(&self) -> &Path {
        &self.build_output_root
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Ignore globs handed to every finder.
    pub fn ignore_patterns(&self) -> &[String] {
        self.ignore.patterns()
    }

    pub fn finder_names(&self) -> Vec<&str> {
        self.finders.iter().map(|f| f.name()).collect()
    }

    /// Enumerate all finders and collect the directories holding matching
    /// stylesheets.
    ///
    /// A finder that fails to enumerate aborts the whole resolve with a
    /// `ConfigError`; a partial watch set would silently miss sources.
    pub fn resolve(&self) -> Result<WatchSet> {
        let mut watch_set = WatchSet::new();

        for finder in &self.finders {
            let files = finder.enumerate(&self.ignore).map_err(|err| {
                StylewatchError::ConfigError(format!(
                    "finder '{}' failed to list files: {err:#}",
                    finder.name()
                ))
            })?;

            for file in files {
                if !has_watched_extension(&file.relative_path, &self.extensions) {
                    continue;
                }
                if file.location.starts_with(&self.build_output_root) {
                    debug!(
                        location = ?file.location,
                        "inside build output root; ignoring"
                    );
                    continue;
                }
                if let Some(dir) = file.location.parent() {
                    watch_set.insert(dir.to_path_buf());
                }
            }
        }

        debug!(directories = watch_set.len(), "resolved watch set");
        Ok(watch_set)
    }
}
