// src/finder/filesystem.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::config::FileSystemFinderConfig;
use crate::finder::walk::collect_files;
use crate::finder::{Finder, IgnorePatterns, StaticFile};
use crate::fs::FileSystem;

/// Identifier under which this finder is registered.
pub const NAME: &str = "filesystem";

/// Serves files from explicitly configured source directories.
///
/// A directory may carry a prefix, in which case its files are published as
/// `<prefix>/<relative path>`. Directories that do not exist are skipped.
#[derive(Debug)]
pub struct FileSystemFinder {
    roots: Vec<(Option<String>, PathBuf)>,
    fs: Arc<dyn FileSystem>,
}

impl FileSystemFinder {
    pub fn new(roots: Vec<(Option<String>, PathBuf)>, fs: Arc<dyn FileSystem>) -> Self {
        Self { roots, fs }
    }

    /// Build from `[finder.filesystem]`, resolving relative dirs against
    /// `root_dir`.
    pub fn from_config(
        cfg: &FileSystemFinderConfig,
        root_dir: &std::path::Path,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let roots = cfg
            .dirs
            .iter()
            .map(|spec| {
                let prefix = spec
                    .prefix()
                    .map(|p| p.trim_matches('/').to_string())
                    .filter(|p| !p.is_empty());
                (prefix, root_dir.join(spec.path()))
            })
            .collect();
        Self::new(roots, fs)
    }
}

impl Finder for FileSystemFinder {
    fn name(&self) -> &str {
        NAME
    }

    fn enumerate(&self, ignore: &IgnorePatterns) -> Result<Vec<StaticFile>> {
        let mut files = Vec::new();
        for (prefix, root) in &self.roots {
            if !self.fs.is_dir(root) {
                debug!(dir = ?root, "static dir does not exist; skipping");
                continue;
            }
            collect_files(
                self.fs.as_ref(),
                root,
                prefix.as_deref().unwrap_or(""),
                ignore,
                &mut files,
            )?;
        }
        Ok(files)
    }
}
