// src/finder/app_directories.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::config::AppDirectoriesFinderConfig;
use crate::finder::walk::collect_files;
use crate::finder::{Finder, IgnorePatterns, StaticFile};
use crate::fs::FileSystem;

pub const NAME: &str = "app_directories";

/// Serves files from each application's own static directory,
/// `<apps_root>/<app>/<source_dir>/`.
///
/// Applications without a static directory contribute nothing.
#[derive(Debug)]
pub struct AppDirectoriesFinder {
    apps_root: PathBuf,
    apps: Vec<String>,
    source_dir: String,
    fs: Arc<dyn FileSystem>,
}

impl AppDirectoriesFinder {
    pub fn from_config(
        cfg: &AppDirectoriesFinderConfig,
        root_dir: &Path,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            apps_root: root_dir.join(&cfg.apps_root),
            apps: cfg.apps.clone(),
            source_dir: cfg.source_dir.clone(),
            fs,
        }
    }

    fn app_dirs(&self) -> Result<Vec<PathBuf>> {
        if !self.apps.is_empty() {
            return Ok(self.apps.iter().map(|app| self.apps_root.join(app)).collect());
        }
        if !self.fs.is_dir(&self.apps_root) {
            debug!(apps_root = ?self.apps_root, "apps root does not exist; no app directories");
            return Ok(Vec::new());
        }
        Ok(self
            .fs
            .read_dir(&self.apps_root)?
            .into_iter()
            .filter(|p| self.fs.is_dir(p))
            .collect())
    }
}

impl Finder for AppDirectoriesFinder {
    fn name(&self) -> &str {
        NAME
    }

    fn enumerate(&self, ignore: &IgnorePatterns) -> Result<Vec<StaticFile>> {
        let mut files = Vec::new();
        for app_dir in self.app_dirs()? {
            let static_dir = app_dir.join(&self.source_dir);
            if !self.fs.is_dir(&static_dir) {
                continue;
            }
            collect_files(self.fs.as_ref(), &static_dir, "", ignore, &mut files)?;
        }
        Ok(files)
    }
}
