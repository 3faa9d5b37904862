// src/finder/walk.rs

use std::path::Path;

use anyhow::Result;

use crate::finder::{IgnorePatterns, StaticFile};
use crate::fs::FileSystem;

/// Recursively collect files under `dir`, pruning ignored entries.
///
/// `prefix` is prepended to every relative path (no trailing slash).
pub(crate) fn collect_files(
    fs: &dyn FileSystem,
    dir: &Path,
    prefix: &str,
    ignore: &IgnorePatterns,
    out: &mut Vec<StaticFile>,
) -> Result<()> {
    for entry in fs.read_dir(dir)? {
        let Some(name) = entry.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let relative = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };

        if ignore.is_ignored(&relative, &name) {
            continue;
        }

        if fs.is_dir(&entry) {
            collect_files(fs, &entry, &relative, ignore, out)?;
        } else if fs.is_file(&entry) {
            out.push(StaticFile::new(relative, entry));
        }
    }
    Ok(())
}
