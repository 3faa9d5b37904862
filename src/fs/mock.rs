// src/fs/mock.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use super::FileSystem;

#[derive(Debug, Clone)]
enum MockEntry {
    File,
    Dir(BTreeSet<PathBuf>),
}

/// In-memory directory tree. Paths are used verbatim, so tests should stick
/// to absolute paths like `/proj/assets/a.scss`.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.lock().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_dir(&mut entries, parent);
            Self::link_child(&mut entries, parent, &path);
        }
        entries.insert(path, MockEntry::File);
    }

    /// Add an (empty) directory, creating its parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_dir(&mut entries, path.as_ref());
    }

    fn ensure_dir(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        if path.as_os_str().is_empty() || entries.contains_key(path) {
            return;
        }
        entries.insert(path.to_path_buf(), MockEntry::Dir(BTreeSet::new()));
        if let Some(parent) = path.parent() {
            Self::ensure_dir(entries, parent);
            Self::link_child(entries, parent, path);
        }
    }

    fn link_child(entries: &mut BTreeMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
        if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
            children.insert(child.to_path_buf());
        }
    }
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        matches!(self.entries.lock().unwrap().get(path), Some(MockEntry::File))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries.lock().unwrap().get(path), Some(MockEntry::Dir(_)))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.entries.lock().unwrap().get(path) {
            Some(MockEntry::Dir(children)) => Ok(children.iter().cloned().collect()),
            Some(MockEntry::File) => Err(anyhow!("not a directory: {:?}", path)),
            None => Err(anyhow!("no such directory: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_file_creates_parents() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/assets/css/site.scss");

        assert!(fs.is_dir(Path::new("/proj/assets/css")));
        assert!(fs.is_file(Path::new("/proj/assets/css/site.scss")));
        assert_eq!(
            fs.read_dir(Path::new("/proj/assets")).unwrap(),
            vec![PathBuf::from("/proj/assets/css")]
        );
    }

    #[test]
    fn read_dir_on_missing_path_errors() {
        let fs = MockFileSystem::new();
        assert!(fs.read_dir(Path::new("/nope")).is_err());
        assert!(!fs.is_dir(Path::new("/nope")));
    }
}
