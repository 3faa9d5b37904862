// src/watch/filter.rs

use std::collections::BTreeSet;

use crate::config::ConfigFile;
use crate::types::{ChangeEvent, ChangeKind};

/// Returns true if `path` ends with one of `extensions` (exact,
/// case-sensitive suffix match).
pub fn has_watched_extension(path: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| path.ends_with(ext.as_str()))
}

/// Decides which filesystem events should trigger a rebuild.
///
/// By default only in-place modifications count. `with_kinds` widens the
/// policy, e.g. to rebuild when a new partial is created.
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    extensions: Vec<String>,
    kinds: BTreeSet<ChangeKind>,
}

impl ChangeFilter {
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            extensions,
            kinds: BTreeSet::from([ChangeKind::Modified]),
        }
    }

    /// Replace the set of event kinds considered relevant.
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = ChangeKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(cfg.paths.extensions.clone()).with_kinds(cfg.config.trigger_on.iter().copied())
    }

    pub fn is_relevant(&self, event: &ChangeEvent) -> bool {
        if !self.kinds.contains(&event.kind) {
            return false;
        }
        has_watched_extension(&event.path.to_string_lossy(), &self.extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scss_filter() -> ChangeFilter {
        ChangeFilter::new(vec![".scss".to_string()])
    }

    #[test]
    fn modified_stylesheet_is_relevant() {
        let event = ChangeEvent::new("/src/a.scss", ChangeKind::Modified);
        assert!(scss_filter().is_relevant(&event));
    }

    #[test]
    fn other_kinds_are_ignored_by_default() {
        let filter = scss_filter();
        for kind in [ChangeKind::Created, ChangeKind::Deleted, ChangeKind::Moved] {
            assert!(!filter.is_relevant(&ChangeEvent::new("/src/a.scss", kind)));
        }
    }

    #[test]
    fn scripts_and_templates_never_match() {
        let filter = ChangeFilter::new(vec![
            ".scss".to_string(),
            ".less".to_string(),
            ".sass".to_string(),
        ]);
        assert!(!filter.is_relevant(&ChangeEvent::new("/src/app.js", ChangeKind::Modified)));
        assert!(!filter.is_relevant(&ChangeEvent::new("/src/index.html", ChangeKind::Modified)));
    }

    #[test]
    fn suffix_match_is_case_sensitive_and_exact() {
        let filter = scss_filter();
        assert!(!filter.is_relevant(&ChangeEvent::new("/src/A.SCSS", ChangeKind::Modified)));
        assert!(!filter.is_relevant(&ChangeEvent::new("/src/a.scss.swp", ChangeKind::Modified)));
        assert!(!filter.is_relevant(&ChangeEvent::new("/src/a.css", ChangeKind::Modified)));
    }

    #[test]
    fn widened_policy_accepts_creates_and_deletes() {
        let filter = scss_filter().with_kinds([
            ChangeKind::Modified,
            ChangeKind::Created,
            ChangeKind::Deleted,
        ]);
        assert!(filter.is_relevant(&ChangeEvent::new("/src/_partial.scss", ChangeKind::Created)));
        assert!(filter.is_relevant(&ChangeEvent::new("/src/_partial.scss", ChangeKind::Deleted)));
        assert!(!filter.is_relevant(&ChangeEvent::new("/src/_partial.scss", ChangeKind::Moved)));
    }
}
