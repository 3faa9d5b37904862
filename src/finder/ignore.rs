// src/finder/ignore.rs

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::{Result, StylewatchError};

/// Compiled ignore patterns (e.g. `*.js`, `*.html`).
///
/// A pattern matches either the full relative path or the bare file name, so
/// `*.js` hides `vendor/app.js` and `CVS` hides any directory called `CVS`.
#[derive(Debug, Clone)]
pub struct IgnorePatterns {
    patterns: Vec<String>,
    set: GlobSet,
}

impl IgnorePatterns {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            let glob = Glob::new(pat).map_err(|e| {
                StylewatchError::ConfigError(format!("invalid ignore pattern '{pat}': {e}"))
            })?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| StylewatchError::ConfigError(format!("building ignore set: {e}")))?;

        Ok(Self {
            patterns: patterns.to_vec(),
            set,
        })
    }

    /// Patterns that never match anything.
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_ignored(&self, relative_path: &str, file_name: &str) -> bool {
        self.set.is_match(relative_path) || self.set.is_match(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> IgnorePatterns {
        let owned: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        IgnorePatterns::new(&owned).unwrap()
    }

    #[test]
    fn default_patterns_hide_scripts_and_templates() {
        let ignore = patterns(&["*.js", "*.html"]);
        assert!(ignore.is_ignored("vendor/app.js", "app.js"));
        assert!(ignore.is_ignored("index.html", "index.html"));
        assert!(!ignore.is_ignored("css/site.scss", "site.scss"));
    }

    #[test]
    fn bare_name_pattern_matches_nested_directory() {
        let ignore = patterns(&["node_modules"]);
        assert!(ignore.is_ignored("theme/node_modules", "node_modules"));
        assert!(!ignore.is_ignored("theme/modules", "modules"));
    }

    #[test]
    fn none_matches_nothing() {
        assert!(!IgnorePatterns::none().is_ignored("a.js", "a.js"));
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let err = IgnorePatterns::new(&["a[".to_string()]).unwrap_err();
        assert!(matches!(err, StylewatchError::ConfigError(_)));
    }
}
