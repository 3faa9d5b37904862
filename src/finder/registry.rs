// src/finder/registry.rs

//! Registry mapping finder identifiers to constructors.
//!
//! Every identifier listed in `[paths].finders` is looked up here once at
//! startup. Unknown identifiers are a configuration error, reported before
//! any directory is watched.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::FinderSection;
use crate::errors::{Result, StylewatchError};
use crate::finder::{app_directories, filesystem, AppDirectoriesFinder, FileSystemFinder, Finder};
use crate::fs::FileSystem;

/// Everything a factory may need to build its finder.
#[derive(Debug, Clone, Copy)]
pub struct FinderContext<'a> {
    pub settings: &'a FinderSection,
    pub root_dir: &'a Path,
    pub fs: &'a Arc<dyn FileSystem>,
}

pub type FinderFactory = Box<dyn Fn(&FinderContext<'_>) -> Result<Box<dyn Finder>> + Send + Sync>;

pub struct FinderRegistry {
    factories: BTreeMap<String, FinderFactory>,
    aliases: BTreeMap<String, String>,
}

impl fmt::Debug for FinderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderRegistry")
            .field("finders", &self.factories.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl Default for FinderRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl FinderRegistry {
    /// A registry with nothing in it.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }

    /// Registry with the `filesystem` and `app_directories` finders, plus
    /// the Django class paths people tend to copy from their settings.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();

        registry.register(filesystem::NAME, build_filesystem);
        registry.register(app_directories::NAME, build_app_directories);

        registry.alias(
            "django.contrib.staticfiles.finders.FileSystemFinder",
            filesystem::NAME,
        );
        registry.alias(
            "django.contrib.staticfiles.finders.AppDirectoriesFinder",
            app_directories::NAME,
        );

        registry
    }

    /// Register (or replace) a finder constructor.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&FinderContext<'_>) -> Result<Box<dyn Finder>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Make `alias` resolve to the finder registered as `target`.
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
    }

    /// Registered identifiers (aliases excluded).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn contains(&self, spec: &str) -> bool {
        self.factories.contains_key(self.canonical(spec))
    }

    fn canonical<'a>(&'a self, spec: &'a str) -> &'a str {
        let spec = spec.trim();
        self.aliases.get(spec).map(String::as_str).unwrap_or(spec)
    }

    /// Build the finder named by `spec`.
    pub fn instantiate(&self, spec: &str, ctx: &FinderContext<'_>) -> Result<Box<dyn Finder>> {
        let name = self.canonical(spec);
        let factory = self.factories.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.names().collect();
            StylewatchError::ConfigError(format!(
                "unknown finder '{spec}' (known finders: {})",
                known.join(", ")
            ))
        })?;

        factory(ctx).map_err(|err| match err {
            StylewatchError::ConfigError(msg) => StylewatchError::ConfigError(msg),
            other => StylewatchError::ConfigError(format!("finder '{spec}' failed to start: {other}")),
        })
    }
}

fn build_filesystem(ctx: &FinderContext<'_>) -> Result<Box<dyn Finder>> {
    Ok(Box::new(FileSystemFinder::from_config(
        &ctx.settings.filesystem,
        ctx.root_dir,
        Arc::clone(ctx.fs),
    )))
}

fn build_app_directories(ctx: &FinderContext<'_>) -> Result<Box<dyn Finder>> {
    Ok(Box::new(AppDirectoriesFinder::from_config(
        &ctx.settings.app_directories,
        ctx.root_dir,
        Arc::clone(ctx.fs),
    )))
}
