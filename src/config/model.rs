// src/config/model.rs

use serde::Deserialize;

use crate::types::{ChangeKind, TriggerWhileRunningBehaviour};

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// triggered_while_running_behaviour = "queue"
///
/// [paths]
/// build_output_root = "static_root"
/// finders = ["filesystem"]
///
/// [finder.filesystem]
/// dirs = ["assets"]
///
/// [build]
/// compile = "sassc assets/main.scss static_root/main.css"
/// ```
///
/// Use `ConfigFile::try_from` (or `load_and_validate`) to get a checked
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Discovery inputs from `[paths]`.
    #[serde(default)]
    pub paths: PathsSection,

    /// Per-finder settings from `[finder.<name>]`.
    #[serde(default)]
    pub finder: FinderSection,

    /// Pipeline commands from `[build]`.
    #[serde(default)]
    pub build: BuildSection,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// so holders can rely on required values being present.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub paths: ValidatedPaths,
    pub finder: FinderSection,
    pub build: ValidatedBuild,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        paths: ValidatedPaths,
        finder: FinderSection,
        build: ValidatedBuild,
    ) -> Self {
        Self {
            config,
            paths,
            finder,
            build,
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// `"queue"` (default) or `"drop"`.
    #[serde(default)]
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,

    /// Which change kinds count as relevant. Defaults to `["modified"]`.
    #[serde(default = "default_trigger_on")]
    pub trigger_on: Vec<ChangeKind>,
}

fn default_trigger_on() -> Vec<ChangeKind> {
    vec![ChangeKind::Modified]
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::default(),
            trigger_on: default_trigger_on(),
        }
    }
}

/// `[paths]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    /// Directory compiled artifacts are written to. Required.
    #[serde(default)]
    pub build_output_root: Option<String>,

    /// Finder identifiers, resolved through the finder registry.
    #[serde(default = "default_finders")]
    pub finders: Vec<String>,

    /// Watched stylesheet extensions, including the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns for files (and directories) finders should skip.
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

pub fn default_finders() -> Vec<String> {
    vec!["filesystem".to_string(), "app_directories".to_string()]
}

pub fn default_extensions() -> Vec<String> {
    vec![".scss".to_string(), ".less".to_string(), ".sass".to_string()]
}

pub fn default_ignore_patterns() -> Vec<String> {
    vec!["*.js".to_string(), "*.html".to_string()]
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            build_output_root: None,
            finders: default_finders(),
            extensions: default_extensions(),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

/// `[paths]` after validation: the build output root is guaranteed.
#[derive(Debug, Clone)]
pub struct ValidatedPaths {
    pub build_output_root: String,
    pub finders: Vec<String>,
    pub extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
}

/// `[finder.*]` tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinderSection {
    #[serde(default)]
    pub filesystem: FileSystemFinderConfig,

    #[serde(default)]
    pub app_directories: AppDirectoriesFinderConfig,
}

/// `[finder.filesystem]`: explicit source directories.
///
/// ```toml
/// [finder.filesystem]
/// dirs = ["assets", { prefix = "vendor", path = "third_party/styles" }]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileSystemFinderConfig {
    #[serde(default)]
    pub dirs: Vec<StaticDirSpec>,
}

/// One entry of `[finder.filesystem].dirs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StaticDirSpec {
    Path(String),
    Prefixed { prefix: String, path: String },
}

impl StaticDirSpec {
    pub fn path(&self) -> &str {
        match self {
            StaticDirSpec::Path(path) => path,
            StaticDirSpec::Prefixed { path, .. } => path,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        match self {
            StaticDirSpec::Path(_) => None,
            StaticDirSpec::Prefixed { prefix, .. } => Some(prefix),
        }
    }
}

/// `[finder.app_directories]`: one static directory per application.
#[derive(Debug, Clone, Deserialize)]
pub struct AppDirectoriesFinderConfig {
    /// Directory whose children are applications.
    #[serde(default = "default_apps_root")]
    pub apps_root: String,

    /// Explicit application names. Empty means every child of `apps_root`.
    #[serde(default)]
    pub apps: Vec<String>,

    /// Static directory name inside each application.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
}

fn default_apps_root() -> String {
    "apps".to_string()
}

fn default_source_dir() -> String {
    "static".to_string()
}

impl Default for AppDirectoriesFinderConfig {
    fn default() -> Self {
        Self {
            apps_root: default_apps_root(),
            apps: Vec::new(),
            source_dir: default_source_dir(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSection {
    /// Shell command that compiles stylesheets. Required.
    #[serde(default)]
    pub compile: Option<String>,

    /// Shell command that collects compiled assets. Optional.
    #[serde(default)]
    pub publish: Option<String>,
}

/// `[build]` after validation.
#[derive(Debug, Clone)]
pub struct ValidatedBuild {
    pub compile: String,
    pub publish: Option<String>,
}
