#![allow(dead_code)]

use stylewatch::config::{ConfigFile, RawConfigFile, StaticDirSpec};
use stylewatch::types::{ChangeKind, TriggerWhileRunningBehaviour};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from a config that validates: build output root `static_root`,
/// compile command `true`, default finders and extensions.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.paths.build_output_root = Some("static_root".to_string());
        config.build.compile = Some("true".to_string());
        Self { config }
    }

    pub fn with_behaviour(mut self, behaviour: TriggerWhileRunningBehaviour) -> Self {
        self.config.config.triggered_while_running_behaviour = behaviour;
        self
    }

    pub fn with_trigger_on(mut self, kinds: &[ChangeKind]) -> Self {
        self.config.config.trigger_on = kinds.to_vec();
        self
    }

    pub fn with_build_output_root(mut self, root: &str) -> Self {
        self.config.paths.build_output_root = Some(root.to_string());
        self
    }

    pub fn with_finders(mut self, finders: &[&str]) -> Self {
        self.config.paths.finders = finders.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.config.paths.extensions = extensions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_ignore_pattern(mut self, pattern: &str) -> Self {
        self.config.paths.ignore_patterns.push(pattern.to_string());
        self
    }

    pub fn with_static_dir(mut self, dir: &str) -> Self {
        self.config
            .finder
            .filesystem
            .dirs
            .push(StaticDirSpec::Path(dir.to_string()));
        self
    }

    pub fn with_prefixed_static_dir(mut self, prefix: &str, dir: &str) -> Self {
        self.config.finder.filesystem.dirs.push(StaticDirSpec::Prefixed {
            prefix: prefix.to_string(),
            path: dir.to_string(),
        });
        self
    }

    pub fn with_apps_root(mut self, root: &str) -> Self {
        self.config.finder.app_directories.apps_root = root.to_string();
        self
    }

    pub fn with_app(mut self, app: &str) -> Self {
        self.config.finder.app_directories.apps.push(app.to_string());
        self
    }

    pub fn with_compile(mut self, cmd: &str) -> Self {
        self.config.build.compile = Some(cmd.to_string());
        self
    }

    pub fn with_publish(mut self, cmd: &str) -> Self {
        self.config.build.publish = Some(cmd.to_string());
        self
    }

    /// The unvalidated config, for tests that exercise validation itself.
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
