// src/config/validate.rs

use globset::Glob;

use crate::config::model::{
    BuildSection, ConfigFile, PathsSection, RawConfigFile, ValidatedBuild, ValidatedPaths,
};
use crate::errors::{Result, StylewatchError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = StylewatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_global_config(&raw)?;
        let paths = validate_paths(raw.paths)?;
        let build = validate_build(raw.build)?;
        Ok(ConfigFile::new_unchecked(raw.config, paths, raw.finder, build))
    }
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    // triggered_while_running_behaviour and trigger_on kinds are checked by
    // serde during deserialization.
    if cfg.config.trigger_on.is_empty() {
        return Err(StylewatchError::ConfigError(
            "[config].trigger_on must list at least one change kind".to_string(),
        ));
    }
    Ok(())
}

fn validate_paths(paths: PathsSection) -> Result<ValidatedPaths> {
    let build_output_root = match paths.build_output_root {
        Some(root) if !root.trim().is_empty() => root,
        _ => {
            return Err(StylewatchError::ConfigError(
                "[paths].build_output_root is required".to_string(),
            ));
        }
    };

    if paths.extensions.is_empty() {
        return Err(StylewatchError::ConfigError(
            "[paths].extensions must not be empty".to_string(),
        ));
    }
    for ext in &paths.extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(StylewatchError::ConfigError(format!(
                "extension '{ext}' in [paths].extensions must look like \".scss\""
            )));
        }
    }

    for pattern in &paths.ignore_patterns {
        Glob::new(pattern).map_err(|e| {
            StylewatchError::ConfigError(format!(
                "invalid glob '{pattern}' in [paths].ignore_patterns: {e}"
            ))
        })?;
    }

    for name in &paths.finders {
        if name.trim().is_empty() {
            return Err(StylewatchError::ConfigError(
                "[paths].finders contains an empty identifier".to_string(),
            ));
        }
    }

    Ok(ValidatedPaths {
        build_output_root,
        finders: paths.finders,
        extensions: paths.extensions,
        ignore_patterns: paths.ignore_patterns,
    })
}

fn validate_build(build: BuildSection) -> Result<ValidatedBuild> {
    let compile = match build.compile {
        Some(cmd) if !cmd.trim().is_empty() => cmd,
        _ => {
            return Err(StylewatchError::ConfigError(
                "[build].compile is required".to_string(),
            ));
        }
    };

    let publish = build.publish.filter(|cmd| !cmd.trim().is_empty());

    Ok(ValidatedBuild { compile, publish })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChangeKind, TriggerWhileRunningBehaviour};

    fn parse(toml_str: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(toml_str)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = parse(
            r#"
[paths]
build_output_root = "out"

[build]
compile = "true"
"#,
        )
        .unwrap();

        assert_eq!(cfg.paths.extensions, vec![".scss", ".less", ".sass"]);
        assert_eq!(cfg.paths.ignore_patterns, vec!["*.js", "*.html"]);
        assert_eq!(cfg.paths.finders, vec!["filesystem", "app_directories"]);
        assert_eq!(cfg.config.trigger_on, vec![ChangeKind::Modified]);
        assert_eq!(
            cfg.config.triggered_while_running_behaviour,
            TriggerWhileRunningBehaviour::Queue
        );
        assert!(cfg.build.publish.is_none());
    }

    #[test]
    fn missing_build_output_root_is_config_error() {
        let err = parse("[build]\ncompile = \"true\"\n").unwrap_err();
        match err {
            StylewatchError::ConfigError(msg) => assert!(msg.contains("build_output_root")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn missing_compile_command_is_config_error() {
        let err = parse("[paths]\nbuild_output_root = \"out\"\n").unwrap_err();
        assert!(matches!(err, StylewatchError::ConfigError(msg) if msg.contains("compile")));
    }

    #[test]
    fn extension_without_dot_is_rejected() {
        let err = parse(
            r#"
[paths]
build_output_root = "out"
extensions = ["scss"]

[build]
compile = "true"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, StylewatchError::ConfigError(_)));
    }

    #[test]
    fn bad_ignore_glob_is_rejected() {
        let err = parse(
            r#"
[paths]
build_output_root = "out"
ignore_patterns = ["[unclosed"]

[build]
compile = "true"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, StylewatchError::ConfigError(msg) if msg.contains("[unclosed")));
    }

    #[test]
    fn unknown_behaviour_fails_to_parse() {
        let raw: std::result::Result<RawConfigFile, _> =
            toml::from_str("[config]\ntriggered_while_running_behaviour = \"explode\"\n");
        assert!(raw.is_err());
    }

    #[test]
    fn blank_publish_is_treated_as_absent() {
        let cfg = parse(
            r#"
[paths]
build_output_root = "out"

[build]
compile = "true"
publish = "  "
"#,
        )
        .unwrap();
        assert!(cfg.build.publish.is_none());
    }
}
