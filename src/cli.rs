// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `stylewatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stylewatch",
    version,
    about = "Recompile stylesheets and publish static assets when sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML). Defaults to `Stylewatch.toml` in the
    /// current directory.
    ///
    /// Relative paths inside it are resolved against its directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Build once based on current sources, no watching.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STYLEWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the watch directories, but don't build.
    #[arg(long, conflicts_with = "once")]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
