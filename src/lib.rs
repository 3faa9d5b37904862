// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod finder;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{config_root_dir, default_config_path, load_and_validate, ConfigFile};
use crate::engine::WatchCoordinator;
use crate::errors::{Result, StylewatchError};
use crate::finder::FinderRegistry;
use crate::fs::RealFileSystem;
use crate::watch::NotifyWatchService;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - finder registry / path resolver
/// - build pipeline
/// - (optional) file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args
        .config
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&config_path)?;
    let root_dir = config_root_dir(&config_path);
    debug!(root = ?root_dir, "project root");

    let registry = FinderRegistry::with_builtin();
    let coordinator =
        WatchCoordinator::from_config(&cfg, &root_dir, &registry, Arc::new(RealFileSystem))?;

    if args.dry_run {
        return print_dry_run(&cfg, &coordinator);
    }

    if args.once {
        let report = coordinator.run_once().await?;
        if report.compile_failures > 0 {
            return Err(StylewatchError::CompileError(
                "stylesheets did not compile; see the log above".to_string(),
            ));
        }
        return Ok(());
    }

    let (changes_tx, changes_rx) = mpsc::unbounded_channel();
    let service = NotifyWatchService::new(changes_tx)?;

    // Ctrl-C → graceful shutdown.
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("interrupt received");
    };

    let report = coordinator.run(service, changes_rx, shutdown).await?;
    info!(
        builds = report.builds_started,
        compile_failures = report.compile_failures,
        "stylewatch stopped"
    );
    Ok(())
}

/// Dry-run output: effective settings and the directories that would be
/// watched.
fn print_dry_run(cfg: &ConfigFile, coordinator: &WatchCoordinator) -> Result<()> {
    let watch_set = coordinator.watch_set()?;

    println!("stylewatch dry-run");
    println!(
        "  config.triggered_while_running_behaviour = {:?}",
        cfg.config.triggered_while_running_behaviour
    );
    println!("  config.trigger_on = {:?}", cfg.config.trigger_on);
    let resolver = coordinator.resolver();
    println!("  finders = {:?}", resolver.finder_names());
    println!("  extensions = {:?}", resolver.extensions());
    println!("  ignore_patterns = {:?}", resolver.ignore_patterns());
    println!(
        "  build_output_root = {}",
        resolver.build_output_root().display()
    );
    println!("  compile: {}", cfg.build.compile);
    if let Some(ref publish) = cfg.build.publish {
        println!("  publish: {publish}");
    }
    println!();

    println!("watch directories ({}):", watch_set.len());
    for dir in &watch_set {
        println!("  - {}", dir.display());
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
