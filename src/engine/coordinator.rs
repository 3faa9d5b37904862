// src/engine/coordinator.rs

//! Top-level orchestration: resolve paths, register watches, run the
//! initial build, then rebuild on relevant changes until shut down.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::config::ConfigFile;
use crate::engine::runtime::Runtime;
use crate::engine::trigger::{RebuildTrigger, RunReport};
use crate::engine::{RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::Result;
use crate::exec::{BuildExecutor, BuildPipeline, ShellCompiler, ShellPublisher};
use crate::finder::FinderRegistry;
use crate::fs::FileSystem;
use crate::types::{ChangeEvent, TriggerWhileRunningBehaviour};
use crate::watch::{schedule_all, ChangeFilter, PathResolver, WatchService, WatchSet};

#[derive(Debug)]
pub struct WatchCoordinator {
    resolver: PathResolver,
    filter: ChangeFilter,
    pipeline: BuildPipeline,
    behaviour: TriggerWhileRunningBehaviour,
}

impl WatchCoordinator {
    pub fn new(
        resolver: PathResolver,
        filter: ChangeFilter,
        pipeline: BuildPipeline,
        behaviour: TriggerWhileRunningBehaviour,
    ) -> Self {
        Self {
            resolver,
            filter,
            pipeline,
            behaviour,
        }
    }

    /// Build every component from a validated config.
    ///
    /// Finders are instantiated here, so an unknown finder identifier fails
    /// before anything is watched. Build commands run in `root_dir`.
    pub fn from_config(
        cfg: &ConfigFile,
        root_dir: &Path,
        registry: &FinderRegistry,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let resolver = PathResolver::from_config(cfg, root_dir, registry, fs)?;
        let filter = ChangeFilter::from_config(cfg);

        let cwd = Some(root_dir.to_path_buf());
        let compiler = ShellCompiler::new(cfg.build.compile.clone(), cwd.clone());
        let mut pipeline = BuildPipeline::new(Arc::new(compiler));
        if let Some(publish) = &cfg.build.publish {
            let publisher = ShellPublisher::new(publish.clone(), cwd);
            pipeline = pipeline.with_publisher(Arc::new(publisher));
        }

        Ok(Self::new(
            resolver,
            filter,
            pipeline,
            cfg.config.triggered_while_running_behaviour,
        ))
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Resolve the directories that would be watched.
    pub fn watch_set(&self) -> Result<WatchSet> {
        self.resolver.resolve()
    }

    /// Resolve paths and run the pipeline once, without watching.
    pub async fn run_once(self) -> Result<RunReport> {
        let watch_set = self.resolver.resolve()?;
        info!(directories = watch_set.len(), "resolved stylesheet directories");

        let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(8);
        let executor = BuildExecutor::new(self.pipeline, rt_tx);
        let core = RebuildTrigger::new(
            self.behaviour,
            RuntimeOptions {
                exit_when_idle: true,
            },
        );

        Runtime::new(core, rt_rx, executor).run().await
    }

    /// Watch until `shutdown` resolves.
    ///
    /// Sequence:
    /// 1. resolve the watch set (configuration errors surface here, before
    ///    any registration);
    /// 2. register each directory with `service`, skipping the ones it
    ///    refuses;
    /// 3. start the runtime, which performs the initial build and then
    ///    rebuilds on relevant events read from `changes_rx`;
    /// 4. on shutdown, wait for the in-flight build, release every watch and
    ///    return.
    pub async fn run<S, F>(
        self,
        mut service: S,
        mut changes_rx: mpsc::UnboundedReceiver<ChangeEvent>,
        shutdown: F,
    ) -> Result<RunReport>
    where
        S: WatchService,
        F: Future<Output = ()> + Send + 'static,
    {
        let watch_set = self.resolver.resolve()?;
        info!(directories = watch_set.len(), "resolved stylesheet directories");

        schedule_all(&mut service, watch_set.iter());

        let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

        let shutdown_task = {
            let tx = rt_tx.clone();
            tokio::spawn(async move {
                shutdown.await;
                if tx.send(RuntimeEvent::ShutdownRequested).await.is_err() {
                    debug!("runtime gone before shutdown was delivered");
                }
            })
        };

        let forward_task = {
            let tx = rt_tx.clone();
            let filter = self.filter.clone();
            tokio::spawn(async move {
                while let Some(change) = changes_rx.recv().await {
                    if !filter.is_relevant(&change) {
                        trace!(path = ?change.path, kind = ?change.kind, "irrelevant change");
                        continue;
                    }
                    debug!(path = ?change.path, kind = ?change.kind, "stylesheet changed");
                    let event = RuntimeEvent::RebuildRequested {
                        reason: TriggerReason::FileChange(change.path),
                    };
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                debug!("change forwarder finished");
            })
        };

        let executor = BuildExecutor::new(self.pipeline, rt_tx);
        let core = RebuildTrigger::new(self.behaviour, RuntimeOptions::default());
        let result = Runtime::new(core, rt_rx, executor).run().await;

        forward_task.abort();
        shutdown_task.abort();
        service.unschedule_all();
        drop(service);
        info!("file watches released");

        result
    }
}
