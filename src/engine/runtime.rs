// src/engine/runtime.rs

use std::fmt;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::errors::{Result, StylewatchError};
use crate::exec::{BuildExecutor, BuildStage};

use super::trigger::{RebuildTrigger, RunReport};
use super::{CoreCommand, RuntimeEvent, TriggerReason};

/// Drives the rebuild state machine in response to `RuntimeEvent`s and
/// delegates pipeline execution to a `BuildExecutor`.
///
/// This is a pure IO shell around `RebuildTrigger`, which contains all the
/// runtime semantics. Because this loop is the only owner of the trigger,
/// every state transition is serialized without a lock.
pub struct Runtime {
    core: RebuildTrigger,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: BuildExecutor,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(
        core: RebuildTrigger,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        executor: BuildExecutor,
    ) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop.
    ///
    /// - Issues the initial build before reading any event, so changes that
    ///   are already queued fold into a follow-up build.
    /// - Consumes `RuntimeEvent`s from `event_rx` and feeds them to the core.
    /// - Executes the commands the core returns.
    ///
    /// Returns the run counters on clean exit, or the fatal pipeline error.
    pub async fn run(mut self) -> Result<RunReport> {
        info!("stylewatch runtime started");

        let initial = self.core.step(RuntimeEvent::RebuildRequested {
            reason: TriggerReason::Initial,
        });
        let mut keep_running = initial.keep_running;
        for command in initial.commands {
            self.execute_command(command)?;
        }

        while keep_running {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command)?;
            }

            keep_running = step.keep_running;
        }

        info!(report = ?self.core.report(), "runtime exiting");
        Ok(self.core.report().clone())
    }

    fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartBuild(build_id) => {
                debug!(build_id, "starting build");
                self.executor.start(build_id);
                Ok(())
            }
            CoreCommand::Abort { stage, message } => {
                error!(?stage, error = %message, "build pipeline failed");
                Err(match stage {
                    BuildStage::Publish => StylewatchError::PublishError(message),
                    BuildStage::Compile => {
                        StylewatchError::Other(anyhow!("compile step could not run: {message}"))
                    }
                })
            }
        }
    }
}
