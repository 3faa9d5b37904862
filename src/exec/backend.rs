// src/exec/backend.rs

//! Runs pipeline executions off the runtime loop.
//!
//! The runtime asks the `BuildExecutor` to start a build and keeps consuming
//! events; when the pipeline finishes, the executor reports back with
//! `RuntimeEvent::BuildFinished`. This keeps the runtime free to coalesce
//! change events while a build is in flight.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::engine::{BuildId, RuntimeEvent};
use crate::exec::pipeline::BuildPipeline;

#[derive(Debug)]
pub struct BuildExecutor {
    pipeline: BuildPipeline,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    in_flight: Option<JoinHandle<()>>,
}

impl BuildExecutor {
    pub fn new(pipeline: BuildPipeline, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            pipeline,
            runtime_tx,
            in_flight: None,
        }
    }

    /// Spawn one pipeline execution tagged with `build_id`.
    pub fn start(&mut self, build_id: BuildId) {
        if let Some(previous) = &self.in_flight {
            if !previous.is_finished() {
                // The trigger state machine never starts a build while one is
                // running; seeing this means the caller broke that contract.
                error!(build_id, "build started while previous build still running");
            }
        }

        let pipeline = self.pipeline.clone();
        let tx = self.runtime_tx.clone();

        let handle = tokio::spawn(async move {
            debug!(build_id, "build task started");
            let outcome = pipeline.run().await;
            if tx
                .send(RuntimeEvent::BuildFinished { build_id, outcome })
                .await
                .is_err()
            {
                debug!(build_id, "runtime gone before build finished");
            }
        });

        self.in_flight = Some(handle);
    }
}
