// src/engine/trigger.rs

//! Pure rebuild state machine.
//!
//! `RebuildTrigger` consumes [`RuntimeEvent`]s and produces:
//! - an updated state (`Idle`, or `Running` with a pending flag)
//! - a list of commands describing what the IO shell should do next
//!
//! It has no channels, no Tokio types and performs no IO, so every
//! interleaving of requests, completions and shutdown can be unit tested
//! directly.

use tracing::{debug, info, warn};

use crate::engine::{BuildId, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::exec::{BuildOutcome, BuildStage};
use crate::types::TriggerWhileRunningBehaviour;

/// Whether a build is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildState {
    Idle,
    Running {
        build_id: BuildId,
        /// Set when a request arrived mid-build (queue mode only).
        pending: bool,
    },
}

/// Command produced by the core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run the pipeline once, tagged with this id.
    StartBuild(BuildId),
    /// Stop with an error; the pipeline failed in a way that is not
    /// recoverable.
    Abort { stage: BuildStage, message: String },
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn stop_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: false,
        }
    }
}

/// Counters accumulated over the life of a runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub builds_started: usize,
    pub builds_succeeded: usize,
    pub compile_failures: usize,
    /// Requests folded into an already-pending follow-up build.
    pub coalesced_requests: usize,
    /// Requests ignored because a build was running (drop mode) or the
    /// runtime was shutting down.
    pub dropped_requests: usize,
}

#[derive(Debug)]
pub struct RebuildTrigger {
    state: RebuildState,
    behaviour: TriggerWhileRunningBehaviour,
    options: RuntimeOptions,
    shutting_down: bool,
    next_build_id: BuildId,
    report: RunReport,
}

impl RebuildTrigger {
    pub fn new(behaviour: TriggerWhileRunningBehaviour, options: RuntimeOptions) -> Self {
        Self {
            state: RebuildState::Idle,
            behaviour,
            options,
            shutting_down: false,
            next_build_id: 0,
            report: RunReport::default(),
        }
    }

    pub fn state(&self) -> RebuildState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == RebuildState::Idle
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Handle a single runtime event, updating state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::RebuildRequested { reason } => self.handle_request(reason),
            RuntimeEvent::BuildFinished { build_id, outcome } => {
                self.handle_finished(build_id, outcome)
            }
            RuntimeEvent::ShutdownRequested => self.handle_shutdown(),
        }
    }

    fn handle_request(&mut self, reason: TriggerReason) -> CoreStep {
        if self.shutting_down {
            debug!(?reason, "shutting down; ignoring rebuild request");
            self.report.dropped_requests += 1;
            return CoreStep::continue_with(Vec::new());
        }

        match self.state {
            RebuildState::Idle => {
                info!(?reason, "rebuild requested");
                CoreStep::continue_with(vec![self.start_build()])
            }
            RebuildState::Running { build_id, pending } => {
                match self.behaviour {
                    TriggerWhileRunningBehaviour::Queue => {
                        if pending {
                            self.report.coalesced_requests += 1;
                        }
                        self.state = RebuildState::Running {
                            build_id,
                            pending: true,
                        };
                        debug!(?reason, build_id, "build running; follow-up queued");
                    }
                    TriggerWhileRunningBehaviour::Drop => {
                        self.report.dropped_requests += 1;
                        debug!(?reason, build_id, "build running; request dropped");
                    }
                }
                CoreStep::continue_with(Vec::new())
            }
        }
    }

    fn handle_finished(&mut self, build_id: BuildId, outcome: BuildOutcome) -> CoreStep {
        let pending = match self.state {
            RebuildState::Running {
                build_id: running,
                pending,
            } if running == build_id => pending,
            _ => {
                warn!(build_id, state = ?self.state, "completion for unknown build; ignoring");
                return CoreStep::continue_with(Vec::new());
            }
        };

        self.state = RebuildState::Idle;

        match outcome {
            BuildOutcome::Succeeded { published } => {
                self.report.builds_succeeded += 1;
                info!(build_id, published, "build finished");
            }
            BuildOutcome::CompileFailed(message) => {
                self.report.compile_failures += 1;
                warn!(build_id, error = %message, "stylesheet compilation failed");
                warn!("fix the stylesheet and save it again; compilation will retry on the next change");
            }
            BuildOutcome::Aborted { stage, message } => {
                return CoreStep::stop_with(vec![CoreCommand::Abort { stage, message }]);
            }
        }

        if pending && !self.shutting_down {
            debug!("running queued follow-up build");
            return CoreStep::continue_with(vec![self.start_build()]);
        }

        if self.shutting_down {
            info!("in-flight build finished; stopping");
            return CoreStep::stop_with(Vec::new());
        }

        if self.options.exit_when_idle {
            info!("idle and exit_when_idle=true; stopping");
            return CoreStep::stop_with(Vec::new());
        }

        CoreStep::continue_with(Vec::new())
    }

    fn handle_shutdown(&mut self) -> CoreStep {
        self.shutting_down = true;
        match self.state {
            RebuildState::Idle => {
                info!("shutdown requested; no build running");
                CoreStep::stop_with(Vec::new())
            }
            RebuildState::Running { build_id, pending } => {
                if pending {
                    self.report.dropped_requests += 1;
                }
                self.state = RebuildState::Running {
                    build_id,
                    pending: false,
                };
                info!(build_id, "shutdown requested; waiting for in-flight build");
                CoreStep::continue_with(Vec::new())
            }
        }
    }

    fn start_build(&mut self) -> CoreCommand {
        self.next_build_id += 1;
        let build_id = self.next_build_id;
        self.state = RebuildState::Running {
            build_id,
            pending: false,
        };
        self.report.builds_started += 1;
        CoreCommand::StartBuild(build_id)
    }
}
