// src/engine/mod.rs

//! Orchestration engine for stylewatch.
//!
//! This module ties together:
//! - the rebuild trigger (at most one build in flight, coalescing what
//!   arrives meanwhile)
//! - the runtime event loop that reacts to:
//!   - relevant file changes
//!   - build completions
//!   - shutdown signals
//! - the coordinator that resolves paths, registers watches and drives the
//!   runtime.
//!
//! The pure state machine lives in [`trigger`]; the async/IO shell is
//! implemented in [`runtime`].

use std::path::PathBuf;

use crate::exec::BuildOutcome;

/// Monotonic identifier of one pipeline execution.
pub type BuildId = u64;

/// Why a rebuild was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerReason {
    /// The unconditional build at startup.
    Initial,
    /// A relevant change to this path.
    FileChange(PathBuf),
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit once no build is running or pending (used for
    /// `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher, the executor and the
/// signal handler.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Something changed that needs a rebuild.
    RebuildRequested { reason: TriggerReason },
    /// A pipeline execution ended.
    BuildFinished {
        build_id: BuildId,
        outcome: BuildOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod coordinator;
pub mod runtime;
pub mod trigger;

pub use crate::types::TriggerWhileRunningBehaviour;
pub use coordinator::WatchCoordinator;
pub use runtime::Runtime;
pub use trigger::{CoreCommand, CoreStep, RebuildState, RebuildTrigger, RunReport};
