// src/exec/mod.rs

//! Build execution layer.
//!
//! - [`pipeline`] defines the `Compiler` / `Publisher` collaborators and the
//!   compile-then-publish `BuildPipeline`.
//! - [`command`] implements both collaborators as shell commands run with
//!   `tokio::process::Command`.
//! - [`backend`] owns the `BuildExecutor`, which runs the pipeline on its
//!   own Tokio task and reports back to the runtime.

pub mod backend;
pub mod command;
pub mod pipeline;

pub use backend::BuildExecutor;
pub use command::{run_shell, ShellCompiler, ShellOutput, ShellPublisher};
pub use pipeline::{BoxFuture, BuildOutcome, BuildPipeline, BuildStage, Compiler, Publisher};
