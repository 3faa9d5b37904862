// src/exec/pipeline.rs

//! The build pipeline: compile, then publish.
//!
//! Both steps are external collaborators behind traits so the runtime never
//! cares whether they are shell commands or in-process fakes.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{Result, StylewatchError};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Compiles stylesheet sources.
///
/// Return `StylewatchError::CompileError` for problems in the user's
/// sources; the watch loop logs it and waits for the next change. Any other
/// error stops the process.
pub trait Compiler: Send + Sync {
    fn compile(&self) -> BoxFuture<'_, Result<()>>;
}

/// Collects compiled assets into their published location.
///
/// Every error is fatal.
pub trait Publisher: Send + Sync {
    fn publish(&self) -> BoxFuture<'_, Result<()>>;
}

/// Which step of the pipeline an unrecoverable failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Compile,
    Publish,
}

/// Result of one pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Compile succeeded; `published` is false when no publisher is set.
    Succeeded { published: bool },
    /// The sources did not compile. Publish was skipped.
    CompileFailed(String),
    /// Something other than a compile error went wrong.
    Aborted { stage: BuildStage, message: String },
}

impl BuildOutcome {
    pub fn is_fatal(&self) -> bool {
        matches!(self, BuildOutcome::Aborted { .. })
    }
}

/// Compile step plus optional publish step.
#[derive(Clone)]
pub struct BuildPipeline {
    compiler: Arc<dyn Compiler>,
    publisher: Option<Arc<dyn Publisher>>,
}

impl fmt::Debug for BuildPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildPipeline")
            .field("has_publisher", &self.publisher.is_some())
            .finish_non_exhaustive()
    }
}

impl BuildPipeline {
    pub fn new(compiler: Arc<dyn Compiler>) -> Self {
        Self {
            compiler,
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Run compile, and publish only if compile succeeded.
    pub async fn run(&self) -> BuildOutcome {
        debug!("compile step starting");
        match self.compiler.compile().await {
            Ok(()) => {}
            Err(StylewatchError::CompileError(message)) => {
                return BuildOutcome::CompileFailed(message);
            }
            Err(err) => {
                return BuildOutcome::Aborted {
                    stage: BuildStage::Compile,
                    message: err.to_string(),
                };
            }
        }

        let Some(publisher) = &self.publisher else {
            info!("stylesheets compiled");
            return BuildOutcome::Succeeded { published: false };
        };

        debug!("publish step starting");
        match publisher.publish().await {
            Ok(()) => {
                info!("stylesheets compiled and published");
                BuildOutcome::Succeeded { published: true }
            }
            Err(StylewatchError::PublishError(message)) => BuildOutcome::Aborted {
                stage: BuildStage::Publish,
                message,
            },
            Err(err) => BuildOutcome::Aborted {
                stage: BuildStage::Publish,
                message: err.to_string(),
            },
        }
    }
}
