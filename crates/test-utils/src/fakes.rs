//! In-process stand-ins for the build pipeline, the watch service and
//! finders.

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Notify};
use tracing::debug;

use stylewatch::errors::{Result, StylewatchError};
use stylewatch::exec::{BoxFuture, Compiler, Publisher};
use stylewatch::finder::{Finder, IgnorePatterns, StaticFile};
use stylewatch::watch::WatchService;

/// What the next `compile()` call should do.
#[derive(Debug, Clone)]
pub enum CompileStep {
    Succeed,
    /// Recoverable: the sources did not compile.
    Fail(String),
    /// Fatal: the compiler could not run at all.
    Crash(String),
}

/// A compiler that:
/// - counts calls and announces each one on a channel as it starts
/// - optionally blocks until the test releases it (`gated`)
/// - plays back a script of results, succeeding once the script runs out.
#[derive(Debug)]
pub struct FakeCompiler {
    calls: AtomicUsize,
    script: Mutex<VecDeque<CompileStep>>,
    gate: Option<Notify>,
    started_tx: mpsc::UnboundedSender<usize>,
    started_rx: Mutex<Option<mpsc::UnboundedReceiver<usize>>>,
}

impl FakeCompiler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None, Vec::new()))
    }

    /// Each call waits for a `release()` before finishing.
    pub fn gated() -> Arc<Self> {
        Arc::new(Self::build(Some(Notify::new()), Vec::new()))
    }

    pub fn scripted(steps: Vec<CompileStep>) -> Arc<Self> {
        Arc::new(Self::build(None, steps))
    }

    fn build(gate: Option<Notify>, steps: Vec<CompileStep>) -> Self {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(steps.into()),
            gate,
            started_tx,
            started_rx: Mutex::new(Some(started_rx)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Let the current (or next) gated call finish.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Receiver yielding the 1-based index of each call as it starts.
    ///
    /// Can only be taken once.
    pub fn started(&self) -> mpsc::UnboundedReceiver<usize> {
        self.started_rx
            .lock()
            .unwrap()
            .take()
            .expect("started() receiver already taken")
    }
}

impl Compiler for FakeCompiler {
    fn compile(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.started_tx.send(call).is_err() {
                debug!(call, "nobody listening for compile starts");
            }

            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(CompileStep::Succeed);

            match step {
                CompileStep::Succeed => Ok(()),
                CompileStep::Fail(msg) => Err(StylewatchError::CompileError(msg)),
                CompileStep::Crash(msg) => Err(StylewatchError::Other(anyhow::anyhow!(msg))),
            }
        })
    }
}

/// A publisher that counts calls and optionally always fails.
#[derive(Debug, Default)]
pub struct FakePublisher {
    calls: AtomicUsize,
    failure: Option<String>,
}

impl FakePublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(msg: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failure: Some(msg.to_string()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Publisher for FakePublisher {
    fn publish(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.failure {
                Some(msg) => Err(StylewatchError::PublishError(msg.clone())),
                None => Ok(()),
            }
        })
    }
}

/// Shared view of what a `RecordingWatchService` did, usable after the
/// service itself was moved into the coordinator.
#[derive(Debug, Clone, Default)]
pub struct WatchLog {
    scheduled: Arc<Mutex<Vec<PathBuf>>>,
    released: Arc<AtomicBool>,
}

impl WatchLog {
    pub fn scheduled(&self) -> Vec<PathBuf> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// A watch service that records registrations instead of touching the OS.
#[derive(Debug, Default)]
pub struct RecordingWatchService {
    log: WatchLog,
    refused: BTreeSet<PathBuf>,
}

impl RecordingWatchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail registration for `path`, like a platform hitting a watch limit.
    pub fn refusing(mut self, path: impl Into<PathBuf>) -> Self {
        self.refused.insert(path.into());
        self
    }

    pub fn log(&self) -> WatchLog {
        self.log.clone()
    }
}

impl WatchService for RecordingWatchService {
    fn schedule(&mut self, path: &Path) -> Result<()> {
        if self.refused.contains(path) {
            return Err(StylewatchError::WatchRegistration {
                path: path.to_path_buf(),
                reason: "watch limit reached".to_string(),
            });
        }
        self.log.scheduled.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn unschedule_all(&mut self) {
        self.log.released.store(true, Ordering::SeqCst);
    }
}

/// A finder returning a fixed list of files, ignoring nothing.
#[derive(Debug, Clone)]
pub struct StaticFinder {
    name: String,
    files: Vec<StaticFile>,
}

impl StaticFinder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, relative_path: &str, location: impl Into<PathBuf>) -> Self {
        self.files.push(StaticFile::new(relative_path, location));
        self
    }
}

impl Finder for StaticFinder {
    fn name(&self) -> &str {
        &self.name
    }

    fn enumerate(&self, _ignore: &IgnorePatterns) -> anyhow::Result<Vec<StaticFile>> {
        Ok(self.files.clone())
    }
}
