// src/watch/service.rs

use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{Result, StylewatchError};
use crate::types::{ChangeEvent, ChangeKind};

/// Something that can watch directories recursively and report changes.
///
/// Events are delivered through whatever channel the implementation was
/// built with; `schedule` only registers interest.
pub trait WatchService: Send {
    /// Start watching `path` recursively.
    fn schedule(&mut self, path: &Path) -> Result<()>;

    /// Drop every registration made so far.
    fn unschedule_all(&mut self);
}

/// `notify`-backed watch service.
///
/// Dropping it stops all watching.
pub struct NotifyWatchService {
    watcher: RecommendedWatcher,
    scheduled: Vec<PathBuf>,
}

impl std::fmt::Debug for NotifyWatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyWatchService")
            .field("scheduled", &self.scheduled)
            .finish_non_exhaustive()
    }
}

impl NotifyWatchService {
    /// Create the platform watcher. Every change it sees is converted into
    /// `ChangeEvent`s and pushed onto `events_tx`, unfiltered.
    pub fn new(events_tx: mpsc::UnboundedSender<ChangeEvent>) -> Result<Self> {
        // Closure called synchronously on notify's own thread.
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for change in change_events_from(&event) {
                        if events_tx.send(change).is_err() {
                            // Receiver gone: the coordinator is shutting down.
                            return;
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, "file watch error");
                }
            },
            Config::default(),
        )
        .map_err(|e| StylewatchError::Other(e.into()))?;

        Ok(Self {
            watcher,
            scheduled: Vec::new(),
        })
    }
}

impl WatchService for NotifyWatchService {
    fn schedule(&mut self, path: &Path) -> Result<()> {
        self.watcher
            .watch(path, RecursiveMode::Recursive)
            .map_err(|e| StylewatchError::WatchRegistration {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        self.scheduled.push(path.to_path_buf());
        Ok(())
    }

    fn unschedule_all(&mut self) {
        for path in self.scheduled.drain(..) {
            if let Err(err) = self.watcher.unwatch(&path) {
                debug!(path = ?path, error = %err, "unwatch failed");
            }
        }
    }
}

/// Register every path with `service`, skipping (and logging) the ones the
/// platform refuses. Returns the paths that were registered.
pub fn schedule_all<'a, S, I>(service: &mut S, paths: I) -> Vec<PathBuf>
where
    S: WatchService + ?Sized,
    I: IntoIterator<Item = &'a PathBuf>,
{
    let mut registered = Vec::new();
    for path in paths {
        match service.schedule(path) {
            Ok(()) => {
                debug!(path = ?path, "watching");
                registered.push(path.clone());
            }
            Err(err) => {
                warn!(path = ?path, error = %err, "cannot watch directory; skipping");
            }
        }
    }
    info!(watched = registered.len(), "file watches registered");
    registered
}

/// Map a raw notify event to one `ChangeEvent` per affected path.
///
/// Access notifications and events of unknown kind produce nothing.
pub fn change_events_from(event: &Event) -> Vec<ChangeEvent> {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Remove(_) => ChangeKind::Deleted,
        EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Moved,
        EventKind::Modify(_) => ChangeKind::Modified,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => return Vec::new(),
    };

    event
        .paths
        .iter()
        .map(|path| ChangeEvent::new(path.clone(), kind))
        .collect()
}
