use std::path::PathBuf;

use serde::Deserialize;

/// Behaviour when a rebuild is requested while one is already in flight.
///
/// - `Queue`: remember that something changed and run exactly one more
///   build once the current one finishes, however many requests arrived
///   (default behaviour).
/// - `Drop`: ignore the request. Later changes still schedule builds because
///   the watch stays live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Drop,
}

/// Kind of filesystem change delivered by the watch service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
    Moved,
}

/// A single filesystem change for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}
