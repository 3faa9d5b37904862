// src/watch/mod.rs

//! Path discovery and change detection.
//!
//! This module is responsible for:
//! - Resolving finder output into a set of directories to watch
//!   ([`resolver`]).
//! - Deciding which filesystem events matter ([`filter`]).
//! - Wiring up a cross-platform filesystem watcher (`notify`) behind the
//!   [`WatchService`] trait ([`service`]).
//!
//! It does **not** know how builds run; it only produces the watch set and
//! a stream of `ChangeEvent`s.

pub mod filter;
pub mod resolver;
pub mod service;

pub use filter::{has_watched_extension, ChangeFilter};
pub use resolver::{PathResolver, WatchSet};
pub use service::{change_events_from, schedule_all, NotifyWatchService, WatchService};
