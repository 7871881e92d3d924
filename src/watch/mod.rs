// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module turns filesystem changes under the project root into
//! `RuntimeEvent::BuildRequested`. It knows nothing about the pipeline beyond
//! the set of files the last build read ([`TrackedFiles`]).

pub mod event_handler;
pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod tracked;
pub mod watcher;

pub use hash::{HashCache, compute_file_hash};
pub use patterns::{WatchProfile, collect_matching_files};
pub use tracked::TrackedFiles;
pub use watcher::{WatchSettings, WatcherHandle, spawn_watcher};
