// src/watch/event_handler.rs

//! Deciding whether a batch of changed paths warrants a rebuild.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::EventKind;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::fs::FileSystem;
use crate::watch::hash::HashCache;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{WatchProfile, collect_matching_files};
use crate::watch::tracked::TrackedFiles;

/// Only events that can change file contents are interesting.
pub fn is_content_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Watched-set membership plus the optional content hash filter.
#[derive(Debug)]
pub struct ChangeFilter {
    root: PathBuf,
    profile: WatchProfile,
    tracked: Option<TrackedFiles>,
    use_hash: bool,
    fs: Arc<dyn FileSystem>,
    hashes: HashCache,
}

impl ChangeFilter {
    pub fn new(root: PathBuf, profile: WatchProfile, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root,
            profile,
            tracked: None,
            use_hash: false,
            fs,
            hashes: HashCache::new(),
        }
    }

    /// Treat the files of the last successful build as watched too.
    pub fn with_tracked(mut self, tracked: TrackedFiles) -> Self {
        self.tracked = Some(tracked);
        self
    }

    pub fn with_hash(mut self, use_hash: bool) -> Self {
        self.use_hash = use_hash;
        self
    }

    /// Hash the currently watched files so the first event can be compared
    /// against something.
    pub fn seed_hashes(&mut self) {
        if !self.use_hash {
            return;
        }
        let mut files = match collect_matching_files(self.fs.as_ref(), &self.root, &self.profile) {
            Ok(files) => files,
            Err(err) => {
                warn!(error = %err, "failed to collect watched files for hashing");
                Vec::new()
            }
        };
        if let Some(tracked) = &self.tracked {
            files.extend(tracked.snapshot());
        }
        self.hashes.seed(self.fs.as_ref(), files);
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        let by_glob = relative_str(&self.root, path).is_some_and(|rel| self.profile.matches(&rel));
        by_glob || self.tracked.as_ref().is_some_and(|t| t.contains(path))
    }

    /// True if a change to `path` should rebuild. Updates the stored hash.
    pub fn should_rebuild(&mut self, path: &Path) -> bool {
        if !self.is_watched(path) {
            return false;
        }
        if self.use_hash && !self.hashes.refresh(self.fs.as_ref(), path) {
            info!(?path, "content unchanged; skipping rebuild");
            return false;
        }
        true
    }
}

/// Filter a debounced batch of paths and send at most one build request.
///
/// Returns `false` once the runtime channel is closed.
pub async fn process_changes(
    filter: &mut ChangeFilter,
    paths: &[PathBuf],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    let changed: Vec<&PathBuf> = paths.iter().filter(|p| filter.should_rebuild(p)).collect();
    if changed.is_empty() {
        debug!(events = paths.len(), "no watched file changed");
        return true;
    }

    info!(?changed, "change detected; requesting rebuild");
    if let Err(err) = runtime_tx
        .send(RuntimeEvent::BuildRequested {
            reason: TriggerReason::FileWatch,
        })
        .await
    {
        warn!("failed to send RuntimeEvent::BuildRequested: {err}");
        return false;
    }
    true
}
