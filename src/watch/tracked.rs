// src/watch/tracked.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Files read by the last successful build, shared between the runtime
/// (writer) and the watcher (reader).
///
/// Paths are stored canonicalized when possible so they compare equal to the
/// absolute paths `notify` reports.
#[derive(Debug, Clone, Default)]
pub struct TrackedFiles {
    inner: Arc<RwLock<BTreeSet<PathBuf>>>,
}

impl TrackedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace<I>(&self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let set: BTreeSet<PathBuf> = paths
            .into_iter()
            .map(|p| p.canonicalize().unwrap_or(p))
            .collect();
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = set;
    }

    pub fn contains(&self, path: &Path) -> bool {
        let set = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        set.contains(path)
            || path
                .canonicalize()
                .map(|canon| set.contains(&canon))
                .unwrap_or(false)
    }

    pub fn snapshot(&self) -> Vec<PathBuf> {
        let set = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        set.iter().cloned().collect()
    }
}
