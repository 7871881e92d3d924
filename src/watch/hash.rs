// src/watch/hash.rs

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::fs::FileSystem;

/// blake3 hash of a file's contents, hex encoded.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Last seen content hash per file, used by `use_hash` to ignore events that
/// did not change anything (editors touching files, `git checkout` of the
/// same content).
#[derive(Debug, Default)]
pub struct HashCache {
    hashes: HashMap<PathBuf, String>,
}

impl HashCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current hash of each readable file.
    pub fn seed<I>(&mut self, fs: &dyn FileSystem, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for path in paths {
            if let Ok(hash) = compute_file_hash(fs, &path) {
                self.hashes.insert(path, hash);
            }
        }
        debug!(files = self.hashes.len(), "seeded content hashes");
    }

    /// Update the stored hash for `path` and report whether it changed.
    ///
    /// A file that can no longer be read (removed, renamed) counts as changed
    /// if it was known before.
    pub fn refresh(&mut self, fs: &dyn FileSystem, path: &Path) -> bool {
        match compute_file_hash(fs, path) {
            Ok(hash) => match self.hashes.insert(path.to_path_buf(), hash.clone()) {
                Some(old) => old != hash,
                None => true,
            },
            Err(_) => self.hashes.remove(path).is_some(),
        }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn refresh_reports_only_real_changes() {
        let fs = MockFileSystem::new();
        fs.add_file("a.css", "a{}");
        let path = Path::new("a.css");

        let mut cache = HashCache::new();
        cache.seed(&fs, vec![path.to_path_buf()]);
        assert_eq!(cache.len(), 1);

        assert!(!cache.refresh(&fs, path));
        fs.add_file("a.css", "a{color:red}");
        assert!(cache.refresh(&fs, path));
        assert!(!cache.refresh(&fs, path));
    }

    #[test]
    fn unknown_unreadable_files_are_not_changes() {
        let fs = MockFileSystem::new();
        let mut cache = HashCache::new();
        assert!(!cache.refresh(&fs, Path::new("gone.css")));
        assert!(cache.is_empty());
    }

    #[test]
    fn hash_matches_blake3_of_contents() {
        let fs = MockFileSystem::new();
        fs.add_file("a.css", "body{}");
        let hash = compute_file_hash(&fs, Path::new("a.css")).unwrap();
        assert_eq!(hash, blake3::hash(b"body{}").to_hex().to_string());
    }
}
