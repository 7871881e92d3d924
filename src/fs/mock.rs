// src/fs/mock.rs

use super::{FileSystem, normalize_path};
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

/// In-memory filesystem keyed by normalised relative paths.
///
/// Every path handed in is passed through [`normalize_path`], so
/// `./src/a.css` and `src/a.css` name the same entry.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    writes: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = normalize_path(path.as_ref());
        let mut files = self.files.lock().unwrap();
        files.insert(path.clone(), MockEntry::File(content.into()));
        Self::link_into_parent(&mut files, &path);
    }

    /// Contents of a file as UTF-8, if it exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let files = self.files.lock().unwrap();
        match files.get(&normalize_path(path.as_ref())) {
            Some(MockEntry::File(bytes)) => String::from_utf8(bytes.clone()).ok(),
            _ => None,
        }
    }

    /// Paths passed to [`FileSystem::write`], in call order.
    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes.lock().unwrap().clone()
    }

    fn parent_of(path: &Path) -> Option<PathBuf> {
        let parent = path.parent()?;
        if parent.as_os_str().is_empty() {
            Some(PathBuf::from("."))
        } else {
            Some(parent.to_path_buf())
        }
    }

    fn link_into_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = Self::parent_of(path) else {
            return;
        };
        if parent == path {
            return;
        }
        if !files.contains_key(&parent) {
            files.insert(parent.clone(), MockEntry::Dir(Vec::new()));
            Self::link_into_parent(files, &parent);
        }
        if let Some(MockEntry::Dir(children)) = files.get_mut(&parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let files = self.files.lock().unwrap();
        match files.get(&normalize_path(path)) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let files = self.files.lock().unwrap();
        match files.get(&normalize_path(path)) {
            Some(MockEntry::File(content)) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.writes.lock().unwrap().push(normalize_path(path));
        self.add_file(path, contents);
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(&normalize_path(path)), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(&normalize_path(path)), Some(MockEntry::Dir(_)))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        Ok(normalize_path(path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap();
        let key = normalize_path(path);
        match files.get(&key) {
            Some(MockEntry::Dir(children)) => {
                let mut entries: Vec<PathBuf> = children.iter().map(|name| path.join(name)).collect();
                entries.sort();
                Ok(entries)
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
