// src/watch/path_utils.rs

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Tries a plain `strip_prefix` first and falls back to canonicalizing both
/// sides (symlinked temp dirs on macOS report `/private/var/...`). Returns
/// `None` if `path` is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        assert_eq!(
            relative_str(Path::new("/p"), Path::new("/p/src/index.css")).as_deref(),
            Some("src/index.css")
        );
        assert_eq!(relative_str(Path::new("/p"), Path::new("/q/index.css")), None);
    }
}
