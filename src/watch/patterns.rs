// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::PipelineConfig;
use crate::fs::FileSystem;

/// Compiled watch/exclude glob patterns.
///
/// Patterns are relative to the project root and are matched against relative
/// paths with forward slashes (e.g. `"src/index.css"`). `*` and `?` do not
/// match `/`; use `**` to descend into directories.
#[derive(Clone)]
pub struct WatchProfile {
    patterns: Vec<String>,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for WatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchProfile")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl WatchProfile {
    pub fn new(watch: &[String], exclude: &[String]) -> Result<Self> {
        let watch_set = build_globset(watch).context("building watch globset")?;

        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };

        Ok(Self {
            patterns: watch.to_vec(),
            watch_set,
            exclude_set,
        })
    }

    pub fn from_config(cfg: &PipelineConfig) -> Result<Self> {
        let section = cfg.watch_section();
        Self::new(&section.watch, &section.exclude)
    }

    /// The raw watch patterns, for diagnostics.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if the given path (relative to project root) is watched.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build a GlobSet where wildcards stop at path separators.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Collect all files under `root` matched by `profile`.
///
/// Hidden directories (`.git`, `.cache`, ...) are not descended into. Used to
/// seed content hashes when the watcher starts.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    profile: &WatchProfile,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
                if !hidden {
                    stack.push(path);
                }
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if profile.matches(&rel_str) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn profile(watch: &[&str], exclude: &[&str]) -> WatchProfile {
        let watch: Vec<String> = watch.iter().map(|s| s.to_string()).collect();
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        WatchProfile::new(&watch, &exclude).unwrap()
    }

    #[test]
    fn single_star_stays_in_its_directory() {
        let p = profile(&["src/*.css"], &[]);
        assert!(p.matches("src/index.css"));
        assert!(!p.matches("src/parts/button.css"));
        assert!(!p.matches("index.css"));
        assert!(!p.matches("src/index.scss"));
    }

    #[test]
    fn double_star_recurses_and_exclude_wins() {
        let p = profile(&["src/**/*.css"], &["src/vendor/**"]);
        assert!(p.matches("src/index.css"));
        assert!(p.matches("src/parts/button.css"));
        assert!(!p.matches("src/vendor/reset.css"));
    }

    #[test]
    fn invalid_globs_are_rejected() {
        let err = WatchProfile::new(&["src/[.css".to_string()], &[]).unwrap_err();
        assert!(format!("{err:#}").contains("invalid glob pattern"));
    }

    #[test]
    fn collects_matching_files_from_mock_tree() {
        let fs = MockFileSystem::new();
        fs.add_file("src/index.css", "a{}");
        fs.add_file("src/theme.css", "b{}");
        fs.add_file("src/parts/button.css", "c{}");
        fs.add_file("index.css", "out");

        let files = collect_matching_files(&fs, Path::new("."), &profile(&["src/*.css"], &[]))
            .unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["./src/index.css", "./src/theme.css"]);
    }
}
