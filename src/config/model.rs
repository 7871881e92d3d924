// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fs::normalize_path;
use crate::types::TriggerWhileRunningBehaviour;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [build]
/// source = "src/index.css"
/// out_dir = "."
/// browsers = ["last 3 versions"]
///
/// [watch]
/// watch = ["src/*.css"]
/// triggered_while_running_behaviour = "queue"
/// ```
///
/// Every key is optional; an empty file (or no file at all) describes the
/// default project layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// `[build]` section: what to read, how to transform it, where to write it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Entry stylesheet, relative to the project root.
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Directory receiving both outputs, relative to the project root.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// File name of the unminified output. Defaults to the source file name.
    #[serde(default)]
    pub output: Option<String>,

    /// File name of the minified output. Defaults to `<stem>.min.<ext>`.
    #[serde(default)]
    pub minified_output: Option<String>,

    /// Whether to write the minified output at all.
    #[serde(default = "default_true")]
    pub minify: bool,

    /// Browserslist queries used for vendor prefixing.
    #[serde(default = "default_browsers")]
    pub browsers: Vec<String>,

    /// Extra directories searched for `@import` targets after the importing
    /// file's own directory.
    #[serde(default)]
    pub import_paths: Vec<PathBuf>,

    /// Keep `var()` declarations after their static fallback.
    #[serde(default = "default_true")]
    pub preserve_custom_properties: bool,
}

fn default_source() -> PathBuf {
    PathBuf::from("src/index.css")
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_browsers() -> Vec<String> {
    vec!["last 3 versions".to_string()]
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            source: default_source(),
            out_dir: default_out_dir(),
            output: None,
            minified_output: None,
            minify: true,
            browsers: default_browsers(),
            import_paths: Vec::new(),
            preserve_custom_properties: true,
        }
    }
}

/// `[watch]` section: which file changes trigger a rebuild.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Glob patterns relative to the project root. `*` does not cross `/`,
    /// so the default only covers top-level files in `src/`.
    #[serde(default = "default_watch")]
    pub watch: Vec<String>,

    /// Globs removed from the watch set.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Also rebuild when any file read by the last successful build changes
    /// (nested `@import` targets outside the watch globs).
    #[serde(default)]
    pub track_imports: bool,

    /// Only rebuild when the changed file's content hash actually differs.
    #[serde(default)]
    pub use_hash: bool,

    /// Quiet period used to fold bursts of filesystem events together.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// `"queue"` (default) or `"drop"`.
    #[serde(default)]
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,
}

fn default_watch() -> Vec<String> {
    vec!["src/*.css".to_string()]
}

fn default_debounce_ms() -> u64 {
    50
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            watch: default_watch(),
            exclude: Vec::new(),
            track_imports: false,
            use_hash: false,
            debounce_ms: default_debounce_ms(),
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::default(),
        }
    }
}

/// Validated configuration.
///
/// Constructed from a [`RawConfigFile`] via `TryFrom` (see `validate.rs`).
/// All relative paths are resolved against [`PipelineConfig::root`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    build: BuildSection,
    watch: WatchSection,
    root: PathBuf,
}

impl PipelineConfig {
    /// Internal constructor used by validation; does not re-check invariants.
    pub(crate) fn new_unchecked(build: BuildSection, watch: WatchSection) -> Self {
        Self {
            build,
            watch,
            root: PathBuf::from("."),
        }
    }

    /// Resolve relative paths against `root` instead of the working directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build_section(&self) -> &BuildSection {
        &self.build
    }

    pub fn watch_section(&self) -> &WatchSection {
        &self.watch
    }

    pub fn source_path(&self) -> PathBuf {
        normalize_path(&self.root.join(&self.build.source))
    }

    /// Output path relative to the project root (used for glob checks).
    pub fn relative_output(&self) -> PathBuf {
        normalize_path(&self.build.out_dir.join(self.output_name()))
    }

    /// Minified output path relative to the project root.
    pub fn relative_minified_output(&self) -> Option<PathBuf> {
        self.minified_output_name()
            .map(|name| normalize_path(&self.build.out_dir.join(name)))
    }

    pub fn output_path(&self) -> PathBuf {
        normalize_path(&self.root.join(self.relative_output()))
    }

    pub fn minified_output_path(&self) -> Option<PathBuf> {
        self.relative_minified_output()
            .map(|rel| normalize_path(&self.root.join(rel)))
    }

    pub fn import_paths(&self) -> Vec<PathBuf> {
        self.build
            .import_paths
            .iter()
            .map(|p| normalize_path(&self.root.join(p)))
            .collect()
    }

    pub fn browsers(&self) -> &[String] {
        &self.build.browsers
    }

    pub(crate) fn output_name(&self) -> String {
        self.build.output.clone().unwrap_or_else(|| {
            self.build
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    pub(crate) fn minified_output_name(&self) -> Option<String> {
        if !self.build.minify {
            return None;
        }
        if let Some(name) = &self.build.minified_output {
            return Some(name.clone());
        }
        let source = Path::new(&self.build.source);
        let stem = source.file_stem()?.to_string_lossy();
        let ext = source
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "css".to_string());
        Some(format!("{stem}.min.{ext}"))
    }
}
