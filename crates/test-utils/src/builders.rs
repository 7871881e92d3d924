#![allow(dead_code)]

use std::path::{Path, PathBuf};

use csspipe::config::{BuildSection, PipelineConfig, RawConfigFile, WatchSection};
use csspipe::errors::Result;
use csspipe::types::TriggerWhileRunningBehaviour;

/// Builder for `PipelineConfig` to simplify test setup.
///
/// Starts from the built-in defaults and the given project root.
pub struct PipelineConfigBuilder {
    config: RawConfigFile,
    root: PathBuf,
}

impl PipelineConfigBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            config: RawConfigFile {
                build: BuildSection::default(),
                watch: WatchSection::default(),
            },
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn source(mut self, source: &str) -> Self {
        self.config.build.source = PathBuf::from(source);
        self
    }

    pub fn out_dir(mut self, dir: &str) -> Self {
        self.config.build.out_dir = PathBuf::from(dir);
        self
    }

    pub fn output(mut self, name: &str) -> Self {
        self.config.build.output = Some(name.to_string());
        self
    }

    pub fn minified_output(mut self, name: &str) -> Self {
        self.config.build.minified_output = Some(name.to_string());
        self
    }

    pub fn minify(mut self, minify: bool) -> Self {
        self.config.build.minify = minify;
        self
    }

    pub fn browsers(mut self, queries: &[&str]) -> Self {
        self.config.build.browsers = queries.iter().map(|q| q.to_string()).collect();
        self
    }

    pub fn import_path(mut self, dir: &str) -> Self {
        self.config.build.import_paths.push(PathBuf::from(dir));
        self
    }

    pub fn preserve_custom_properties(mut self, preserve: bool) -> Self {
        self.config.build.preserve_custom_properties = preserve;
        self
    }

    /// Replace the watch globs.
    pub fn watch(mut self, patterns: &[&str]) -> Self {
        self.config.watch.watch = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn track_imports(mut self, val: bool) -> Self {
        self.config.watch.track_imports = val;
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.config.watch.use_hash = val;
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.watch.debounce_ms = ms;
        self
    }

    pub fn behaviour(mut self, behaviour: TriggerWhileRunningBehaviour) -> Self {
        self.config.watch.triggered_while_running_behaviour = behaviour;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<PipelineConfig> {
        let root = self.root;
        PipelineConfig::try_from(self.config).map(|cfg| cfg.with_root(root))
    }

    pub fn build(self) -> PipelineConfig {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}
