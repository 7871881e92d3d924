// src/pipeline/mod.rs

//! The CSS build pipeline.
//!
//! A [`Pipeline`] reads one entry stylesheet, runs it through a fixed,
//! ordered list of [`Step`]s and writes two artifacts: the processed
//! stylesheet and its minified copy.
//!
//! Step order matters:
//! 1. [`import`] inlines `@import`s so later steps see the whole stylesheet.
//! 2. [`font_variant`] adds `font-feature-settings` fallbacks, before
//!    prefixing so the generated declarations get prefixed too.
//! 3. [`prefix`] adds vendor prefixes for the configured browsers.
//! 4. [`custom_properties`] adds static fallbacks for `var()` references.
//! 5. [`custom_media`] expands `@custom-media` aliases.
//!
//! Every step runs before anything is written, so a failing build leaves the
//! previous outputs untouched.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, debug_span, info};

use crate::config::PipelineConfig;
use crate::css::{self, Stylesheet};
use crate::errors::{CssPipeError, Result};
use crate::fs::FileSystem;

pub mod custom_media;
pub mod custom_properties;
pub mod font_variant;
pub mod import;
pub mod minify;
pub mod prefix;

pub use custom_media::CustomMediaStep;
pub use custom_properties::CustomPropertiesStep;
pub use font_variant::FontVariantStep;
pub use import::ImportStep;
pub use prefix::PrefixStep;

/// One transformation in the pipeline.
pub trait Step: Send + Sync {
    /// Short name used in logs and `--dry-run` output.
    fn name(&self) -> &'static str;

    fn apply(&self, sheet: Stylesheet, ctx: &mut BuildContext<'_>) -> Result<Stylesheet>;
}

/// Per-build state shared by the steps.
pub struct BuildContext<'a> {
    pub fs: &'a dyn FileSystem,
    /// The entry stylesheet.
    pub entry: PathBuf,
    dependencies: BTreeSet<PathBuf>,
}

impl<'a> BuildContext<'a> {
    pub fn new(fs: &'a dyn FileSystem, entry: PathBuf) -> Self {
        let mut dependencies = BTreeSet::new();
        dependencies.insert(entry.clone());
        Self {
            fs,
            entry,
            dependencies,
        }
    }

    /// Remember that the build read `path`.
    pub fn record_dependency(&mut self, path: impl Into<PathBuf>) {
        self.dependencies.insert(path.into());
    }

    pub fn dependencies(&self) -> &BTreeSet<PathBuf> {
        &self.dependencies
    }
}

/// Summary of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub minified_output: Option<PathBuf>,
    /// Every file the build read: the entry plus all inlined imports.
    pub dependencies: Vec<PathBuf>,
    /// blake3 hash of the unminified output.
    pub hash: String,
    pub elapsed: Duration,
}

pub struct Pipeline {
    source: PathBuf,
    output: PathBuf,
    minified_output: Option<PathBuf>,
    steps: Vec<Box<dyn Step>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source)
            .field("output", &self.output)
            .field("minified_output", &self.minified_output)
            .field("steps", &self.step_names())
            .finish()
    }
}

impl Pipeline {
    /// Build the standard five-step pipeline from a validated config.
    pub fn from_config(cfg: &PipelineConfig) -> Result<Self> {
        let targets = prefix::resolve_targets(cfg.browsers())?;
        let steps: Vec<Box<dyn Step>> = vec![
            Box::new(ImportStep::new(cfg.import_paths())),
            Box::new(FontVariantStep),
            Box::new(PrefixStep::new(targets)),
            Box::new(CustomPropertiesStep::new(
                cfg.build_section().preserve_custom_properties,
            )),
            Box::new(CustomMediaStep),
        ];

        Ok(Self {
            source: cfg.source_path(),
            output: cfg.output_path(),
            minified_output: cfg.minified_output_path(),
            steps,
        })
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step and return the result plus the set of files read.
    pub fn transform(&self, fs: &dyn FileSystem) -> Result<(Stylesheet, BTreeSet<PathBuf>)> {
        if !fs.is_file(&self.source) {
            return Err(CssPipeError::SourceNotFound(self.source.clone()));
        }
        let text = fs.read_to_string(&self.source)?;
        let mut sheet = css::parse(&text).map_err(|e| CssPipeError::Parse {
            file: self.source.clone(),
            message: e.to_string(),
        })?;

        let mut ctx = BuildContext::new(fs, self.source.clone());
        for step in &self.steps {
            let _span = debug_span!("step", name = step.name()).entered();
            sheet = step.apply(sheet, &mut ctx)?;
            debug!(nodes = sheet.nodes.len(), "step finished");
        }

        Ok((sheet, ctx.dependencies))
    }

    /// Transform the source and write both outputs.
    pub fn build(&self, fs: &dyn FileSystem) -> Result<BuildReport> {
        let started = Instant::now();
        info!(source = ?self.source, "build started");

        let (sheet, dependencies) = self.transform(fs)?;
        let css = sheet.to_string();
        let minified = match &self.minified_output {
            Some(path) => Some((path, minify::minify(&css, &self.source)?)),
            None => None,
        };

        write_output(fs, &self.output, &css)?;
        if let Some((path, code)) = &minified {
            write_output(fs, path, code)?;
        }

        let report = BuildReport {
            source: self.source.clone(),
            output: self.output.clone(),
            minified_output: self.minified_output.clone(),
            dependencies: dependencies.into_iter().collect(),
            hash: blake3::hash(css.as_bytes()).to_hex().to_string(),
            elapsed: started.elapsed(),
        };
        info!(
            output = ?report.output,
            minified = ?report.minified_output,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "build finished"
        );
        Ok(report)
    }
}

fn write_output(fs: &dyn FileSystem, path: &Path, contents: &str) -> Result<()> {
    fs.write(path, contents.as_bytes())
        .map_err(|e| CssPipeError::Write {
            path: path.to_path_buf(),
            message: format!("{e:#}"),
        })
}
