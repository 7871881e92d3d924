// src/config/validate.rs

use std::path::Path;

use crate::config::model::{PipelineConfig, RawConfigFile};
use crate::errors::{CssPipeError, Result};
use crate::pipeline::prefix::resolve_targets;
use crate::watch::patterns::WatchProfile;

impl TryFrom<RawConfigFile> for PipelineConfig {
    type Error = CssPipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let config = PipelineConfig::new_unchecked(raw.build, raw.watch);
        validate_config(&config)?;
        Ok(config)
    }
}

/// Check the invariants every other module relies on.
pub fn validate_config(cfg: &PipelineConfig) -> Result<()> {
    validate_source(cfg)?;
    validate_outputs(cfg)?;
    validate_browsers(cfg)?;
    validate_watch_set(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> CssPipeError {
    CssPipeError::ConfigError(msg.into())
}

fn validate_source(cfg: &PipelineConfig) -> Result<()> {
    let source = &cfg.build_section().source;
    if source.as_os_str().is_empty() || source.file_name().is_none() {
        return Err(config_error(format!(
            "[build].source must name a file (got {:?})",
            source
        )));
    }
    Ok(())
}

fn validate_outputs(cfg: &PipelineConfig) -> Result<()> {
    let output = cfg.output_name();
    if output.is_empty() || output.contains(['/', '\\']) {
        return Err(config_error(format!(
            "[build].output must be a plain file name (got {output:?})"
        )));
    }

    if let Some(minified) = cfg.minified_output_name() {
        if minified.is_empty() || minified.contains(['/', '\\']) {
            return Err(config_error(format!(
                "[build].minified_output must be a plain file name (got {minified:?})"
            )));
        }
        if minified == output {
            return Err(config_error(format!(
                "[build].output and [build].minified_output are both {output:?}"
            )));
        }
    }

    let source = crate::fs::normalize_path(&cfg.build_section().source);
    let mut outputs = vec![cfg.relative_output()];
    outputs.extend(cfg.relative_minified_output());
    if outputs.iter().any(|o| *o == source) {
        return Err(config_error(format!(
            "build output would overwrite the source file {:?}",
            source
        )));
    }

    Ok(())
}

fn validate_browsers(cfg: &PipelineConfig) -> Result<()> {
    let browsers = cfg.browsers();
    if browsers.is_empty() || browsers.iter().any(|q| q.trim().is_empty()) {
        return Err(config_error(
            "[build].browsers must contain at least one non-empty query",
        ));
    }
    resolve_targets(browsers)?;
    Ok(())
}

fn validate_watch_set(cfg: &PipelineConfig) -> Result<()> {
    let section = cfg.watch_section();
    if section.watch.is_empty() {
        return Err(config_error("[watch].watch must contain at least one glob"));
    }

    let profile = WatchProfile::from_config(cfg).map_err(|e| config_error(format!("{e:#}")))?;

    // A watched output would rebuild itself forever.
    let mut outputs = vec![cfg.relative_output()];
    outputs.extend(cfg.relative_minified_output());
    for output in outputs {
        if profile.matches(&path_str(&output)) {
            return Err(config_error(format!(
                "output {:?} matches the watch set {:?}",
                output,
                profile.patterns()
            )));
        }
    }

    Ok(())
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
