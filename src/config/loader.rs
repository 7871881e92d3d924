// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{PipelineConfig, RawConfigFile};
use crate::errors::{CssPipeError, Result};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "csspipe.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file, validate it, and resolve its paths relative to
/// the directory containing it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let config = PipelineConfig::try_from(raw_config)?;
    Ok(config.with_root(config_root_dir(path)))
}

/// Resolve the configuration for a CLI invocation.
///
/// - An explicit path must exist.
/// - Without one, `csspipe.toml` in the working directory is used if present,
///   and the built-in defaults (rooted at the working directory) otherwise.
pub fn load_or_default(explicit: Option<&Path>) -> Result<PipelineConfig> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(CssPipeError::ConfigError(format!(
                "config file {:?} does not exist",
                path
            )));
        }
        return load_and_validate(path);
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        return load_and_validate(&default_path);
    }

    info!("no {DEFAULT_CONFIG_FILE} found; using built-in defaults");
    let config = PipelineConfig::try_from(RawConfigFile::default())?;
    Ok(config.with_root(config_root_dir(&default_path)))
}

/// Figure out the project root for a config path.
///
/// - If the config path has a non-empty parent (e.g. "site/csspipe.toml"),
///   we use that directory.
/// - If it's just a bare filename like "csspipe.toml" (parent = ""),
///   we fall back to the current working directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
