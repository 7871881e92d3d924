// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CssPipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Source file not found: {0:?}")]
    SourceNotFound(PathBuf),

    #[error("Parse error in {file:?}: {message}")]
    Parse { file: PathBuf, message: String },

    #[error("Cannot resolve @import \"{import}\" from {from:?}")]
    ImportNotFound { from: PathBuf, import: String },

    #[error("Circular @import: {0}")]
    CircularImport(String),

    #[error("Custom property {0} is not defined and has no fallback")]
    UnresolvedCustomProperty(String),

    #[error("Custom property {0} refers to itself")]
    CircularCustomProperty(String),

    #[error("Custom media {0} is not defined")]
    UnknownCustomMedia(String),

    #[error("Custom media {0} refers to itself")]
    CircularCustomMedia(String),

    #[error("Invalid browser targets: {0}")]
    Browserslist(String),

    #[error("Failed to write {path:?}: {message}")]
    Write { path: PathBuf, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CssPipeError>;
