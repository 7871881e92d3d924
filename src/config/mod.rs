// src/config/mod.rs

//! Configuration loading and validation for csspipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate paths, browser targets and the watch set (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{config_root_dir, load_and_validate, load_from_path, load_or_default};
pub use model::{BuildSection, PipelineConfig, RawConfigFile, WatchSection};
