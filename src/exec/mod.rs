// src/exec/mod.rs

//! Build execution for watch mode.
//!
//! - [`backend`] provides the `BuildBackend` trait the runtime talks to and
//!   the production `PipelineBackend`, which runs the pipeline on a blocking
//!   worker and reports back with `RuntimeEvent::BuildCompleted`. Tests swap
//!   in a fake backend.

pub mod backend;

pub use backend::{BuildBackend, PipelineBackend};
