// src/tasks/mod.rs

//! The task graph: `build`, `watch` (after `build`) and the `default` alias.

pub mod graph;

pub use graph::{TaskGraph, TaskKind};
