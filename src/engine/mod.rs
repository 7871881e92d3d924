// src/engine/mod.rs

//! Rebuild orchestration for watch mode.
//!
//! The pure core state machine lives in [`core`] and decides *when* a build
//! runs; the async shell in [`runtime`] reads events from a channel and hands
//! builds to a [`crate::exec::BuildBackend`].
//!
//! At most one build is in flight. Requests that arrive while building are
//! handled by the [`TriggerQueue`] according to
//! [`TriggerWhileRunningBehaviour`].

use crate::pipeline::BuildReport;

/// Why a build was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The initial build when watch mode starts.
    Startup,
    /// A watched file changed.
    FileWatch,
}

/// Result of one build, as seen by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Success(BuildReport),
    /// Rendered error message.
    Failed(String),
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit once a build completes and nothing is queued. Used by tests and
    /// one-shot drivers.
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher, the backend and the
/// signal handler.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    BuildRequested { reason: TriggerReason },
    BuildCompleted { outcome: BuildOutcome },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use crate::types::TriggerWhileRunningBehaviour;
pub use self::core::{BuildState, CoreRuntime};
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
