// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::engine::core::BuildState;
use crate::engine::queue::TriggerQueue;
use crate::engine::{BuildOutcome, RuntimeOptions, TriggerReason};

/// Command produced by the pure core, to be executed by the IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start a build on the backend.
    StartBuild { reason: TriggerReason },
    /// Replace the set of files the last successful build read.
    TrackDependencies(Vec<PathBuf>),
    /// Request that the runtime exits (used with `exit_when_idle`).
    RequestExit,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// A build was requested: start it when idle, otherwise let the queue decide.
pub fn handle_build_request(
    state: &mut BuildState,
    queue: &mut TriggerQueue,
    reason: TriggerReason,
) -> CoreStep {
    match state {
        BuildState::Idle => {
            *state = BuildState::Building;
            CoreStep::running(vec![CoreCommand::StartBuild { reason }])
        }
        BuildState::Building => {
            queue.record_trigger(reason);
            CoreStep::running(Vec::new())
        }
    }
}

/// A build finished: go idle, then start the queued rebuild if there is one.
pub fn handle_build_completion(
    state: &mut BuildState,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    outcome: BuildOutcome,
) -> CoreStep {
    if *state == BuildState::Idle {
        warn!("build completion received while idle; ignoring");
        return CoreStep::running(Vec::new());
    }
    *state = BuildState::Idle;

    let mut commands = Vec::new();
    match outcome {
        BuildOutcome::Success(report) => {
            info!(
                output = ?report.output,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "rebuilt stylesheet"
            );
            commands.push(CoreCommand::TrackDependencies(report.dependencies));
        }
        BuildOutcome::Failed(message) => {
            error!(error = %message, "build failed; waiting for the next change");
        }
    }

    if let Some(reason) = queue.take_pending() {
        *state = BuildState::Building;
        commands.push(CoreCommand::StartBuild { reason });
        return CoreStep::running(commands);
    }

    if options.exit_when_idle {
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }

    CoreStep::running(commands)
}
