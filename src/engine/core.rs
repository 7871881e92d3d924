// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`RuntimeEvent`]s and produces the commands the async
//! shell should run. It owns no channels and performs no IO, so it can be
//! tested without Tokio or a file system.

use crate::engine::event_handlers::{CoreStep, handle_build_completion, handle_build_request};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::types::TriggerWhileRunningBehaviour;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildState {
    #[default]
    Idle,
    Building,
}

#[derive(Debug)]
pub struct CoreRuntime {
    state: BuildState,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(behaviour: TriggerWhileRunningBehaviour, options: RuntimeOptions) -> Self {
        Self {
            state: BuildState::Idle,
            queue: TriggerQueue::new(behaviour),
            options,
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == BuildState::Idle
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Handle a single runtime event, returning the commands for the shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::BuildRequested { reason } => {
                handle_build_request(&mut self.state, &mut self.queue, reason)
            }
            RuntimeEvent::BuildCompleted { outcome } => handle_build_completion(
                &mut self.state,
                &mut self.queue,
                &self.options,
                outcome,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BuildOutcome, CoreCommand, TriggerReason};

    fn request() -> RuntimeEvent {
        RuntimeEvent::BuildRequested {
            reason: TriggerReason::FileWatch,
        }
    }

    fn failed() -> RuntimeEvent {
        RuntimeEvent::BuildCompleted {
            outcome: BuildOutcome::Failed("boom".to_string()),
        }
    }

    fn starts(step: &CoreStep) -> usize {
        step.commands
            .iter()
            .filter(|c| matches!(c, CoreCommand::StartBuild { .. }))
            .count()
    }

    #[test]
    fn idle_request_starts_a_build() {
        let mut core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, RuntimeOptions::default());
        let step = core.step(request());
        assert_eq!(starts(&step), 1);
        assert_eq!(core.state(), BuildState::Building);
    }

    #[test]
    fn requests_while_building_coalesce_into_one_rebuild() {
        let mut core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, RuntimeOptions::default());
        core.step(request());
        for _ in 0..5 {
            assert_eq!(starts(&core.step(request())), 0);
        }

        let step = core.step(failed());
        assert_eq!(starts(&step), 1);
        assert!(core.queue_is_empty());

        let step = core.step(failed());
        assert_eq!(starts(&step), 0);
        assert!(core.is_idle());
    }

    #[test]
    fn drop_mode_ignores_requests_while_building() {
        let mut core = CoreRuntime::new(TriggerWhileRunningBehaviour::Drop, RuntimeOptions::default());
        core.step(request());
        core.step(request());
        let step = core.step(failed());
        assert_eq!(starts(&step), 0);
        assert!(step.keep_running);
        assert!(core.is_idle());
    }

    #[test]
    fn exit_when_idle_stops_after_last_build() {
        let mut core = CoreRuntime::new(
            TriggerWhileRunningBehaviour::Queue,
            RuntimeOptions {
                exit_when_idle: true,
            },
        );
        core.step(request());
        let step = core.step(failed());
        assert!(!step.keep_running);
        assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let mut core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, RuntimeOptions::default());
        assert!(!core.step(RuntimeEvent::ShutdownRequested).keep_running);
    }
}
