// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::BuildBackend;
use crate::watch::TrackedFiles;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// IO shell around [`CoreRuntime`]: reads events, feeds the core, and runs
/// the commands it returns.
pub struct Runtime<B: BuildBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
    tracked: Option<TrackedFiles>,
}

impl<B: BuildBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: BuildBackend> Runtime<B> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, backend: B) -> Self {
        Self {
            core,
            event_rx,
            backend,
            tracked: None,
        }
    }

    /// Publish each successful build's dependencies to `tracked`.
    pub fn with_tracked_files(mut self, tracked: TrackedFiles) -> Self {
        self.tracked = Some(tracked);
        self
    }

    /// Main event loop. Returns when the channel closes, on shutdown, or when
    /// the core asks to exit.
    pub async fn run(mut self) -> Result<()> {
        info!("csspipe runtime started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("stopping runtime");
                return Ok(());
            }
        }

        info!("runtime event channel closed; exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartBuild { reason } => {
                debug!(?reason, "starting build");
                self.backend.start_build(reason).await?;
            }
            CoreCommand::TrackDependencies(paths) => {
                if let Some(tracked) = &self.tracked {
                    tracked.replace(paths);
                }
            }
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit");
            }
        }
        Ok(())
    }
}
