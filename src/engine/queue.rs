// src/engine/queue.rs

use tracing::debug;

use super::{TriggerReason, TriggerWhileRunningBehaviour};

/// Requests that arrive while a build is already running.
///
/// In `Queue` mode any number of requests coalesce into a single pending
/// rebuild; the reason of the latest one is kept. In `Drop` mode nothing is
/// remembered.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    pending: Option<TriggerReason>,
}

impl TriggerQueue {
    pub fn new(behaviour: TriggerWhileRunningBehaviour) -> Self {
        Self {
            behaviour,
            pending: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// Record a request that arrived while building.
    pub fn record_trigger(&mut self, reason: TriggerReason) {
        match self.behaviour {
            TriggerWhileRunningBehaviour::Queue => {
                let merged = self.pending.replace(reason).is_some();
                debug!(?reason, merged, "queued rebuild");
            }
            TriggerWhileRunningBehaviour::Drop => {
                debug!(?reason, "build in progress; dropping trigger");
            }
        }
    }

    /// Take the pending rebuild, if any.
    pub fn take_pending(&mut self) -> Option<TriggerReason> {
        self.pending.take()
    }
}
