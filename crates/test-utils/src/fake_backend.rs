use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use csspipe::engine::{BuildOutcome, RuntimeEvent, TriggerReason};
use csspipe::errors::Result;
use csspipe::exec::BuildBackend;
use csspipe::pipeline::BuildReport;

/// A fake backend that:
/// - records every build it was asked to start
/// - immediately reports the configured outcome.
pub struct FakeBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    started: Arc<Mutex<Vec<TriggerReason>>>,
    outcome: BuildOutcome,
}

impl FakeBackend {
    /// Every build succeeds with an empty report.
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        started: Arc<Mutex<Vec<TriggerReason>>>,
    ) -> Self {
        Self {
            runtime_tx,
            started,
            outcome: BuildOutcome::Success(report_with_dependencies(Vec::new())),
        }
    }

    pub fn with_outcome(mut self, outcome: BuildOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// A successful report that read `dependencies`.
pub fn report_with_dependencies(dependencies: Vec<PathBuf>) -> BuildReport {
    BuildReport {
        source: PathBuf::from("src/index.css"),
        output: PathBuf::from("index.css"),
        minified_output: Some(PathBuf::from("index.min.css")),
        dependencies,
        hash: String::new(),
        elapsed: Duration::ZERO,
    }
}

impl BuildBackend for FakeBackend {
    fn start_build(
        &mut self,
        reason: TriggerReason,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let started = Arc::clone(&self.started);
        let outcome = self.outcome.clone();

        Box::pin(async move {
            started.lock().unwrap().push(reason);
            tx.send(RuntimeEvent::BuildCompleted { outcome })
                .await
                .map_err(anyhow::Error::from)?;
            Ok(())
        })
    }
}
