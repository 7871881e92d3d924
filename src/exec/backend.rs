// src/exec/backend.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{BuildOutcome, RuntimeEvent, TriggerReason};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::Pipeline;

/// How the runtime starts a build.
///
/// `start_build` only has to *start* the build; the implementation reports
/// the result later by sending `RuntimeEvent::BuildCompleted`.
pub trait BuildBackend: Send {
    fn start_build(
        &mut self,
        reason: TriggerReason,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Runs the real pipeline against a file system.
pub struct PipelineBackend {
    pipeline: Arc<Pipeline>,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl PipelineBackend {
    pub fn new(
        pipeline: Arc<Pipeline>,
        fs: Arc<dyn FileSystem>,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            pipeline,
            fs,
            runtime_tx,
        }
    }
}

impl BuildBackend for PipelineBackend {
    fn start_build(
        &mut self,
        reason: TriggerReason,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let pipeline = Arc::clone(&self.pipeline);
        let fs = Arc::clone(&self.fs);
        let tx = self.runtime_tx.clone();

        tokio::spawn(async move {
            debug!(?reason, "running pipeline");
            let joined = tokio::task::spawn_blocking(move || pipeline.build(fs.as_ref())).await;
            let outcome = match joined {
                Ok(Ok(report)) => BuildOutcome::Success(report),
                Ok(Err(err)) => BuildOutcome::Failed(err.to_string()),
                Err(join_err) => BuildOutcome::Failed(format!("build task panicked: {join_err}")),
            };
            if tx.send(RuntimeEvent::BuildCompleted { outcome }).await.is_err() {
                warn!("runtime closed before build completion could be reported");
            }
        });

        Box::pin(async { Ok(()) })
    }
}
