// tests/runtime_fake_backend.rs

mod common;
use crate::common::{FakeBackend, init_tracing, report_with_dependencies, with_timeout};

use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use csspipe::engine::{
    BuildOutcome, CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason,
    TriggerWhileRunningBehaviour,
};
use csspipe::watch::TrackedFiles;

type TestResult = Result<(), Box<dyn Error>>;

fn exit_when_idle() -> RuntimeOptions {
    RuntimeOptions {
        exit_when_idle: true,
    }
}

async fn send_requests(tx: &mpsc::Sender<RuntimeEvent>, reasons: &[TriggerReason]) -> TestResult {
    for reason in reasons {
        tx.send(RuntimeEvent::BuildRequested { reason: *reason }).await?;
    }
    Ok(())
}

#[tokio::test]
async fn requests_during_a_build_coalesce_into_one_rebuild() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let started = Arc::new(Mutex::new(Vec::new()));
    let backend = FakeBackend::new(tx.clone(), Arc::clone(&started));

    // The first request starts a build; the completion lands behind the
    // other three, which all arrive while building.
    send_requests(
        &tx,
        &[
            TriggerReason::Startup,
            TriggerReason::FileWatch,
            TriggerReason::FileWatch,
            TriggerReason::FileWatch,
        ],
    )
    .await?;

    let core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, exit_when_idle());
    with_timeout(Runtime::new(core, rx, backend).run()).await?;

    let started = started.lock().unwrap().clone();
    assert_eq!(started, vec![TriggerReason::Startup, TriggerReason::FileWatch]);
    Ok(())
}

#[tokio::test]
async fn drop_mode_runs_only_the_first_build() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let started = Arc::new(Mutex::new(Vec::new()));
    let backend = FakeBackend::new(tx.clone(), Arc::clone(&started));

    send_requests(&tx, &[TriggerReason::Startup, TriggerReason::FileWatch]).await?;

    let core = CoreRuntime::new(TriggerWhileRunningBehaviour::Drop, exit_when_idle());
    with_timeout(Runtime::new(core, rx, backend).run()).await?;

    assert_eq!(started.lock().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_builds_do_not_stop_the_loop() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let started = Arc::new(Mutex::new(Vec::new()));
    let backend = FakeBackend::new(tx.clone(), Arc::clone(&started))
        .with_outcome(BuildOutcome::Failed("syntax error".to_string()));

    send_requests(&tx, &[TriggerReason::Startup, TriggerReason::FileWatch]).await?;

    let core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, exit_when_idle());
    with_timeout(Runtime::new(core, rx, backend).run()).await?;

    assert_eq!(started.lock().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn successful_builds_publish_their_dependencies() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let started = Arc::new(Mutex::new(Vec::new()));
    let deps = vec![
        PathBuf::from("/nonexistent/src/index.css"),
        PathBuf::from("/nonexistent/src/parts/a.css"),
    ];
    let backend = FakeBackend::new(tx.clone(), Arc::clone(&started))
        .with_outcome(BuildOutcome::Success(report_with_dependencies(deps.clone())));
    let tracked = TrackedFiles::new();

    send_requests(&tx, &[TriggerReason::Startup]).await?;

    let core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, exit_when_idle());
    with_timeout(
        Runtime::new(core, rx, backend)
            .with_tracked_files(tracked.clone())
            .run(),
    )
    .await?;

    assert_eq!(tracked.snapshot(), deps);
    Ok(())
}

#[tokio::test]
async fn shutdown_stops_an_idle_runtime() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(4);
    let backend = FakeBackend::new(tx.clone(), Arc::new(Mutex::new(Vec::new())));
    tx.send(RuntimeEvent::ShutdownRequested).await?;

    let core = CoreRuntime::new(TriggerWhileRunningBehaviour::Queue, RuntimeOptions::default());
    with_timeout(Runtime::new(core, rx, backend).run()).await?;
    Ok(())
}
