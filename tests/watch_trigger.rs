// tests/watch_trigger.rs

mod common;
use crate::common::{PipelineConfigBuilder, init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use csspipe::engine::{RuntimeEvent, TriggerReason};
use csspipe::fs::RealFileSystem;
use csspipe::watch::{TrackedFiles, WatchSettings, WatcherHandle, spawn_watcher};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

/// Long enough for the OS watcher to be registered.
const SETTLE: Duration = Duration::from_millis(200);
/// How long to wait before concluding that nothing was sent.
const QUIET: Duration = Duration::from_millis(600);

fn write(root: &Path, rel: &str, contents: &str) -> TestResult {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn start(
    builder: PipelineConfigBuilder,
    tracked: TrackedFiles,
) -> Result<(WatcherHandle, mpsc::Receiver<RuntimeEvent>), Box<dyn Error>> {
    let cfg = builder.debounce_ms(100).build();
    let (tx, rx) = mpsc::channel(16);
    let handle = spawn_watcher(
        WatchSettings::from_config(&cfg)?,
        tracked,
        Arc::new(RealFileSystem),
        tx,
    )?;
    Ok((handle, rx))
}

async fn expect_one_request(rx: &mut mpsc::Receiver<RuntimeEvent>) -> TestResult {
    let event = with_timeout(rx.recv()).await.ok_or("watcher channel closed")?;
    assert!(
        matches!(
            event,
            RuntimeEvent::BuildRequested {
                reason: TriggerReason::FileWatch
            }
        ),
        "unexpected event {event:?}"
    );
    sleep(QUIET).await;
    assert!(rx.try_recv().is_err(), "more than one build requested");
    Ok(())
}

async fn expect_none(rx: &mut mpsc::Receiver<RuntimeEvent>) {
    if let Ok(event) = timeout(QUIET, rx.recv()).await {
        panic!("expected no build request, got {event:?}");
    }
}

#[tokio::test]
async fn modifying_a_watched_file_requests_exactly_one_build() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    write(dir.path(), "src/index.css", ".a { top: 0 }")?;

    let (_handle, mut rx) = start(PipelineConfigBuilder::new(dir.path()), TrackedFiles::new())?;
    sleep(SETTLE).await;

    write(dir.path(), "src/index.css", ".a { top: 1px }")?;
    expect_one_request(&mut rx).await
}

#[tokio::test]
async fn non_matching_files_are_ignored() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    write(dir.path(), "src/index.css", ".a { top: 0 }")?;

    let (_handle, mut rx) = start(PipelineConfigBuilder::new(dir.path()), TrackedFiles::new())?;
    sleep(SETTLE).await;

    write(dir.path(), "README.md", "# hi")?;
    write(dir.path(), "src/parts/button.css", ".b { top: 0 }")?;
    write(dir.path(), "index.css", "/* output */")?;
    expect_none(&mut rx).await;
    Ok(())
}

#[tokio::test]
async fn tracked_imports_outside_the_globs_trigger() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    write(dir.path(), "src/index.css", "@import 'parts/button.css';")?;
    write(dir.path(), "src/parts/button.css", ".b { top: 0 }")?;

    let tracked = TrackedFiles::new();
    tracked.replace(vec![dir.path().join("src/parts/button.css")]);
    let (_handle, mut rx) = start(
        PipelineConfigBuilder::new(dir.path()).track_imports(true),
        tracked,
    )?;
    sleep(SETTLE).await;

    write(dir.path(), "src/parts/button.css", ".b { top: 2px }")?;
    expect_one_request(&mut rx).await
}

#[tokio::test]
async fn use_hash_skips_rewrites_with_identical_content() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    write(dir.path(), "src/index.css", ".a { top: 0 }")?;

    let (_handle, mut rx) = start(
        PipelineConfigBuilder::new(dir.path()).use_hash(true),
        TrackedFiles::new(),
    )?;
    sleep(SETTLE).await;

    write(dir.path(), "src/index.css", ".a { top: 0 }")?;
    expect_none(&mut rx).await;

    write(dir.path(), "src/index.css", ".a { top: 3px }")?;
    expect_one_request(&mut rx).await
}
