// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::engine::RuntimeEvent;
use crate::fs::FileSystem;
use crate::watch::event_handler::{ChangeFilter, is_content_event, process_changes};
use crate::watch::patterns::WatchProfile;
use crate::watch::tracked::TrackedFiles;

/// Everything the watcher needs from the `[watch]` section.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub root: PathBuf,
    pub profile: WatchProfile,
    pub track_imports: bool,
    pub use_hash: bool,
    pub debounce: Duration,
}

impl WatchSettings {
    pub fn from_config(cfg: &PipelineConfig) -> Result<Self> {
        let section = cfg.watch_section();
        Ok(Self {
            root: cfg.root().to_path_buf(),
            profile: WatchProfile::from_config(cfg)?,
            track_imports: section.track_imports,
            use_hash: section.use_hash,
            debounce: Duration::from_millis(section.debounce_ms),
        })
    }
}

/// Keeps the underlying `RecommendedWatcher` alive. Dropping it stops
/// watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `settings.root` recursively and send
/// `RuntimeEvent::BuildRequested` when a watched file changes.
///
/// Events arriving within `settings.debounce` of each other are folded into
/// one batch, and a batch triggers at most one request.
pub fn spawn_watcher(
    settings: WatchSettings,
    tracked: TrackedFiles,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = settings
        .root
        .canonicalize()
        .unwrap_or_else(|_| settings.root.clone());

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("csspipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => eprintln!("csspipe: file watch error: {err}"),
        },
        Config::default(),
    )?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(root = ?root, patterns = ?settings.profile.patterns(), "file watcher started");

    let mut filter = ChangeFilter::new(root, settings.profile, fs).with_hash(settings.use_hash);
    if settings.track_imports {
        filter = filter.with_tracked(tracked);
    }
    filter.seed_hashes();
    let debounce = settings.debounce;

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let mut paths = Vec::new();
            collect_paths(&mut paths, event);

            if !debounce.is_zero() {
                let quiet = tokio::time::sleep(debounce);
                tokio::pin!(quiet);
                loop {
                    tokio::select! {
                        _ = &mut quiet => break,
                        next = event_rx.recv() => match next {
                            Some(event) => collect_paths(&mut paths, event),
                            None => break,
                        },
                    }
                }
            }

            paths.sort();
            paths.dedup();
            if paths.is_empty() {
                continue;
            }
            if !process_changes(&mut filter, &paths, &runtime_tx).await {
                break;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

fn collect_paths(into: &mut Vec<PathBuf>, event: Event) {
    debug!(?event, "received notify event");
    if is_content_event(&event.kind) {
        into.extend(event.paths);
    }
}
