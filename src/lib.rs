// src/lib.rs

pub mod cli;
pub mod config;
pub mod css;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::PipelineConfig;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::Result;
use crate::exec::PipelineBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::{BuildReport, Pipeline};
use crate::tasks::{TaskGraph, TaskKind};
use crate::watch::{TrackedFiles, WatchSettings, spawn_watcher};

/// High-level entry point used by `main.rs`.
///
/// Loads the config, resolves the requested task against the task graph and
/// runs the plan: a single build for `build`, and the watch loop (which
/// starts with a build) for `watch` and `default`.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = config::load_or_default(args.config.as_deref().map(Path::new))?;
    let graph = TaskGraph::new();
    let plan = graph.plan(args.task_name())?;
    let pipeline = Pipeline::from_config(&cfg)?;

    if args.dry_run {
        print_dry_run(&cfg, &pipeline, &plan);
        return Ok(());
    }

    if plan.contains(&TaskKind::Watch) {
        run_watch(&cfg, pipeline).await
    } else {
        run_build(&pipeline, &RealFileSystem).map(|_| ())
    }
}

/// Run the pipeline once.
pub fn run_build(pipeline: &Pipeline, fs: &dyn FileSystem) -> Result<BuildReport> {
    let report = pipeline.build(fs)?;
    info!(
        output = ?report.output,
        minified = ?report.minified_output,
        hash = %report.hash,
        "wrote stylesheet"
    );
    Ok(report)
}

/// Build once, then rebuild on every watched change until Ctrl-C.
///
/// The initial build goes through the same single-flight core as the
/// rebuilds, so a failing first build is logged and watching continues.
pub async fn run_watch(cfg: &PipelineConfig, pipeline: Pipeline) -> Result<()> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let tracked = TrackedFiles::new();

    let backend = PipelineBackend::new(Arc::new(pipeline), Arc::clone(&fs), rt_tx.clone());

    let settings = WatchSettings::from_config(cfg)?;
    let _watcher_handle = spawn_watcher(settings, tracked.clone(), fs, rt_tx.clone())
        .context("starting file watcher")?;

    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    rt_tx
        .send(RuntimeEvent::BuildRequested {
            reason: TriggerReason::Startup,
        })
        .await
        .context("seeding the initial build")?;

    let core = CoreRuntime::new(
        cfg.watch_section().triggered_while_running_behaviour,
        RuntimeOptions::default(),
    );
    Runtime::new(core, rt_rx, backend)
        .with_tracked_files(tracked)
        .run()
        .await
}

/// Print the resolved configuration and task plan.
fn print_dry_run(cfg: &PipelineConfig, pipeline: &Pipeline, plan: &[TaskKind]) {
    let build = cfg.build_section();
    let watch = cfg.watch_section();

    println!("csspipe dry-run");
    println!("  root = {:?}", cfg.root());
    println!(
        "  plan = {}",
        plan.iter().map(|t| t.name()).collect::<Vec<_>>().join(" -> ")
    );
    println!();

    println!("build:");
    println!("  source: {:?}", cfg.source_path());
    println!("  output: {:?}", cfg.output_path());
    match cfg.minified_output_path() {
        Some(path) => println!("  minified_output: {:?}", path),
        None => println!("  minified_output: (disabled)"),
    }
    println!("  browsers: {:?}", build.browsers);
    if !build.import_paths.is_empty() {
        println!("  import_paths: {:?}", build.import_paths);
    }
    println!("  preserve_custom_properties: {}", build.preserve_custom_properties);
    println!("  steps: {}", pipeline.step_names().join(", "));

    if plan.contains(&TaskKind::Watch) {
        println!();
        println!("watch:");
        println!("  watch: {:?}", watch.watch);
        if !watch.exclude.is_empty() {
            println!("  exclude: {:?}", watch.exclude);
        }
        println!("  track_imports: {}", watch.track_imports);
        println!("  use_hash: {}", watch.use_hash);
        println!("  debounce_ms: {}", watch.debounce_ms);
        println!(
            "  triggered_while_running_behaviour: {:?}",
            watch.triggered_while_running_behaviour
        );
    }

    debug!("dry-run complete (nothing built)");
}
