// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `csspipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "csspipe",
    version,
    about = "Build a CSS entry file through a post-processing pipeline and rebuild on change.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run. Defaults to `watch`.
    #[command(subcommand)]
    pub task: Option<TaskCommand>,

    /// Path to the config file (TOML).
    ///
    /// If omitted, `csspipe.toml` in the current directory is used when it
    /// exists, and built-in defaults otherwise.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CSSPIPE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve config and task plan, print them, but don't build anything.
    #[arg(long, global = true)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Name of the task to resolve against the task graph.
    pub fn task_name(&self) -> &'static str {
        match self.task {
            Some(TaskCommand::Build) => "build",
            Some(TaskCommand::Watch) => "watch",
            None => "default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum TaskCommand {
    /// Run the pipeline once and exit.
    Build,
    /// Build once, then rebuild whenever a watched file changes.
    Watch,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_selects_default_task() {
        let args = CliArgs::try_parse_from(["csspipe"]).unwrap();
        assert_eq!(args.task, None);
        assert_eq!(args.task_name(), "default");
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["csspipe", "build", "--config", "x.toml", "--dry-run"])
                .unwrap();
        assert_eq!(args.task, Some(TaskCommand::Build));
        assert_eq!(args.config.as_deref(), Some("x.toml"));
        assert!(args.dry_run);
    }
}
