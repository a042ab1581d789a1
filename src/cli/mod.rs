use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use tracing::Subscriber;
use tracing_subscriber::prelude::*;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::cli::args::Cli;
use crate::cli::commands::run::run_command;
use crate::config::{load_config, CONFIG_FILE};
use crate::report::console;
use crate::types::RunMode;

pub mod args;
pub mod commands;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let run_mode = RunMode {
        dry_run: cli.dry_run,
        debug: cli.debug,
        include_snapshots: cli.include_snapshots,
    };

    // Only an explicitly named config file has to exist.
    let (config_path, required) = match cli.config {
        Some(path) => (path, true),
        None => (PathBuf::from(CONFIG_FILE), false),
    };
    let cfg = load_config(&config_path, required)?;
    init_tracing(cfg.log_file.as_deref(), run_mode.debug);
    tracing::debug!(config = %config_path.display(), types = cfg.backup_types.len(), "config loaded");

    run_command(&cfg, &cli.limit, cli.orphans, run_mode)?;
    Ok(())
}

fn init_tracing(log_file: Option<&Path>, debug: bool) {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "off" }));
    let file_layer = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(EnvFilter::new(if debug { "debug" } else { "info" })),
            ),
            Err(err) => {
                eprintln!("log file {} unavailable: {}", path.display(), err);
                None
            }
        }
    });
    let _ = tracing_subscriber::registry()
        .with(stderr_layer(io::stderr, console_filter))
        .with(file_layer)
        .try_init();
}

/// Log events for stderr. Console lines are already on stdout and skipped.
fn stderr_layer<S, W>(writer: W, filter: EnvFilter) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_filter(filter)
        .with_filter(filter_fn(|meta| meta.target() != console::TARGET))
}
