//! quire - plain-text notes with full-text search and backlinks

pub mod cli;
pub mod domain;
pub mod index;
pub mod infra;
pub mod service;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{
    Cli, Command,
    config::Config,
    handlers::{
        handle_backlinks, handle_completions, handle_find, handle_links, handle_list, handle_put,
        handle_rm, handle_show,
    },
};
use service::NoteService;

/// Main entry point for the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::Completions(args) = &cli.command {
        handle_completions(args);
        return Ok(());
    }

    let config = Config::load()?;
    let notes_dir = config.notes_dir(cli.dir.as_ref());
    let service = NoteService::open(&notes_dir)
        .await
        .with_context(|| format!("failed to open notes directory {}", notes_dir.display()))?;

    match &cli.command {
        Command::Put(args) => handle_put(args, &service).await,
        Command::Show(args) => handle_show(args, &service).await,
        Command::Rm(args) => handle_rm(args, &service).await,
        Command::Find(args) => handle_find(args, &service).await,
        Command::Ls(args) => handle_list(args, &service).await,
        Command::Links(args) => handle_links(args, &service).await,
        Command::Backlinks(args) => handle_backlinks(args, &service).await,
        Command::Completions(_) => Ok(()),
    }
}

/// Logs go to stderr. `-v` overrides `RUST_LOG`, which defaults to `warn`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
