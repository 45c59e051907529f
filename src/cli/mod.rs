//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use output::OutputFormat;

/// quire - plain-text notes with search and backlinks
#[derive(Parser, Debug)]
#[command(name = "quire", version, about, long_about = None)]
pub struct Cli {
    /// Notes directory (overrides QUIRE_DIR and the config file)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or replace a note from stdin or a file
    Put(PutArgs),

    /// Print a note's stored text
    Show(ShowArgs),

    /// Delete a note
    Rm(RmArgs),

    /// Full-text search across notes
    Find(FindArgs),

    /// List every note
    Ls(ListArgs),

    /// Show the notes a note links to
    Links(LinksArgs),

    /// Show notes that link to a given note
    Backlinks(LinksArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `put` command
#[derive(Parser, Debug)]
pub struct PutArgs {
    /// Note title
    pub title: String,

    /// Read the note from this file instead of stdin
    #[arg(short = 'F', long)]
    pub file: Option<PathBuf>,

    /// Print the stored text instead of the file path
    #[arg(short, long)]
    pub print: bool,
}

/// Arguments for the `show` command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Note title
    pub title: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `rm` command
#[derive(Parser, Debug)]
pub struct RmArgs {
    /// Note title
    pub title: String,
}

/// Arguments for the `find` command
#[derive(Parser, Debug)]
pub struct FindArgs {
    /// Search terms; matching any term is enough. Empty lists every note.
    #[arg(num_args = 0..)]
    pub query: Vec<String>,

    /// Show at most this many results
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

impl FindArgs {
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }
}

/// Arguments for the `ls` command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `links` and `backlinks` commands
#[derive(Parser, Debug)]
pub struct LinksArgs {
    /// Note title
    pub title: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}
