//! Command handlers for the CLI.

mod find;
mod links;
mod notes;

pub use find::{handle_find, handle_list};
pub use links::{handle_backlinks, handle_links};
pub use notes::{handle_put, handle_rm, handle_show};

use clap::CommandFactory;

use crate::cli::{Cli, CompletionsArgs};

// ===========================================
// Shared Utilities
// ===========================================

/// Writes completions for the requested shell to stdout.
pub fn handle_completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(args.shell, &mut cmd, name, &mut std::io::stdout());
}

/// Truncates a string to a maximum display width, adding ellipsis if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
