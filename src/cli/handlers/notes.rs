//! Put, show and rm command handlers.

use anyhow::{Context, Result, bail};
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::cli::output::{NoteView, Output, OutputFormat};
use crate::cli::{PutArgs, RmArgs, ShowArgs};
use crate::service::NoteService;

pub async fn handle_put(args: &PutArgs, service: &NoteService) -> Result<()> {
    let raw = match &args.file {
        Some(path) => read_input_file(path).await?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("failed to read note from stdin")?;
            raw
        }
    };

    let note = service
        .put(&args.title, &raw)
        .await
        .with_context(|| format!("failed to save note '{}'", args.title))?;

    if args.print {
        print!("{}", note.raw_text());
        if !note.raw_text().ends_with('\n') {
            println!();
        }
    } else {
        let path = service.path_for(&args.title)?;
        println!("{}", path.display());
    }
    Ok(())
}

pub async fn handle_show(args: &ShowArgs, service: &NoteService) -> Result<()> {
    let Some(note) = service
        .read(&args.title)
        .await
        .with_context(|| format!("failed to read note '{}'", args.title))?
    else {
        bail!("note not found: '{}'", args.title);
    };

    match args.format {
        OutputFormat::Human => {
            print!("{}", note.raw_text());
            if !note.raw_text().ends_with('\n') {
                println!();
            }
        }
        OutputFormat::Json => {
            let header = note
                .header()
                .with_context(|| format!("note '{}' has an invalid header", args.title))?;
            let view = NoteView {
                title: note.title(),
                header,
                body: note.body(),
            };
            println!("{}", Output::new(view).to_json()?);
        }
    }
    Ok(())
}

pub async fn handle_rm(args: &RmArgs, service: &NoteService) -> Result<()> {
    let existed = service
        .remove(&args.title)
        .await
        .with_context(|| format!("failed to remove note '{}'", args.title))?;

    if existed {
        println!("Removed: {}", args.title);
    } else {
        println!("No note named '{}'", args.title);
    }
    Ok(())
}

async fn read_input_file(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))
}
