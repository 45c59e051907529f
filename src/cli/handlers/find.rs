//! Find and ls command handlers.

use anyhow::{Context, Result};
use std::cmp::Reverse;

use super::truncate_str;
use crate::cli::output::{NoteListing, Output, OutputFormat};
use crate::cli::{FindArgs, ListArgs};
use crate::service::NoteService;

pub async fn handle_find(args: &FindArgs, service: &NoteService) -> Result<()> {
    let query = args.query_text();

    // The index answers nothing for a blank query; fall back to every note
    let mut listings = if query.trim().is_empty() {
        list_all(service).await?
    } else {
        service
            .find_scored(&query)
            .await
            .context("search failed")?
            .iter()
            .map(NoteListing::from_hit)
            .collect()
    };
    if let Some(limit) = args.limit {
        listings.truncate(limit);
    }

    match args.format {
        OutputFormat::Human => {
            if listings.is_empty() {
                println!("No matching notes found.");
                return Ok(());
            }
            for listing in &listings {
                match listing.score {
                    Some(score) => println!("{:>6.2}  {}", score, listing.title),
                    None => println!("{}", listing.title),
                }
            }
            println!();
            println!("{} result(s)", listings.len());
        }
        OutputFormat::Json => println!("{}", Output::new(listings).to_json()?),
    }
    Ok(())
}

pub async fn handle_list(args: &ListArgs, service: &NoteService) -> Result<()> {
    let listings = list_all(service).await?;

    match args.format {
        OutputFormat::Human => {
            if listings.is_empty() {
                println!("No notes found.");
                return Ok(());
            }
            println!("{:<50}  {:>16}", "Title", "Updated");
            println!("{:<50}  {:>16}", "-".repeat(50), "-".repeat(16));
            for listing in &listings {
                println!(
                    "{:<50}  {:>16}",
                    truncate_str(&listing.title, 50),
                    listing.updated_at.as_deref().unwrap_or("-")
                );
            }
            println!();
            println!("{} note(s)", listings.len());
        }
        OutputFormat::Json => println!("{}", Output::new(listings).to_json()?),
    }
    Ok(())
}

/// Every stored note, most recently updated first.
async fn list_all(service: &NoteService) -> Result<Vec<NoteListing>> {
    let notes = service.list().await.context("failed to list notes")?;
    let mut listings: Vec<NoteListing> = notes.iter().map(NoteListing::from_note).collect();
    sort_by_recent(&mut listings);
    Ok(listings)
}

fn sort_by_recent(listings: &mut [NoteListing]) {
    // Timestamps are fixed-width, so string order is chronological
    listings.sort_by(|a, b| {
        Reverse(a.updated_at.as_deref())
            .cmp(&Reverse(b.updated_at.as_deref()))
            .then_with(|| a.title.cmp(&b.title))
    });
}
