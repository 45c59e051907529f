//! Link-related command handlers (links, backlinks).

use anyhow::Result;

use crate::cli::LinksArgs;
use crate::cli::output::{LinkListing, Output, OutputFormat};
use crate::service::NoteService;

pub async fn handle_links(args: &LinksArgs, service: &NoteService) -> Result<()> {
    let listings: Vec<LinkListing> = service
        .outgoing_edges(&args.title)
        .await
        .iter()
        .map(LinkListing::from)
        .collect();
    print_links(&listings, args.format, "No links found.", "link(s)")
}

pub async fn handle_backlinks(args: &LinksArgs, service: &NoteService) -> Result<()> {
    let listings: Vec<LinkListing> = service
        .backlinks(&args.title)
        .await
        .into_iter()
        .map(|title| LinkListing { title, label: None })
        .collect();
    print_links(&listings, args.format, "No backlinks found.", "backlink(s)")
}

fn print_links(
    listings: &[LinkListing],
    format: OutputFormat,
    empty: &str,
    noun: &str,
) -> Result<()> {
    match format {
        OutputFormat::Human => {
            if listings.is_empty() {
                println!("{empty}");
                return Ok(());
            }
            for listing in listings {
                println!("{}", human_line(listing));
            }
            println!();
            println!("{} {}", listings.len(), noun);
        }
        OutputFormat::Json => println!("{}", Output::new(listings).to_json()?),
    }
    Ok(())
}

fn human_line(listing: &LinkListing) -> String {
    match &listing.label {
        Some(label) => format!("{} ({})", listing.title, label),
        None => listing.title.clone(),
    }
}
