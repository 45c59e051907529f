//! Output format types for CLI commands.

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::{CREATED_AT_KEY, Header, LinkEdge, Note, UPDATED_AT_KEY};
use crate::index::SearchHit;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A single note in listing output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteListing {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl NoteListing {
    pub fn from_note(note: &Note) -> Self {
        let header = note.header().unwrap_or_default();
        Self {
            title: note.title().to_string(),
            created_at: header.get_text(CREATED_AT_KEY).map(str::to_string),
            updated_at: header.get_text(UPDATED_AT_KEY).map(str::to_string),
            score: None,
        }
    }

    pub fn from_hit(hit: &SearchHit) -> Self {
        Self {
            score: Some(hit.score),
            ..Self::from_note(&hit.note)
        }
    }
}

/// A note split into header and body.
#[derive(Debug, Serialize)]
pub struct NoteView<'a> {
    pub title: &'a str,
    pub header: Header,
    pub body: &'a str,
}

/// One end of a link edge.
#[derive(Debug, Serialize)]
pub struct LinkListing {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl From<&LinkEdge> for LinkListing {
    fn from(edge: &LinkEdge) -> Self {
        Self {
            title: edge.target().to_string(),
            label: edge.label().map(str::to_string),
        }
    }
}
