//! Note type: a title and the full text stored for it.

use crate::domain::Header;
use crate::infra::frontmatter::{self, ParseError};
use serde::Serialize;

/// A stored note.
///
/// The title is the only identity. Header fields and body are not kept
/// separately; they are derived from `raw_text` on demand.
///
/// # Examples
///
/// ```
/// use quire::domain::Note;
///
/// let note = Note::new("Alpha", "---\ntitle: Alpha\n---\nSee [[Beta]]");
/// assert_eq!(note.body(), "See [[Beta]]");
/// assert_eq!(note.header().unwrap().get_text("title"), Some("Alpha"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    title: String,
    raw_text: String,
}

impl Note {
    pub fn new(title: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            raw_text: raw_text.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the full stored text, header block included.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Parses the header block.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the header block is unterminated or malformed.
    pub fn header(&self) -> Result<Header, ParseError> {
        frontmatter::split(&self.raw_text).map(|(header, _)| header)
    }

    /// Returns the body without parsing the header.
    ///
    /// Text with an unterminated header block is treated as all body.
    pub fn body(&self) -> &str {
        frontmatter::body_of(&self.raw_text)
    }
}
