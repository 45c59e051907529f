//! Core types: Note, Header, LinkEdge

mod header;
mod link;
mod note;

pub use header::{
    CREATED_AT_KEY, Header, HeaderValue, RESERVED_KEYS, TITLE_KEY, UPDATED_AT_KEY, is_reserved,
};
pub use link::{LinkEdge, extract_links, is_valid_target};
pub use note::Note;
