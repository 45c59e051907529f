//! File I/O, header parsing, path safety

pub mod frontmatter;
mod fs;
mod path;

pub use frontmatter::{ParseError, TIMESTAMP_FORMAT, format_timestamp, join, merge, split};
pub use fs::{ErrorKind, NoteStore, StoreError, Written};
pub use path::{InvalidPath, NOTE_EXTENSION, PathResolver, sanitize_title};
