//! Note Store: one file per note under the notes root, written atomically.

use crate::domain::{Header, Note, TITLE_KEY};
use crate::infra::frontmatter::{ParseError, join, local_now, merge, split};
use crate::infra::path::{InvalidPath, PathResolver};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from Note Store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidPath(#[from] InvalidPath),

    #[error("storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid header for note '{title}': {source}")]
    InvalidHeader {
        title: String,
        #[source]
        source: ParseError,
    },

    #[error("invalid encoding in {}: {encoding}", .path.display())]
    InvalidEncoding { path: PathBuf, encoding: String },
}

/// Coarse classification of failures, for callers that branch on the kind
/// rather than the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidPath,
    InvalidHeader,
    CorruptNote,
    StorageUnavailable,
    /// The in-memory search index rejected an update or query.
    IndexUnavailable,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidPath(_) => ErrorKind::InvalidPath,
            StoreError::InvalidHeader { .. } => ErrorKind::InvalidHeader,
            StoreError::InvalidEncoding { .. } => ErrorKind::CorruptNote,
            StoreError::StorageUnavailable { .. } => ErrorKind::StorageUnavailable,
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::StorageUnavailable {
            path: path.into(),
            source,
        }
    }
}

/// Outcome of a successful `NoteStore::put`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    /// The exact text now on disk.
    pub text: String,
    /// Title of a different note that occupied the same file and was
    /// overwritten, when two titles sanitize to one file name.
    pub displaced: Option<String>,
}

/// File-backed note storage. The single source of truth.
#[derive(Debug, Clone)]
pub struct NoteStore {
    resolver: PathResolver,
}

impl NoteStore {
    /// Creates a store rooted at `root` without touching the disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            resolver: PathResolver::new(root),
        }
    }

    /// Creates the root if needed and returns a store using its canonical path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageUnavailable` if the root cannot be created
    /// or canonicalized.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;
        let canonical = tokio::fs::canonicalize(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;
        Ok(Self::new(canonical))
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// Returns the file path a title maps to.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the title has no safe file name.
    pub fn path_for(&self, title: &str) -> Result<PathBuf, InvalidPath> {
        self.resolver.resolve(title)
    }

    /// Creates the notes root if it is absent. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageUnavailable` if the directory cannot be created.
    pub async fn ensure_ready(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(self.root())
            .await
            .map_err(|e| StoreError::io(self.root(), e))
    }

    /// Reads every note file under the root. Order is unspecified.
    ///
    /// Each note's title comes from its header `title` field, falling back to
    /// the file stem. Files that are not UTF-8 or whose header fails to parse
    /// are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageUnavailable` if the root cannot be listed.
    pub async fn list(&self) -> Result<Vec<Note>, StoreError> {
        let root = self.root();
        let mut entries = tokio::fs::read_dir(root)
            .await
            .map_err(|e| StoreError::io(root, e))?;

        let mut notes = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(root, e))?
        {
            let path = entry.path();
            if !self.resolver.is_note_file(&path) {
                continue;
            }
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::io(&path, e)),
            };
            let raw = match decode(bytes, &path) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable note");
                    continue;
                }
            };
            let header = match split(&raw) {
                Ok((header, _)) => header,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping note with invalid header");
                    continue;
                }
            };

            let title = stored_title(&header, &path);
            if let Some(title) = title {
                notes.push(Note::new(title, raw));
            }
        }

        Ok(notes)
    }

    /// Reads one note. Returns `Ok(None)` if no file exists for the title.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` if the title has no safe file name,
    /// `StoreError::InvalidEncoding` if the file is not UTF-8, and
    /// `StoreError::StorageUnavailable` for other I/O failures.
    pub async fn get(&self, title: &str) -> Result<Option<Note>, StoreError> {
        let path = self.resolver.resolve(title)?;
        match read_text(&path).await? {
            Some(raw) => Ok(Some(Note::new(title, raw))),
            None => Ok(None),
        }
    }

    /// Writes a note and returns the exact text stored on disk.
    ///
    /// The note's raw text supplies the caller's header and body. Reserved
    /// keys are replaced per `frontmatter::merge`, keeping `createdAt` from
    /// any existing file at the same path. The file is replaced atomically
    /// via a temporary sibling and rename. If the existing file belonged to
    /// another title, that title is reported as displaced.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` if the title has no safe file name,
    /// `StoreError::InvalidHeader` if the caller's header block is malformed,
    /// and `StoreError::StorageUnavailable` if reading or writing fails.
    pub async fn put(&self, note: &Note) -> Result<Written, StoreError> {
        let title = note.title();
        let path = self.resolver.resolve(title)?;
        let (incoming, body) = split(note.raw_text()).map_err(|source| StoreError::InvalidHeader {
            title: title.to_string(),
            source,
        })?;

        let existing = read_header(&path).await?;
        let displaced = existing
            .as_ref()
            .and_then(|header| stored_title(header, &path))
            .filter(|previous| previous != title);

        let header = merge(existing.as_ref(), incoming, title, &local_now());
        let text = join(&header, body);
        write_atomic(&path, &text).await?;

        debug!(title, path = %path.display(), bytes = text.len(), displaced = ?displaced, "note written");
        Ok(Written { text, displaced })
    }

    /// Title recorded in the file `title` maps to, if that file exists and
    /// has a readable header. Differs from `title` when another title
    /// sanitizing to the same file name wrote it last.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` if the title has no safe file name
    /// and `StoreError::StorageUnavailable` if the file cannot be read.
    pub async fn occupant(&self, title: &str) -> Result<Option<String>, StoreError> {
        let path = self.resolver.resolve(title)?;
        Ok(read_header(&path)
            .await?
            .and_then(|header| stored_title(&header, &path)))
    }

    /// Removes a note. Returns `false` if no file existed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` if the title has no safe file name
    /// and `StoreError::StorageUnavailable` if removal fails.
    pub async fn delete(&self, title: &str) -> Result<bool, StoreError> {
        let path = self.resolver.resolve(title)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(title, path = %path.display(), "note deleted");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }
}

/// Header of the file at `path`. A file that is not UTF-8 or whose header
/// does not parse counts as absent.
async fn read_header(path: &Path) -> Result<Option<Header>, StoreError> {
    match read_text(path).await {
        Ok(Some(raw)) => match split(&raw) {
            Ok((header, _)) => Ok(Some(header)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "existing header unreadable, treating note as new");
                Ok(None)
            }
        },
        Ok(None) => Ok(None),
        Err(StoreError::InvalidEncoding { .. }) => {
            warn!(path = %path.display(), "existing note is not UTF-8, treating note as new");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// The header `title`, falling back to the file stem.
fn stored_title(header: &Header, path: &Path) -> Option<String> {
    header
        .get_text(TITLE_KEY)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
}

async fn read_text(path: &Path) -> Result<Option<String>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => decode(bytes, path).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Converts file bytes to text, rejecting UTF-16 and stripping a UTF-8 BOM.
fn decode(bytes: Vec<u8>, path: &Path) -> Result<String, StoreError> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(StoreError::InvalidEncoding {
            path: path.into(),
            encoding: "UTF-16 LE detected (byte order mark FF FE); convert to UTF-8".into(),
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(StoreError::InvalidEncoding {
            path: path.into(),
            encoding: "UTF-16 BE detected (byte order mark FE FF); convert to UTF-8".into(),
        });
    }

    let content = String::from_utf8(bytes).map_err(|e| StoreError::InvalidEncoding {
        path: path.into(),
        encoding: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })?;

    match content.strip_prefix('\u{FEFF}') {
        Some(stripped) => Ok(stripped.to_string()),
        None => Ok(content),
    }
}

/// Writes `content` to a temporary sibling, then renames it over `path`.
async fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    let target = path.to_path_buf();
    let content = content.to_owned();
    tokio::task::spawn_blocking(move || write_and_persist(&target, content.as_bytes()))
        .await
        .map_err(|e| StoreError::io(path, io::Error::other(e)))?
}

fn write_and_persist(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let mut temp = NamedTempFile::new_in(parent).map_err(|e| StoreError::io(path, e))?;
    temp.write_all(content).map_err(|e| StoreError::io(path, e))?;
    temp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}
