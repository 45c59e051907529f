//! Maps note titles to file locations inside the notes root.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Extension of every note file.
pub const NOTE_EXTENSION: &str = "md";

/// Longest file stem produced by `sanitize_title`, in bytes.
const MAX_STEM_LENGTH: usize = 200;

/// A title whose sanitized form does not name a file inside the notes root.
#[derive(Debug, Clone, Error)]
#[error("title '{title}' does not resolve to a file inside {}", .root.display())]
pub struct InvalidPath {
    pub title: String,
    pub root: PathBuf,
}

/// Strips a title down to characters that are safe in a file name.
///
/// - Keeps ASCII letters, ASCII digits, ASCII whitespace, `-` and `_`
/// - Drops everything else, including `.`, `/`, `\` and non-ASCII
/// - Truncates to 200 bytes
///
/// The result is deterministic and idempotent, so the same unsafe title
/// always addresses the same file.
///
/// # Examples
///
/// ```
/// use quire::infra::sanitize_title;
///
/// assert_eq!(sanitize_title("../../etc/passwd"), "etcpasswd");
/// assert_eq!(sanitize_title("My Note_2"), "My Note_2");
/// assert_eq!(sanitize_title(&sanitize_title("a/b?c")), "abc");
/// ```
pub fn sanitize_title(title: &str) -> String {
    let mut stem: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || *c == '-' || *c == '_')
        .collect();
    stem.truncate(MAX_STEM_LENGTH);
    stem
}

/// Resolves titles to paths under a fixed root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Creates a resolver for `root`.
    ///
    /// Callers should pass a canonical root (see `NoteStore::ensure_ready`)
    /// so that the containment check compares like with like.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file path for `title`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the sanitized title is blank or the
    /// candidate path is not a direct child of the root.
    pub fn resolve(&self, title: &str) -> Result<PathBuf, InvalidPath> {
        let stem = sanitize_title(title);
        let invalid = || InvalidPath {
            title: title.to_string(),
            root: self.root.clone(),
        };

        if stem.trim().is_empty() {
            return Err(invalid());
        }

        let candidate = self.root.join(format!("{}.{}", stem, NOTE_EXTENSION));
        if !is_direct_child(&self.root, &candidate) {
            return Err(invalid());
        }
        Ok(candidate)
    }

    /// Returns true if `path` looks like a note file directly under the root.
    pub fn is_note_file(&self, path: &Path) -> bool {
        is_direct_child(&self.root, path)
            && path.extension().is_some_and(|e| e == NOTE_EXTENSION)
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with('.'))
    }
}

fn is_direct_child(root: &Path, candidate: &Path) -> bool {
    let Ok(relative) = candidate.strip_prefix(root) else {
        return false;
    };
    let mut components = relative.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
