//! Builder for hand-written note files.

use quire::domain::{CREATED_AT_KEY, Header, HeaderValue, TITLE_KEY, UPDATED_AT_KEY};
use quire::infra::join;

/// Fixed timestamp so file contents are deterministic.
pub const FIXED_TIMESTAMP: &str = "2024-01-15 10:30";

/// Builder for note files as they would appear on disk.
///
/// Produces the full stored text, reserved fields included, so tests
/// can seed a notes directory without going through the binary.
#[derive(Debug)]
pub struct TestNote {
    title: String,
    header: Header,
    body: String,
}

impl TestNote {
    /// Creates a new test note with the given title and fixed timestamps.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let header: Header = [
            (TITLE_KEY, HeaderValue::from(title.as_str())),
            (CREATED_AT_KEY, HeaderValue::from(FIXED_TIMESTAMP)),
            (UPDATED_AT_KEY, HeaderValue::from(FIXED_TIMESTAMP)),
        ]
        .into_iter()
        .collect();
        Self {
            title,
            header,
            body: String::new(),
        }
    }

    /// Sets a header field.
    pub fn field(mut self, key: &str, value: impl Into<HeaderValue>) -> Self {
        self.header.insert(key, value);
        self
    }

    /// Sets the `updatedAt` timestamp.
    pub fn updated(self, at: &str) -> Self {
        self.field(UPDATED_AT_KEY, at)
    }

    /// Sets the body content.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the full text as stored on disk.
    pub fn to_raw(&self) -> String {
        join(&self.header, &self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // TestNote Builder
    // ===========================================

    #[test]
    fn test_note_has_reserved_fields() {
        let raw = TestNote::new("My Test Note").to_raw();
        assert!(raw.starts_with("---\ntitle: My Test Note\n"));
        assert!(raw.contains(&format!("createdAt: {FIXED_TIMESTAMP}")));
    }

    #[test]
    fn test_note_builder_fluent() {
        let raw = TestNote::new("Architecture")
            .field("tags", vec!["adr", "rust"])
            .body("We chose [[Rust]].")
            .to_raw();

        assert!(raw.contains("tags: [adr, rust]\n"));
        assert!(raw.ends_with("---\nWe chose [[Rust]]."));
    }
}
