//! Header block parsing, serialization, and merging.
//!
//! A stored note looks like:
//!
//! ```text
//! ---
//! title: Note Title
//! createdAt: 2024-01-15 10:30
//! updatedAt: 2024-01-16 14:00
//! tags: [draft, rust]
//! ---
//! Body content here...
//! ```

use crate::domain::{CREATED_AT_KEY, Header, HeaderValue, TITLE_KEY, UPDATED_AT_KEY};
use chrono::{Local, NaiveDateTime};
use serde_yaml::Value;
use thiserror::Error;

/// Marker line that opens and closes the header block.
pub const DELIMITER: &str = "---";

/// Format of `createdAt`/`updatedAt`.
///
/// Timestamps are local wall-clock time with no zone recorded, so a note
/// written in one timezone and read in another cannot be mapped back to an
/// exact instant. This is a known limitation of the file format.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Errors while parsing a header block.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing closing header delimiter '---'")]
    MissingClosingDelimiter,

    #[error("invalid YAML in header: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

/// Returns the current local time, the clock used for header timestamps.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM`.
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD HH:MM` timestamp.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok()
}

/// Splits raw note text into its header and body.
///
/// Text that does not open with a `---` line has no header: the result is
/// an empty header and the whole text as body.
///
/// # Errors
///
/// Returns `ParseError` if:
/// - The header block is opened but never closed
/// - The YAML between delimiters is invalid
/// - A value is a nested mapping, or a list holds non-scalar items
pub fn split(raw: &str) -> Result<(Header, &str), ParseError> {
    match split_raw(raw)? {
        None => Ok((Header::new(), raw)),
        Some((yaml, body)) => Ok((parse_header(yaml)?, body)),
    }
}

/// Returns the body of `raw` without parsing its header.
///
/// Unterminated header blocks are treated as body text.
pub fn body_of(raw: &str) -> &str {
    match split_raw(raw) {
        Ok(Some((_, body))) => body,
        _ => raw,
    }
}

/// Serializes a header and body into stored note text.
///
/// Reserved keys come first (`title`, `createdAt`, `updatedAt`), then the
/// remaining keys in sorted order. Lists are written inline as `[a, b]`.
///
/// # Examples
///
/// ```
/// use quire::domain::Header;
/// use quire::infra::join;
///
/// let mut header = Header::new();
/// header.insert("tags", vec!["a", "b"]);
/// assert_eq!(join(&header, "body"), "---\ntags: [a, b]\n---\nbody");
/// ```
pub fn join(header: &Header, body: &str) -> String {
    let reserved = [TITLE_KEY, CREATED_AT_KEY, UPDATED_AT_KEY]
        .into_iter()
        .filter_map(|key| header.get(key).map(|value| (key, value)));
    let rest = header
        .iter()
        .filter(|(key, _)| !crate::domain::is_reserved(key));

    let mut out = String::with_capacity(body.len() + 64);
    out.push_str(DELIMITER);
    out.push('\n');
    for (key, value) in reserved.chain(rest) {
        out.push_str(&format_scalar(key, false));
        out.push_str(": ");
        out.push_str(&format_value(value));
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(body);
    out
}

/// Builds the header to store for a write.
///
/// - Reserved keys in `incoming` are discarded.
/// - `createdAt` is kept from `existing` when present, else set to `now`.
/// - `updatedAt` is always `now`; `title` is always `title`.
/// - Other incoming keys pass through. Existing non-reserved keys absent
///   from `incoming` are dropped: a write replaces, it does not patch.
pub fn merge(
    existing: Option<&Header>,
    incoming: Header,
    title: &str,
    now: &NaiveDateTime,
) -> Header {
    let now = format_timestamp(now);
    let created_at = existing
        .and_then(|h| h.get_text(CREATED_AT_KEY))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| now.clone());

    let mut merged = incoming.without_reserved();
    merged.insert(TITLE_KEY, title);
    merged.insert(CREATED_AT_KEY, created_at);
    merged.insert(UPDATED_AT_KEY, now);
    merged
}

/// Locates the header YAML and body, or `None` if there is no header block.
fn split_raw(raw: &str) -> Result<Option<(&str, &str)>, ParseError> {
    let after_opening = if raw.starts_with("---\r\n") {
        5
    } else if raw.starts_with("---\n") {
        4
    } else if raw == DELIMITER {
        return Err(ParseError::MissingClosingDelimiter);
    } else {
        return Ok(None);
    };

    let yaml_and_rest = &raw[after_opening..];
    let closing_pos = find_closing_delimiter(yaml_and_rest)?;
    let yaml = &yaml_and_rest[..closing_pos];

    let after_closing = &yaml_and_rest[closing_pos..];
    let body = if let Some(body) = after_closing.strip_prefix("---\r\n") {
        body
    } else if let Some(body) = after_closing.strip_prefix("---\n") {
        body
    } else {
        ""
    };

    Ok(Some((yaml, body)))
}

/// Finds the position of the closing `---` delimiter.
///
/// The closing delimiter must start a line and be followed by a newline
/// or EOF.
fn find_closing_delimiter(content: &str) -> Result<usize, ParseError> {
    let bytes = content.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if content[pos..].starts_with(DELIMITER) {
            let after = pos + DELIMITER.len();
            if after >= bytes.len()
                || bytes[after] == b'\n'
                || (bytes[after] == b'\r' && bytes.get(after + 1) == Some(&b'\n'))
            {
                return Ok(pos);
            }
        }

        match content[pos..].find('\n') {
            Some(newline_offset) => pos += newline_offset + 1,
            None => break,
        }
    }

    Err(ParseError::MissingClosingDelimiter)
}

fn parse_header(yaml: &str) -> Result<Header, ParseError> {
    if yaml.trim().is_empty() {
        return Ok(Header::new());
    }
    let mapping = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Null => return Ok(Header::new()),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(ParseError::InvalidHeader(
                "expected key: value pairs".to_string(),
            ));
        }
    };

    let mut header = Header::new();
    for (key, value) in mapping {
        let key = scalar_to_string(key)
            .ok_or_else(|| ParseError::InvalidHeader("keys must be plain scalars".to_string()))?;
        let value = match value {
            Value::Sequence(items) => HeaderValue::List(
                items
                    .into_iter()
                    .map(scalar_to_string)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| {
                        ParseError::InvalidHeader(format!("list '{}' must hold only scalars", key))
                    })?,
            ),
            other => HeaderValue::Text(scalar_to_string(other).ok_or_else(|| {
                ParseError::InvalidHeader(format!("value of '{}' must be text or a list", key))
            })?),
        };
        header.insert(key, value);
    }
    Ok(header)
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

fn format_value(value: &HeaderValue) -> String {
    match value {
        HeaderValue::Text(s) => format_scalar(s, false),
        HeaderValue::List(items) => {
            let items: Vec<String> = items.iter().map(|s| format_scalar(s, true)).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

/// Writes `s` plain when YAML reads it back unchanged, else double-quoted.
fn format_scalar(s: &str, in_list: bool) -> String {
    if reads_back_plain(s, in_list) {
        s.to_string()
    } else {
        // A JSON string literal is a valid YAML double-quoted scalar.
        serde_json::to_string(s).unwrap_or_else(|_| format!("{:?}", s))
    }
}

fn reads_back_plain(s: &str, in_list: bool) -> bool {
    if s.is_empty() || s.trim() != s || s.contains(['\n', '\r', '"', '\'', ',', '[', ']', '{', '}'])
    {
        return false;
    }
    if in_list && s.contains(':') {
        return false;
    }
    matches!(serde_yaml::from_str::<Value>(s), Ok(Value::String(parsed)) if parsed == s)
}
