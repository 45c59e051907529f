//! Header map stored at the top of every note file.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Header key holding the note's title.
pub const TITLE_KEY: &str = "title";

/// Header key holding the first-write timestamp.
pub const CREATED_AT_KEY: &str = "createdAt";

/// Header key holding the last-write timestamp.
pub const UPDATED_AT_KEY: &str = "updatedAt";

/// Keys managed by the store. Callers cannot set these.
pub const RESERVED_KEYS: [&str; 3] = [TITLE_KEY, CREATED_AT_KEY, UPDATED_AT_KEY];

/// Returns true if `key` is managed by the store.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// A single header value: plain text or an inline list.
///
/// # Examples
///
/// ```
/// use quire::domain::HeaderValue;
///
/// let tags = HeaderValue::from(vec!["a", "b"]);
/// assert_eq!(tags.as_list(), Some(&["a".to_string(), "b".to_string()][..]));
/// assert_eq!(HeaderValue::from("draft").as_text(), Some("draft"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Text(String),
    List(Vec<String>),
}

impl HeaderValue {
    /// Returns the text, if this is a scalar value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(s) => Some(s),
            HeaderValue::List(_) => None,
        }
    }

    /// Returns the items, if this is a list value.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            HeaderValue::Text(_) => None,
            HeaderValue::List(items) => Some(items),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(s: &str) -> Self {
        HeaderValue::Text(s.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(s: String) -> Self {
        HeaderValue::Text(s)
    }
}

impl<S: Into<String>> From<Vec<S>> for HeaderValue {
    fn from(items: Vec<S>) -> Self {
        HeaderValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Text(s) => write!(f, "{}", s),
            HeaderValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Key/value metadata of a note. Key order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Header(BTreeMap<String, HeaderValue>);

impl Header {
    /// Creates an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.0.get(key)
    }

    /// Returns the value for `key` if it is plain text.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_text)
    }

    /// Inserts a value, returning the previous one for that key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<HeaderValue>,
    ) -> Option<HeaderValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<HeaderValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drops every reserved key.
    pub fn without_reserved(mut self) -> Self {
        self.0.retain(|k, _| !is_reserved(k));
        self
    }
}

impl<K: Into<String>, V: Into<HeaderValue>> FromIterator<(K, V)> for Header {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
