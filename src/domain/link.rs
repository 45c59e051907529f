//! Inline cross-note references written as `[[Target]]` or `[[Target|Label]]`.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

static WIKILINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]|]+)(?:\|([^\[\]]*))?\]\]").expect("wikilink pattern is valid")
});

/// An outgoing reference from a note body to another note's title.
///
/// The target need not exist yet; links may point at notes that will be
/// created later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEdge {
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl LinkEdge {
    /// Creates an edge, returning `None` if the target is not a usable title.
    ///
    /// # Examples
    ///
    /// ```
    /// use quire::domain::LinkEdge;
    ///
    /// assert!(LinkEdge::new("Beta", None).is_some());
    /// assert!(LinkEdge::new("../etc/passwd", None).is_none());
    /// assert!(LinkEdge::new("   ", None).is_none());
    /// ```
    pub fn new(target: &str, label: Option<&str>) -> Option<Self> {
        let target = target.trim();
        if !is_valid_target(target) {
            return None;
        }
        let label = label.map(str::trim).filter(|l| !l.is_empty());
        Some(Self {
            target: target.to_string(),
            label: label.map(str::to_string),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the display label, if one was given.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Returns true if `target` can be recorded as a link target.
///
/// Empty targets and anything carrying a path separator or a `..`
/// traversal sequence are rejected.
pub fn is_valid_target(target: &str) -> bool {
    !target.trim().is_empty()
        && !target.contains(['/', '\\'])
        && !target.contains("..")
        && !target.chars().any(char::is_control)
}

/// Extracts outgoing links from a note body.
///
/// Invalid targets are dropped silently since they come from free text.
/// Each target appears once, keeping the first occurrence's label.
///
/// # Examples
///
/// ```
/// use quire::domain::extract_links;
///
/// let links = extract_links("See [[Beta]] and [[Gamma|the third]], again [[Beta]].");
/// let targets: Vec<_> = links.iter().map(|l| l.target()).collect();
/// assert_eq!(targets, ["Beta", "Gamma"]);
/// assert_eq!(links[1].label(), Some("the third"));
/// ```
pub fn extract_links(body: &str) -> Vec<LinkEdge> {
    let mut seen = HashSet::new();
    WIKILINK
        .captures_iter(body)
        .filter_map(|cap| {
            let target = cap.get(1)?.as_str();
            LinkEdge::new(target, cap.get(2).map(|m| m.as_str()))
        })
        .filter(|edge| seen.insert(edge.target.clone()))
        .collect()
}
