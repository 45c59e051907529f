//! Directed graph of `[[Target]]` references between notes.

use crate::domain::{LinkEdge, Note, extract_links, is_valid_target};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Forward and reverse adjacency of note links, kept consistent as a pair.
///
/// For every pair of titles, `backlinks(t)` contains `s` exactly when
/// `outgoing(s)` contains `t`. Targets need not be existing notes.
#[derive(Debug, Default)]
pub struct LinkGraph {
    outgoing: HashMap<String, Vec<LinkEdge>>,
    incoming: HashMap<String, BTreeSet<String>>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the graph and records the links of every note.
    ///
    /// Returns the number of edges recorded.
    pub fn rebuild<'a>(&mut self, notes: impl IntoIterator<Item = &'a Note>) -> usize {
        self.outgoing.clear();
        self.incoming.clear();
        for note in notes {
            self.set_outgoing(note.title(), extract_links(note.body()));
        }
        self.edge_count()
    }

    /// Replaces every outgoing edge of `from`.
    ///
    /// Targets that are blank or carry path separators or `..` are dropped.
    /// Duplicate targets keep their first occurrence.
    pub fn set_outgoing(&mut self, from: &str, edges: impl IntoIterator<Item = LinkEdge>) {
        self.clear_outgoing(from);

        let mut seen = HashSet::new();
        let edges: Vec<LinkEdge> = edges
            .into_iter()
            .filter(|edge| is_valid_target(edge.target()))
            .filter(|edge| seen.insert(edge.target().to_string()))
            .collect();
        if edges.is_empty() {
            return;
        }

        for edge in &edges {
            self.incoming
                .entry(edge.target().to_string())
                .or_default()
                .insert(from.to_string());
        }
        self.outgoing.insert(from.to_string(), edges);
    }

    /// Removes `title` as a source and as a target of every edge.
    pub fn remove_all(&mut self, title: &str) {
        self.clear_outgoing(title);

        let Some(sources) = self.incoming.remove(title) else {
            return;
        };
        for source in sources {
            if let Some(edges) = self.outgoing.get_mut(&source) {
                edges.retain(|edge| edge.target() != title);
                if edges.is_empty() {
                    self.outgoing.remove(&source);
                }
            }
        }
    }

    /// Target titles `title` links to, in first-seen order.
    pub fn outgoing(&self, title: &str) -> Vec<String> {
        self.outgoing_edges(title)
            .iter()
            .map(|edge| edge.target().to_string())
            .collect()
    }

    /// Outgoing edges of `title`, labels included.
    pub fn outgoing_edges(&self, title: &str) -> &[LinkEdge] {
        self.outgoing.get(title).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Titles of notes linking to `title`, sorted.
    pub fn backlinks(&self, title: &str) -> Vec<String> {
        self.incoming
            .get(title)
            .map(|sources| sources.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(Vec::len).sum()
    }

    fn clear_outgoing(&mut self, from: &str) {
        let Some(old) = self.outgoing.remove(from) else {
            return;
        };
        for edge in old {
            if let Some(sources) = self.incoming.get_mut(edge.target()) {
                sources.remove(from);
                if sources.is_empty() {
                    self.incoming.remove(edge.target());
                }
            }
        }
    }
}
