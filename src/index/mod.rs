//! Derived in-memory stores: full-text search and the link graph

mod graph;
mod search;

pub use graph::LinkGraph;
pub use search::{SearchError, SearchHit, SearchIndex, tokenize};
