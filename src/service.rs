//! Note Service: the composed API over the store and its derived indexes.
//!
//! Every mutation writes the Note Store first. Only when that succeeds are
//! the search index and link graph updated, using the exact text now on
//! disk. Reads of single notes go to the store; searches and link queries
//! never touch the disk.
//!
//! Writes to the same file are serialized by a per-file lock, so the three
//! stores always reflect the same caller's write for that file. Titles that
//! sanitize to one file name share it: a write purges the title it displaced
//! from the derived stores, and a removal purges whichever title the file
//! held. Writes to different files do not contend.
//!
//! There is no cross-store transaction: if the search index rejects an
//! update after the disk write, the call fails and the stores disagree
//! until `reindex` runs.

use crate::domain::{LinkEdge, Note, extract_links};
use crate::index::{LinkGraph, SearchError, SearchHit, SearchIndex};
use crate::infra::{ErrorKind, InvalidPath, NoteStore, StoreError, sanitize_title};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

/// Errors from Note Service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Store(e) => e.kind(),
            ServiceError::Search(_) => ErrorKind::IndexUnavailable,
        }
    }
}

/// Counts from a full rebuild of the derived stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RebuildStats {
    pub notes: usize,
    pub edges: usize,
}

/// Orchestrates the Note Store, Search Index and Link Graph.
///
/// Construct one per notes root with `open`; share it behind an `Arc`.
/// Dropping it discards the in-memory indexes.
#[derive(Debug)]
pub struct NoteService {
    store: NoteStore,
    index: RwLock<SearchIndex>,
    graph: RwLock<LinkGraph>,
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl NoteService {
    /// Opens the notes root, creating it if needed, and builds both indexes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageUnavailable` if the root cannot be created
    /// or listed, and `ServiceError::Search` if the index cannot be built.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let store = NoteStore::open(root).await?;
        let service = Self::with_store(store)?;
        service.reindex().await?;
        Ok(service)
    }

    /// Wraps a store without indexing it. Searches return nothing until
    /// `reindex` runs.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Search` if the search index cannot be created.
    pub fn with_store(store: NoteStore) -> Result<Self, ServiceError> {
        Ok(Self {
            store,
            index: RwLock::new(SearchIndex::new()?),
            graph: RwLock::new(LinkGraph::new()),
            write_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    /// File a title is stored in.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the title has no safe file name.
    pub fn path_for(&self, title: &str) -> Result<PathBuf, InvalidPath> {
        self.store.path_for(title)
    }

    /// Rebuilds the search index and link graph from every stored note.
    ///
    /// Runs at startup, and on demand to reconcile the derived stores
    /// with the disk.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageUnavailable` if the store cannot be listed
    /// and `ServiceError::Search` if the index rejects the batch. The derived
    /// stores are left untouched in either case.
    pub async fn reindex(&self) -> Result<RebuildStats, ServiceError> {
        self.store.ensure_ready().await?;
        let notes = self.store.list().await?;

        let mut graph = self.graph.write().await;
        let mut index = self.index.write().await;
        index.rebuild(notes.iter().cloned())?;
        let edges = graph.rebuild(&notes);
        let count = notes.len();

        let stats = RebuildStats {
            notes: count,
            edges,
        };
        info!(notes = stats.notes, edges = stats.edges, root = %self.root().display(), "indexes rebuilt");
        Ok(stats)
    }

    /// Creates or replaces a note and returns it as stored.
    ///
    /// `raw` is an optional `---` header block followed by the body.
    /// Reserved header keys in `raw` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` if the title has no safe file name,
    /// `StoreError::InvalidHeader` if `raw` has a malformed header block, and
    /// `StoreError::StorageUnavailable` if the write fails. The derived
    /// stores are only updated after the write succeeds.
    pub async fn put(&self, title: &str, raw: &str) -> Result<Note, ServiceError> {
        let _guard = self.lock_title(title).await;

        let written = self.store.put(&Note::new(title, raw)).await?;
        let note = Note::new(title, written.text);

        let links = extract_links(note.body());
        let link_count = links.len();
        {
            let mut graph = self.graph.write().await;
            if let Some(displaced) = &written.displaced {
                graph.remove_all(displaced);
            }
            graph.set_outgoing(title, links);
        }
        {
            let mut index = self.index.write().await;
            if let Some(displaced) = &written.displaced {
                index.remove(displaced)?;
            }
            index.update(&note)?;
        }

        debug!(title, links = link_count, displaced = ?written.displaced, "derived stores updated");
        Ok(note)
    }

    /// Reads a note from disk. `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` for titles with no safe file name and
    /// `StoreError::StorageUnavailable` or `StoreError::InvalidEncoding` if
    /// the file cannot be read.
    pub async fn read(&self, title: &str) -> Result<Option<Note>, ServiceError> {
        Ok(self.store.get(title).await?)
    }

    /// Deletes a note and purges it from both derived stores.
    ///
    /// Returns whether a file existed. The purge runs either way, and also
    /// covers a different title that last wrote the same file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` for titles with no safe file name and
    /// `StoreError::StorageUnavailable` if the file cannot be removed.
    pub async fn remove(&self, title: &str) -> Result<bool, ServiceError> {
        let _guard = self.lock_title(title).await;

        let occupant = self
            .store
            .occupant(title)
            .await?
            .filter(|stored| stored != title);
        let existed = self.store.delete(title).await?;

        let mut purged = vec![title];
        purged.extend(occupant.as_deref());
        {
            let mut graph = self.graph.write().await;
            for stale in &purged {
                graph.remove_all(stale);
            }
        }
        {
            let mut index = self.index.write().await;
            for stale in &purged {
                index.remove(stale)?;
            }
        }

        debug!(title, existed, occupant = ?occupant, "note removed");
        Ok(existed)
    }

    /// Searches the index, most relevant first.
    ///
    /// An empty query returns nothing; use `list` for every note.
    pub async fn find(&self, query: &str) -> Result<Vec<Note>, ServiceError> {
        Ok(self.index.read().await.search(query)?)
    }

    /// Like `find`, keeping scores.
    pub async fn find_scored(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError> {
        Ok(self.index.read().await.search_scored(query)?)
    }

    /// Lists every note on disk.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageUnavailable` if the root cannot be listed.
    pub async fn list(&self) -> Result<Vec<Note>, ServiceError> {
        Ok(self.store.list().await?)
    }

    /// Titles `title` links to.
    pub async fn outgoing(&self, title: &str) -> Vec<String> {
        self.graph.read().await.outgoing(title)
    }

    /// Outgoing edges of `title` with their labels.
    pub async fn outgoing_edges(&self, title: &str) -> Vec<LinkEdge> {
        self.graph.read().await.outgoing_edges(title).to_vec()
    }

    /// Titles of notes linking to `title`.
    pub async fn backlinks(&self, title: &str) -> Vec<String> {
        self.graph.read().await.backlinks(title)
    }

    /// Serializes writers that map to the same file.
    ///
    /// Keyed by sanitized title so distinct titles sharing a file also
    /// serialize. Idle entries are pruned on each acquisition.
    async fn lock_title(&self, title: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.write_locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(sanitize_title(title)).or_default().clone()
        };
        lock.lock_owned().await
    }
}
