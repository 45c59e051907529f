//! Full-text search over note titles and bodies, on an in-RAM tantivy index.
//!
//! Each query token is matched against both fields four ways:
//! - exact term, scored by BM25
//! - prefix (`grav` matches `gravity`)
//! - substring, for tokens of three or more characters
//! - fuzzy, by edit distance (one edit for 3-5 characters, two for 6+)
//!
//! Prefix, substring and fuzzy clauses contribute a constant weight, so a
//! term that matches more strictly also matches every looser way and
//! accumulates more. Query tokens combine with OR.
//!
//! Title clauses are boosted, and any note matching a query token in its
//! title sorts ahead of every body-only match. Ties break by title.

use crate::domain::Note;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use tantivy::collector::{Count, DocSetCollector, TopDocs};
use tantivy::query::{
    BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, RegexQuery, TermQuery,
};
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer};
use tantivy::{
    DocAddress, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, TantivyError,
    Term, doc,
};
use thiserror::Error;

const TOKENIZER: &str = "quire_words";
const WRITER_MEMORY_BYTES: usize = 20_000_000;

const TITLE_BOOST: f32 = 3.0;
const BODY_BOOST: f32 = 1.0;

const EXACT_WEIGHT: f32 = 1.0;
const PREFIX_WEIGHT: f32 = 0.8;
const SUBSTRING_WEIGHT: f32 = 0.5;
const FUZZY_WEIGHT: f32 = 0.4;

const MIN_SUBSTRING_LENGTH: usize = 3;

/// Failure inside the search engine.
#[derive(Debug, Error)]
#[error("search index failure: {0}")]
pub struct SearchError(#[from] TantivyError);

/// A search result with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub note: Note,
    pub score: f64,
}

#[derive(Clone, Copy)]
struct Fields {
    key: Field,
    title: Field,
    body: Field,
    raw: Field,
}

/// Incremental full-text index keyed by note title.
///
/// The index lives in RAM and is not persisted. It starts uninitialized,
/// answering every query with no results, until `rebuild` loads the full
/// note collection. Every mutation commits before returning, so a search
/// issued afterwards sees it.
pub struct SearchIndex {
    reader: IndexReader,
    writer: IndexWriter,
    fields: Fields,
    initialized: bool,
}

impl fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIndex")
            .field("initialized", &self.initialized)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl SearchIndex {
    /// Creates an empty, uninitialized index.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` if tantivy cannot allocate the writer or reader.
    pub fn new() -> Result<Self, SearchError> {
        let mut builder = Schema::builder();
        let text = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );
        let fields = Fields {
            key: builder.add_text_field("key", STRING | STORED),
            title: builder.add_text_field("title", text.clone()),
            body: builder.add_text_field("body", text),
            raw: builder.add_text_field("raw", STORED),
        };

        let index = Index::create_in_ram(builder.build());
        index.tokenizers().register(
            TOKENIZER,
            TextAnalyzer::builder(SimpleTokenizer::default())
                .filter(LowerCaser)
                .build(),
        );

        let writer = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            reader,
            writer,
            fields,
            initialized: false,
        })
    }

    /// Returns true once `rebuild` has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of indexed notes.
    pub fn len(&self) -> usize {
        self.reader.searcher().num_docs() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, title: &str) -> Result<bool, SearchError> {
        let query = TermQuery::new(self.key_term(title), IndexRecordOption::Basic);
        Ok(self.reader.searcher().search(&query, &Count)? > 0)
    }

    /// Clears the index and indexes `notes`, marking it initialized.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` if the batch cannot be committed. The index
    /// keeps its previous contents and state in that case.
    pub fn rebuild(&mut self, notes: impl IntoIterator<Item = Note>) -> Result<(), SearchError> {
        if let Err(e) = self.replace_all(notes) {
            self.writer.rollback()?;
            return Err(e);
        }
        self.initialized = true;
        Ok(())
    }

    /// Indexes a note, replacing any entry with the same title.
    pub fn add(&mut self, note: &Note) -> Result<(), SearchError> {
        self.writer.delete_term(self.key_term(note.title()));
        self.writer.add_document(self.document(note))?;
        self.commit()
    }

    /// Drops a note from the index. Returns false if it was not indexed.
    pub fn remove(&mut self, title: &str) -> Result<bool, SearchError> {
        if !self.contains(title)? {
            return Ok(false);
        }
        self.writer.delete_term(self.key_term(title));
        self.commit()?;
        Ok(true)
    }

    /// Re-indexes a note. Works whether or not it was indexed before.
    pub fn update(&mut self, note: &Note) -> Result<(), SearchError> {
        self.add(note)
    }

    /// Returns notes matching `query`, most relevant first.
    ///
    /// Empty or whitespace-only queries, and any query against an
    /// uninitialized index, return no results. Callers wanting every note
    /// for an empty query should list the store instead.
    pub fn search(&self, query: &str) -> Result<Vec<Note>, SearchError> {
        Ok(self
            .search_scored(query)?
            .into_iter()
            .map(|hit| hit.note)
            .collect())
    }

    /// Like `search`, keeping each result's score.
    pub fn search_scored(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        if !self.initialized {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let tokens: Vec<String> = tokenize(query).filter(|t| seen.insert(t.clone())).collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let doc_count = searcher.num_docs() as usize;
        if doc_count == 0 {
            return Ok(Vec::new());
        }

        let title_query = self.field_query(self.fields.title, TITLE_BOOST, &tokens)?;
        let body_query = self.field_query(self.fields.body, BODY_BOOST, &tokens)?;
        let in_title: HashSet<DocAddress> = searcher.search(&title_query, &DocSetCollector)?;
        let combined = BooleanQuery::new(vec![
            (Occur::Should, Box::new(title_query) as Box<dyn Query>),
            (Occur::Should, Box::new(body_query)),
        ]);

        let mut ranked = Vec::new();
        for (score, address) in searcher.search(&combined, &TopDocs::with_limit(doc_count))? {
            let doc: TantivyDocument = searcher.doc(address)?;
            let title = doc.get_first(self.fields.key).and_then(|v| v.as_str());
            let raw = doc.get_first(self.fields.raw).and_then(|v| v.as_str());
            if let (Some(title), Some(raw)) = (title, raw) {
                let hit = SearchHit {
                    note: Note::new(title, raw),
                    score: f64::from(score),
                };
                ranked.push((in_title.contains(&address), hit));
            }
        }

        ranked.sort_by(|(a_title, a), (b_title, b)| {
            b_title
                .cmp(a_title)
                .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
                .then_with(|| a.note.title().cmp(b.note.title()))
        });
        Ok(ranked.into_iter().map(|(_, hit)| hit).collect())
    }

    /// OR of every match clause for `tokens` against one field.
    fn field_query(
        &self,
        field: Field,
        boost: f32,
        tokens: &[String],
    ) -> Result<BooleanQuery, SearchError> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for token in tokens {
            let term = Term::from_field_text(field, token);
            let len = token.chars().count();

            let mut matchers: Vec<(f32, Box<dyn Query>)> = vec![
                (
                    EXACT_WEIGHT,
                    Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs)),
                ),
                (
                    PREFIX_WEIGHT,
                    Box::new(FuzzyTermQuery::new_prefix(term.clone(), 0, true)),
                ),
            ];
            if len >= MIN_SUBSTRING_LENGTH {
                let pattern = format!(".*{}.*", regex::escape(token));
                matchers.push((
                    SUBSTRING_WEIGHT,
                    Box::new(RegexQuery::from_pattern(&pattern, field)?),
                ));
            }
            let edits = max_edits(len);
            if edits > 0 {
                matchers.push((FUZZY_WEIGHT, Box::new(FuzzyTermQuery::new(term, edits, true))));
            }

            for (weight, query) in matchers {
                clauses.push((
                    Occur::Should,
                    Box::new(BoostQuery::new(query, weight * boost)),
                ));
            }
        }
        Ok(BooleanQuery::new(clauses))
    }

    fn replace_all(&mut self, notes: impl IntoIterator<Item = Note>) -> Result<(), SearchError> {
        self.writer.delete_all_documents()?;
        for note in notes {
            self.writer.delete_term(self.key_term(note.title()));
            self.writer.add_document(self.document(&note))?;
        }
        self.commit()
    }

    fn document(&self, note: &Note) -> TantivyDocument {
        doc!(
            self.fields.key => note.title(),
            self.fields.title => note.title(),
            self.fields.body => note.body(),
            self.fields.raw => note.raw_text()
        )
    }

    fn key_term(&self, title: &str) -> Term {
        Term::from_field_text(self.fields.key, title)
    }

    fn commit(&mut self) -> Result<(), SearchError> {
        self.writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }
}

/// Splits text into lowercase alphanumeric tokens, the same way the index
/// tokenizes titles and bodies.
///
/// # Examples
///
/// ```
/// use quire::index::tokenize;
///
/// let tokens: Vec<String> = tokenize("Hello, World! It's v2").collect();
/// assert_eq!(tokens, ["hello", "world", "it", "s", "v2"]);
/// ```
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Edits tolerated for a query token of `len` characters.
fn max_edits(len: usize) -> u8 {
    match len {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}
