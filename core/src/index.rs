use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{IndexError, Result};
use crate::filter::{TermFilter, Verdict};
use crate::tokenizer::{stem, Tokenizer};

pub type TermId = u32;
pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub path: PathBuf,
}

/// One dictionary entry. `docs` always equals `postings.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: TermId,
    pub docs: u32,
    /// doc id -> occurrences of this term in that doc
    pub postings: BTreeMap<DocId, u32>,
}

impl Term {
    fn new(id: TermId) -> Self {
        Self { id, docs: 0, postings: BTreeMap::new() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub documents: u32,
    pub tokens: u64,
    pub terms: u32,
    pub stopwords: u64,
}

/// Everything one indexing run accumulates: documents, the term dictionary
/// and the corpus counters.
#[derive(Debug, Default)]
pub struct IndexState {
    documents: Vec<Document>,
    dictionary: HashMap<String, Term>,
    counters: Counters,
}

impl IndexState {
    pub fn new() -> Self { Self::default() }

    pub fn counters(&self) -> Counters { self.counters }

    /// N, the idf normalizer.
    pub fn num_documents(&self) -> u32 { self.counters.documents }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    pub fn documents(&self) -> &[Document] { &self.documents }

    pub fn term(&self, stemmed: &str) -> Option<&Term> { self.dictionary.get(stemmed) }

    /// Terms in first-seen order.
    pub fn terms_by_id(&self) -> Vec<(&str, &Term)> {
        let mut terms: Vec<_> = self.dictionary.iter().map(|(k, t)| (k.as_str(), t)).collect();
        terms.sort_by_key(|(_, t)| t.id);
        terms
    }

    pub fn check_invariants(&self) -> Result<()> {
        for (text, term) in &self.dictionary {
            if term.docs as usize != term.postings.len() {
                return Err(IndexError::Invariant(format!(
                    "term {text:?} has docs={} but {} postings",
                    term.docs,
                    term.postings.len()
                )));
            }
        }
        if self.dictionary.len() != self.counters.terms as usize {
            return Err(IndexError::Invariant(format!(
                "dictionary holds {} terms, counter says {}",
                self.dictionary.len(),
                self.counters.terms
            )));
        }
        Ok(())
    }
}

/// Owns the dictionary for the length of one run and feeds it from text.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    state: IndexState,
    tokenizer: Tokenizer,
    filter: TermFilter,
}

impl IndexBuilder {
    pub fn new(tokenizer: Tokenizer, filter: TermFilter) -> Self {
        Self { state: IndexState::new(), tokenizer, filter }
    }

    pub fn state(&self) -> &IndexState { &self.state }

    pub fn finish(self) -> IndexState { self.state }

    pub fn new_document(&mut self, path: impl AsRef<Path>) -> DocId {
        self.state.counters.documents += 1;
        let id = self.state.counters.documents;
        self.state.documents.push(Document { id, path: path.as_ref().to_path_buf() });
        id
    }

    /// Count one occurrence of `stemmed` in `doc_id`.
    pub fn record(&mut self, stemmed: &str, doc_id: DocId) {
        let counters = &mut self.state.counters;
        let term = self.state.dictionary.entry(stemmed.to_string()).or_insert_with(|| {
            counters.terms += 1;
            Term::new(counters.terms)
        });
        let tf = match term.postings.entry(doc_id) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                term.docs += 1;
                slot.insert(0)
            }
        };
        *tf += 1;
        counters.tokens += 1;
    }

    /// Run one line through split, filter and stem. Returns accepted tokens.
    pub fn ingest_line(&mut self, doc_id: DocId, line: &str) -> u64 {
        let mut accepted = 0;
        for raw in self.tokenizer.split(line) {
            if self.filter.matches_stopword(&raw) {
                self.state.counters.stopwords += 1;
            }
            if let Verdict::Accepted(token) = self.filter.check(&raw) {
                self.record(&stem(&token), doc_id);
                accepted += 1;
            }
        }
        accepted
    }

    pub fn ingest_text(&mut self, doc_id: DocId, text: &str) -> u64 {
        text.lines().map(|line| self.ingest_line(doc_id, line)).sum()
    }
}
