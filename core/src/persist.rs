use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sled::transaction::TransactionResult;
use sled::{Batch, Db, Transactional, Tree};
use std::path::Path;

use crate::error::{IndexError, Result};
use crate::{DocId, TermId};

const DOCUMENTS_TREE: &str = "DocumentDictionary";
const TERMS_TREE: &str = "TermDictionary";
const POSTINGS_TREE: &str = "Posting";
const POSTINGS_BY_DOC_TREE: &str = "PostingByDocument";
const META_TREE: &str = "Meta";
const META_KEY: &[u8] = b"meta";

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRow {
    pub document_name: String,
    pub doc_id: DocId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRow {
    pub term: String,
    pub term_id: TermId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingRow {
    pub term_id: TermId,
    pub doc_id: DocId,
    /// idf of the term, or tf * idf depending on the weighting mode
    pub tfidf: f64,
    pub docfreq: u32,
    pub termfreq: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub num_tokens: u64,
    pub stopwords_found: u64,
    pub created_at: String,
    pub version: u32,
}

/// Destination for a finished run. Nothing recorded is visible to readers
/// until `commit` succeeds.
pub trait IndexSink {
    /// Drop anything recorded but not yet committed.
    fn begin(&mut self) -> Result<()> { Ok(()) }
    fn record_document(&mut self, path: &str, doc_id: DocId) -> Result<()>;
    fn record_term(&mut self, term: &str, term_id: TermId) -> Result<()>;
    fn record_posting(&mut self, posting: &PostingRow) -> Result<()>;
    fn record_meta(&mut self, _meta: &MetaFile) -> Result<()> { Ok(()) }
    fn commit(&mut self) -> Result<()>;
}

/// Collects rows in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub documents: Vec<DocumentRow>,
    pub terms: Vec<TermRow>,
    pub postings: Vec<PostingRow>,
    pub meta: Option<MetaFile>,
    pub committed: bool,
}

impl MemorySink {
    pub fn new() -> Self { Self::default() }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.terms.iter().find(|t| t.term == term).map(|t| t.term_id)
    }

    pub fn postings_for_term(&self, term_id: TermId) -> Vec<&PostingRow> {
        self.postings.iter().filter(|p| p.term_id == term_id).collect()
    }
}

impl IndexSink for MemorySink {
    fn begin(&mut self) -> Result<()> {
        *self = Self::default();
        Ok(())
    }

    fn record_document(&mut self, path: &str, doc_id: DocId) -> Result<()> {
        self.documents.push(DocumentRow { document_name: path.to_string(), doc_id });
        Ok(())
    }

    fn record_term(&mut self, term: &str, term_id: TermId) -> Result<()> {
        self.terms.push(TermRow { term: term.to_string(), term_id });
        Ok(())
    }

    fn record_posting(&mut self, posting: &PostingRow) -> Result<()> {
        self.postings.push(posting.clone());
        Ok(())
    }

    fn record_meta(&mut self, meta: &MetaFile) -> Result<()> {
        self.meta = Some(meta.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.committed = true;
        Ok(())
    }
}

type Entry = (Vec<u8>, Vec<u8>);

/// Three sled trees standing in for the DocumentDictionary, TermDictionary
/// and Posting tables. Rows are bincode encoded and keyed by big-endian ids.
/// `PostingByDocument` holds empty values under `doc_id ++ term_id` keys so
/// postings can be found from either side.
pub struct SledStore {
    db: Db,
    documents: Tree,
    terms: Tree,
    postings: Tree,
    by_document: Tree,
    meta: Tree,
    pending_documents: Vec<Entry>,
    pending_terms: Vec<Entry>,
    pending_postings: Vec<Entry>,
    pending_by_document: Vec<Entry>,
    pending_meta: Option<Vec<u8>>,
}

fn posting_key(term_id: TermId, doc_id: DocId) -> Vec<u8> {
    let mut key = Vec::with_capacity(8);
    key.extend_from_slice(&term_id.to_be_bytes());
    key.extend_from_slice(&doc_id.to_be_bytes());
    key
}

fn id_at(key: &[u8], offset: usize) -> Result<u32> {
    key.get(offset..offset + 4)
        .and_then(|bytes| <[u8; 4]>::try_from(bytes).ok())
        .map(u32::from_be_bytes)
        .ok_or_else(|| IndexError::Codec(format!("malformed posting key of {} bytes", key.len())))
}

/// A batch that drops every current key of `tree` and then writes `rows`.
fn replace_batch(tree: &Tree, rows: &[Entry]) -> Result<Batch> {
    let mut batch = Batch::default();
    for key in tree.iter().keys() {
        batch.remove(key?);
    }
    for (key, value) in rows {
        batch.insert(key.as_slice(), value.as_slice());
    }
    Ok(batch)
}

fn decode_all<T: DeserializeOwned>(tree: &Tree) -> Result<Vec<T>> {
    let mut rows = Vec::new();
    for item in tree.iter().values() {
        rows.push(bincode::deserialize(&item?)?);
    }
    Ok(rows)
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self {
            documents: db.open_tree(DOCUMENTS_TREE)?,
            terms: db.open_tree(TERMS_TREE)?,
            postings: db.open_tree(POSTINGS_TREE)?,
            by_document: db.open_tree(POSTINGS_BY_DOC_TREE)?,
            meta: db.open_tree(META_TREE)?,
            db,
            pending_documents: Vec::new(),
            pending_terms: Vec::new(),
            pending_postings: Vec::new(),
            pending_by_document: Vec::new(),
            pending_meta: None,
        })
    }

    pub fn documents(&self) -> Result<Vec<DocumentRow>> { decode_all(&self.documents) }

    pub fn terms(&self) -> Result<Vec<TermRow>> { decode_all(&self.terms) }

    pub fn postings(&self) -> Result<Vec<PostingRow>> { decode_all(&self.postings) }

    pub fn postings_for_term(&self, term_id: TermId) -> Result<Vec<PostingRow>> {
        let mut rows = Vec::new();
        for item in self.postings.scan_prefix(term_id.to_be_bytes()).values() {
            rows.push(bincode::deserialize(&item?)?);
        }
        Ok(rows)
    }

    /// Postings of one document, in term id order.
    pub fn postings_for_document(&self, doc_id: DocId) -> Result<Vec<PostingRow>> {
        let mut rows = Vec::new();
        for key in self.by_document.scan_prefix(doc_id.to_be_bytes()).keys() {
            let term_id = id_at(&key?, 4)?;
            match self.postings.get(posting_key(term_id, doc_id))? {
                Some(bytes) => rows.push(bincode::deserialize(&bytes)?),
                None => {
                    return Err(IndexError::Store(format!("dangling posting ref term {term_id} doc {doc_id}")))
                }
            }
        }
        Ok(rows)
    }

    pub fn meta(&self) -> Result<Option<MetaFile>> {
        match self.meta.get(META_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl IndexSink for SledStore {
    fn record_document(&mut self, path: &str, doc_id: DocId) -> Result<()> {
        let row = DocumentRow { document_name: path.to_string(), doc_id };
        self.pending_documents.push((doc_id.to_be_bytes().to_vec(), bincode::serialize(&row)?));
        Ok(())
    }

    fn record_term(&mut self, term: &str, term_id: TermId) -> Result<()> {
        let row = TermRow { term: term.to_string(), term_id };
        self.pending_terms.push((term_id.to_be_bytes().to_vec(), bincode::serialize(&row)?));
        Ok(())
    }

    fn record_posting(&mut self, posting: &PostingRow) -> Result<()> {
        let key = posting_key(posting.term_id, posting.doc_id);
        self.pending_postings.push((key, bincode::serialize(posting)?));
        self.pending_by_document.push((posting_key(posting.doc_id, posting.term_id), Vec::new()));
        Ok(())
    }

    fn record_meta(&mut self, meta: &MetaFile) -> Result<()> {
        self.pending_meta = Some(serde_json::to_vec_pretty(meta)?);
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        self.discard_pending();
        Ok(())
    }

    /// Replace the previous contents of every tree in one transaction.
    /// Pending rows are dropped whether or not the write succeeds.
    fn commit(&mut self) -> Result<()> {
        let result = self.write_pending();
        self.discard_pending();
        result
    }
}

impl SledStore {
    fn discard_pending(&mut self) {
        self.pending_documents.clear();
        self.pending_terms.clear();
        self.pending_postings.clear();
        self.pending_by_document.clear();
        self.pending_meta = None;
    }

    fn write_pending(&self) -> Result<()> {
        let documents = replace_batch(&self.documents, &self.pending_documents)?;
        let terms = replace_batch(&self.terms, &self.pending_terms)?;
        let postings = replace_batch(&self.postings, &self.pending_postings)?;
        let by_document = replace_batch(&self.by_document, &self.pending_by_document)?;
        let mut meta = Batch::default();
        if let Some(bytes) = &self.pending_meta {
            meta.insert(META_KEY, bytes.as_slice());
        }

        let trees = (&self.documents, &self.terms, &self.postings, &self.by_document, &self.meta);
        let result: TransactionResult<()> = trees.transaction(|(d, t, p, b, m)| {
            d.apply_batch(&documents)?;
            t.apply_batch(&terms)?;
            p.apply_batch(&postings)?;
            b.apply_batch(&by_document)?;
            m.apply_batch(&meta)?;
            Ok(())
        });
        result.map_err(|e| IndexError::Store(format!("commit failed: {e:?}")))?;
        self.db.flush()?;

        tracing::debug!(
            documents = self.pending_documents.len(),
            terms = self.pending_terms.len(),
            postings = self.pending_postings.len(),
            "store committed"
        );
        Ok(())
    }
}
