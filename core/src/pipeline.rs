//! One indexing run: walk, build, weigh, persist.

use serde::Serialize;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::config::IndexerConfig;
use crate::error::Result;
use crate::index::{Counters, DocId, IndexBuilder, IndexState};
use crate::persist::{IndexSink, MetaFile, FORMAT_VERSION};
use crate::walk::{read_document, DocumentWalk};
use crate::weight::weigh;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
    Indexed { doc_id: DocId, path: PathBuf, tokens: u64 },
    /// `doc_id` is `None` when the entry failed before it became a document.
    Failed { doc_id: Option<DocId>, path: Option<PathBuf>, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub counters: Counters,
    pub failures: Vec<FileOutcome>,
    pub started_at: String,
    pub finished_at: String,
}

impl RunReport {
    pub fn is_clean(&self) -> bool { self.failures.is_empty() }
}

pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

/// Index one document into `builder`, recording it in `sink` first.
pub fn index_file<S: IndexSink + ?Sized>(builder: &mut IndexBuilder, sink: &mut S, path: &Path) -> Result<FileOutcome> {
    let doc_id = builder.new_document(path);
    sink.record_document(&path.to_string_lossy(), doc_id)?;
    match read_document(path) {
        Ok(text) => {
            let tokens = builder.ingest_text(doc_id, &text);
            tracing::debug!(doc_id, path = %path.display(), tokens, "indexed document");
            Ok(FileOutcome::Indexed { doc_id, path: path.to_path_buf(), tokens })
        }
        Err(err) => {
            tracing::warn!(doc_id, path = %path.display(), error = %err, "skipping unreadable document");
            Ok(FileOutcome::Failed { doc_id: Some(doc_id), path: Some(path.to_path_buf()), reason: err.to_string() })
        }
    }
}

/// Weigh a finished state and hand terms, postings and metadata to `sink`,
/// then commit. Documents must already have been recorded.
pub fn persist<S: IndexSink + ?Sized>(state: &IndexState, config: &IndexerConfig, sink: &mut S) -> Result<()> {
    let weighted = weigh(state, config.weighting)?;
    for term in &weighted {
        sink.record_term(&term.term, term.term_id)?;
        for posting in &term.postings {
            sink.record_posting(posting)?;
        }
    }
    let counters = state.counters();
    sink.record_meta(&MetaFile {
        num_docs: counters.documents,
        num_terms: counters.terms,
        num_tokens: counters.tokens,
        stopwords_found: counters.stopwords,
        created_at: now_rfc3339(),
        version: FORMAT_VERSION,
    })?;
    sink.commit()
}

/// Index every file under `root` and persist the result through `sink`.
///
/// Per-file failures land in the report; invariant and store errors abort
/// before anything is committed.
pub fn run<S: IndexSink + ?Sized>(root: &Path, config: &IndexerConfig, sink: &mut S) -> Result<RunReport> {
    config.validate()?;
    sink.begin()?;
    let started_at = now_rfc3339();
    tracing::info!(root = %root.display(), start = %started_at, "indexing started");

    let mut builder = config.builder();
    let mut failures = Vec::new();
    for entry in DocumentWalk::new(root, config.sort_paths)? {
        let outcome = match entry {
            Ok(path) => index_file(&mut builder, sink, &path)?,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unlistable entry");
                FileOutcome::Failed { doc_id: None, path: None, reason: err.to_string() }
            }
        };
        if let FileOutcome::Failed { .. } = outcome {
            failures.push(outcome);
        }
    }

    let state = builder.finish();
    tracing::info!(documents = state.num_documents(), terms = state.num_terms(), "indexing complete, writing store");
    persist(&state, config, sink)?;

    let counters = state.counters();
    let finished_at = now_rfc3339();
    tracing::info!(
        documents = counters.documents,
        terms = counters.terms,
        tokens = counters.tokens,
        stopwords_found = counters.stopwords,
        failures = failures.len(),
        end = %finished_at,
        "run finished"
    );
    Ok(RunReport { counters, failures, started_at, finished_at })
}
