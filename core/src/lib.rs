//! Term-level inverted index construction: tokenize, filter, stem, count,
//! weigh by idf, and persist documents, terms and postings.

pub mod config;
pub mod error;
pub mod filter;
pub mod index;
pub mod persist;
pub mod pipeline;
pub mod tokenizer;
pub mod walk;
pub mod weight;

pub use config::IndexerConfig;
pub use error::{IndexError, Result};
pub use index::{DocId, IndexBuilder, IndexState, Term, TermId};
pub use persist::{IndexSink, MemorySink, PostingRow, SledStore};
pub use pipeline::{run, FileOutcome, RunReport};
