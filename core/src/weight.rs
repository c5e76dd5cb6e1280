//! Corpus-level term weighting, computed once traversal has finished.

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::index::{IndexState, TermId};
use crate::persist::PostingRow;

/// What goes into the `tfidf` column of a posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightMode {
    /// The term's idf, identical on every posting of the term.
    #[default]
    Idf,
    /// `termfreq * idf`.
    TfIdf,
}

/// `log10(n / docs)`, unsmoothed.
pub fn idf(docs: u32, n: u32) -> Result<f64> {
    if docs == 0 {
        return Err(IndexError::Invariant("idf requested for a term with docs = 0".into()));
    }
    if docs > n {
        return Err(IndexError::Invariant(format!("term docs {docs} exceeds corpus size {n}")));
    }
    Ok((n as f64 / docs as f64).log10())
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub term: String,
    pub term_id: TermId,
    pub idf: f64,
    pub postings: Vec<PostingRow>,
}

/// Weigh every term of a finished run, in term id order with each term's
/// postings in doc id order.
pub fn weigh(state: &IndexState, mode: WeightMode) -> Result<Vec<WeightedTerm>> {
    state.check_invariants()?;
    let n = state.num_documents();
    state
        .terms_by_id()
        .into_iter()
        .map(|(text, term)| {
            let idf = idf(term.docs, n)?;
            let postings = term
                .postings
                .iter()
                .map(|(&doc_id, &tf)| PostingRow {
                    term_id: term.id,
                    doc_id,
                    tfidf: match mode {
                        WeightMode::Idf => idf,
                        WeightMode::TfIdf => tf as f64 * idf,
                    },
                    docfreq: term.docs,
                    termfreq: tf,
                })
                .collect();
            Ok(WeightedTerm { term: text.to_string(), term_id: term.id, idf, postings })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;

    #[test]
    fn idf_is_log10_ratio() {
        assert_eq!(idf(2, 2).unwrap(), 0.0);
        assert_eq!(idf(1, 2).unwrap(), 2f64.log10());
        assert_eq!(idf(3, 1000).unwrap(), (1000f64 / 3f64).log10());
    }

    #[test]
    fn zero_docs_is_an_invariant_violation() {
        assert!(matches!(idf(0, 10), Err(IndexError::Invariant(_))));
        assert!(matches!(idf(11, 10), Err(IndexError::Invariant(_))));
    }

    #[test]
    fn all_postings_share_the_term_idf() {
        let mut b = IndexBuilder::default();
        let d1 = b.new_document("a");
        let d2 = b.new_document("b");
        let _d3 = b.new_document("c");
        b.record("rust", d1);
        b.record("rust", d1);
        b.record("rust", d2);
        let weighted = weigh(&b.finish(), WeightMode::Idf).unwrap();
        assert_eq!(weighted.len(), 1);
        let rust = &weighted[0];
        assert_eq!(rust.idf, (3f64 / 2f64).log10());
        assert!(rust.postings.iter().all(|p| p.tfidf == rust.idf && p.docfreq == 2));
        assert_eq!(rust.postings.iter().map(|p| p.termfreq).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn tfidf_mode_multiplies_by_term_frequency() {
        let mut b = IndexBuilder::default();
        let d1 = b.new_document("a");
        b.new_document("b");
        for _ in 0..4 {
            b.record("rare", d1);
        }
        let weighted = weigh(&b.finish(), WeightMode::TfIdf).unwrap();
        assert_eq!(weighted[0].postings[0].tfidf, 4.0 * 2f64.log10());
    }

    #[test]
    fn empty_state_weighs_to_nothing() {
        let weighted = weigh(&IndexState::new(), WeightMode::Idf).unwrap();
        assert!(weighted.is_empty());
    }
}
