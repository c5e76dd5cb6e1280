use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{IndexError, Result};
use crate::filter::{StopwordMatch, TermFilter, DEFAULT_MIN_TERM_LEN};
use crate::index::IndexBuilder;
use crate::tokenizer::Tokenizer;
use crate::weight::WeightMode;

/// Knobs for one indexing run. Every field has a default, so a JSON config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexerConfig {
    pub min_term_len: usize,
    pub stopword_match: StopwordMatch,
    pub weighting: WeightMode,
    pub nfkc: bool,
    /// Visit directory entries in file-name order so ids are reproducible.
    pub sort_paths: bool,
    /// Replaces the built-in English list when set.
    pub stopwords: Option<Vec<String>>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            min_term_len: DEFAULT_MIN_TERM_LEN,
            stopword_match: StopwordMatch::Literal,
            weighting: WeightMode::Idf,
            nfkc: false,
            sort_paths: true,
            stopwords: None,
        }
    }
}

impl IndexerConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| IndexError::Io { path: path.to_path_buf(), source })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|e| IndexError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_term_len == 0 {
            return Err(IndexError::Config("min_term_len must be at least 1".into()));
        }
        Ok(())
    }

    pub fn term_filter(&self) -> TermFilter {
        let filter = TermFilter::new(self.stopword_match, self.min_term_len);
        match &self.stopwords {
            Some(words) => filter.with_stopwords(words.iter().cloned()),
            None => filter,
        }
    }

    pub fn builder(&self) -> IndexBuilder {
        IndexBuilder::new(Tokenizer::new(self.nfkc), self.term_filter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: IndexerConfig = serde_json::from_str(r#"{"weighting": "tfidf", "stopword_match": "lowercased"}"#).unwrap();
        assert_eq!(cfg.weighting, WeightMode::TfIdf);
        assert_eq!(cfg.stopword_match, StopwordMatch::Lowercased);
        assert_eq!(cfg.min_term_len, 3);
        assert!(cfg.sort_paths);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<IndexerConfig>(r#"{"smoothing": true}"#).is_err());
    }

    #[test]
    fn zero_min_len_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{"min_term_len": 0}"#).unwrap();
        assert!(matches!(IndexerConfig::from_json_file(&path), Err(IndexError::Config(_))));
    }

    #[test]
    fn custom_stopwords_replace_defaults() {
        let cfg = IndexerConfig { stopwords: Some(vec!["cat".into()]), ..Default::default() };
        let filter = cfg.term_filter();
        assert!(filter.is_stopword("cat"));
        assert!(!filter.is_stopword("the"));
    }
}
