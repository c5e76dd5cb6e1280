//! Acceptance rules applied to candidate tokens before stemming.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::tokenizer::DEFAULT_STOPWORDS;

pub const DEFAULT_MIN_TERM_LEN: usize = 3;

/// Which form of a token is looked up in the stopword set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwordMatch {
    /// The raw token, case-sensitive. `"The"` is kept, `"the"` is dropped.
    #[default]
    Literal,
    /// The lower-cased token. `"The"` and `"the"` are both dropped.
    Lowercased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooShort,
    NonWord,
    Numeric,
    Stopword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(String),
    Rejected(Rejection),
}

#[derive(Debug, Clone)]
pub struct TermFilter {
    stopwords: HashSet<String>,
    matching: StopwordMatch,
    min_len: usize,
}

impl Default for TermFilter {
    fn default() -> Self {
        Self::new(StopwordMatch::default(), DEFAULT_MIN_TERM_LEN)
    }
}

impl TermFilter {
    /// Filter backed by the built-in English stopword list.
    pub fn new(matching: StopwordMatch, min_len: usize) -> Self {
        let stopwords = DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect();
        Self { stopwords, matching, min_len }
    }

    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_stopword(&self, token: &str) -> bool { self.stopwords.contains(token) }

    /// Whether `raw` hits the stopword set, whatever rule `check` would
    /// reject it on. Drives the stopword counter.
    pub fn matches_stopword(&self, raw: &str) -> bool {
        let raw = raw.trim_end_matches(['\n', '\r']);
        match self.matching {
            StopwordMatch::Literal => self.is_stopword(raw),
            StopwordMatch::Lowercased => self.is_stopword(raw.to_lowercase().trim()),
        }
    }

    pub fn check(&self, raw: &str) -> Verdict {
        let raw = raw.trim_end_matches(['\n', '\r']);
        let normalized = raw.to_lowercase();
        let normalized = normalized.trim();

        if normalized.chars().count() < self.min_len.max(1) {
            return Verdict::Rejected(Rejection::TooShort);
        }
        if !normalized.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Verdict::Rejected(Rejection::NonWord);
        }
        if normalized.chars().all(|c| c.is_ascii_digit()) {
            return Verdict::Rejected(Rejection::Numeric);
        }
        let candidate = match self.matching {
            StopwordMatch::Literal => raw,
            StopwordMatch::Lowercased => normalized,
        };
        if self.is_stopword(candidate) {
            return Verdict::Rejected(Rejection::Stopword);
        }
        Verdict::Accepted(normalized.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> TermFilter { TermFilter::default() }

    #[test]
    fn accepts_and_lowercases() {
        assert_eq!(filter().check("Indexer"), Verdict::Accepted("indexer".into()));
        assert_eq!(filter().check("snake_case"), Verdict::Accepted("snake_case".into()));
        assert_eq!(filter().check("abc123"), Verdict::Accepted("abc123".into()));
    }

    #[test]
    fn rejects_short_and_empty() {
        assert_eq!(filter().check(""), Verdict::Rejected(Rejection::TooShort));
        assert_eq!(filter().check("ab"), Verdict::Rejected(Rejection::TooShort));
        assert_eq!(filter().check("Zq"), Verdict::Rejected(Rejection::TooShort));
    }

    #[test]
    fn rejects_pure_numbers() {
        assert_eq!(filter().check("2023"), Verdict::Rejected(Rejection::Numeric));
        assert_eq!(filter().check("1e10"), Verdict::Accepted("1e10".into()));
    }

    #[test]
    fn rejects_non_word_characters() {
        assert_eq!(filter().check("café"), Verdict::Rejected(Rejection::NonWord));
        assert_eq!(filter().check("don't"), Verdict::Rejected(Rejection::NonWord));
    }

    #[test]
    fn strips_newline_remnants() {
        assert_eq!(filter().check("token\r\n"), Verdict::Accepted("token".into()));
    }

    #[test]
    fn literal_stopwords_are_case_sensitive() {
        let f = TermFilter::new(StopwordMatch::Literal, 3);
        assert_eq!(f.check("the"), Verdict::Rejected(Rejection::Stopword));
        assert_eq!(f.check("The"), Verdict::Accepted("the".into()));
        assert_eq!(f.check("THEIR"), Verdict::Accepted("their".into()));
    }

    #[test]
    fn lowercased_stopwords_ignore_case() {
        let f = TermFilter::new(StopwordMatch::Lowercased, 3);
        assert_eq!(f.check("the"), Verdict::Rejected(Rejection::Stopword));
        assert_eq!(f.check("The"), Verdict::Rejected(Rejection::Stopword));
        assert_eq!(f.check("THEIR"), Verdict::Rejected(Rejection::Stopword));
    }

    #[test]
    fn short_stopwords_fail_on_length_first() {
        assert_eq!(filter().check("on"), Verdict::Rejected(Rejection::TooShort));
        assert!(filter().matches_stopword("on"));
        assert!(filter().matches_stopword("a"));
        assert!(!filter().matches_stopword("On"));
        assert!(TermFilter::new(StopwordMatch::Lowercased, 3).matches_stopword("On"));
    }

    #[test]
    fn custom_stopword_set() {
        let f = TermFilter::default().with_stopwords(["cat"]);
        assert_eq!(f.check("cat"), Verdict::Rejected(Rejection::Stopword));
        assert_eq!(f.check("the"), Verdict::Accepted("the".into()));
    }
}
