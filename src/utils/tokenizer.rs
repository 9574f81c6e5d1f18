use crate::utils::stemmer::{Stemmer, StemmerKind};
use crate::utils::stopwords::is_stopword;
use regex::Regex;
use std::sync::OnceLock;

/// Wildcard marker in query patterns
pub const WILDCARD: char = '*';

fn word_regex() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    WORD_RE.get_or_init(|| Regex::new(r"\w+").expect("word regex is valid"))
}

/// Turns raw document text and query terms into normalized index terms.
///
/// One instance is built per process and shared by the crawler and the
/// query parser so both sides normalize identically.
pub struct Preprocessor {
    stemmer: Box<dyn Stemmer>,
    remove_stopwords: bool,
}

impl std::fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preprocessor")
            .field("stemmer", &self.stemmer.name())
            .field("remove_stopwords", &self.remove_stopwords)
            .finish()
    }
}

impl Preprocessor {
    pub fn new(kind: StemmerKind, remove_stopwords: bool) -> Self {
        Self::with_stemmer(kind.build(), remove_stopwords)
    }

    pub fn with_stemmer(stemmer: Box<dyn Stemmer>, remove_stopwords: bool) -> Self {
        Self {
            stemmer,
            remove_stopwords,
        }
    }

    pub fn stemmer_name(&self) -> &'static str {
        self.stemmer.name()
    }

    /// Extract the ordered term sequence of a document
    pub fn process(&self, text: &str) -> Vec<String> {
        let mut terms = Vec::with_capacity(text.len() / 6);

        for line in text.lines() {
            for word in word_regex().find_iter(line) {
                let lower = word.as_str().to_lowercase();
                if self.remove_stopwords && is_stopword(&lower) {
                    continue;
                }
                terms.push(self.stemmer.stem(&lower));
            }
        }

        terms
    }

    /// Normalize a single query term; wildcard patterns are only lowercased
    pub fn normalize_term(&self, term: &str) -> String {
        let lower = term.to_lowercase();
        if lower.contains(WILDCARD) {
            lower
        } else {
            self.stemmer.stem(&lower)
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(StemmerKind::default(), true)
    }
}
