use crate::index::reader::IndexReader;
use crate::index::types::Postings;
use crate::query::error::QueryError;
use crate::query::parser::{QueryOutcome, QueryParser};
use crate::query::resolver::{TermNote, TermResolver};
use crate::utils::{AppConfig, Preprocessor};
use std::path::Path;
use std::time::{Duration, Instant};

/// Answer to one query, with document names in id order
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub documents: Vec<String>,
    pub postings: Postings,
    pub notes: Vec<TermNote>,
    pub elapsed: Duration,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// A loaded index plus the preprocessor that matches how it was built
pub struct Search {
    reader: IndexReader,
    preprocessor: Preprocessor,
}

impl Search {
    /// Open the index at `index_path`.
    ///
    /// Term normalization follows the index's recorded settings; `config`
    /// only applies when the index has no metadata.
    pub fn open(index_path: &Path, config: &AppConfig) -> Self {
        let reader = IndexReader::open(index_path);
        let preprocessor = match reader.meta() {
            Some(meta) => Preprocessor::new(meta.stemmer, meta.remove_stopwords),
            None => Preprocessor::new(config.stemmer, config.remove_stopwords),
        };
        log::debug!(
            "Serving {} documents, {} terms with {:?}",
            reader.registry().len(),
            reader.inverted().len(),
            preprocessor
        );
        Self::new(reader, preprocessor)
    }

    pub fn new(reader: IndexReader, preprocessor: Preprocessor) -> Self {
        Self {
            reader,
            preprocessor,
        }
    }

    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    /// Evaluate `query` to matching document ids
    pub fn evaluate(&self, query: &str) -> Result<QueryOutcome, QueryError> {
        let resolver = TermResolver::from_reader(&self.reader);
        QueryParser::new(resolver, &self.preprocessor).evaluate(query)
    }

    /// Evaluate `query` and map the matches to document names
    pub fn find(&self, query: &str) -> Result<SearchResults, QueryError> {
        let start = Instant::now();
        let QueryOutcome { postings, notes } = self.evaluate(query)?;

        let registry = self.reader.registry();
        let documents = postings
            .iter()
            .filter_map(|&id| {
                let name = registry.name_of(id);
                if name.is_none() {
                    log::warn!("Document id {} is not in the registry", id);
                }
                name.map(str::to_string)
            })
            .collect();

        Ok(SearchResults {
            documents,
            postings,
            notes,
            elapsed: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::writer::IndexWriter;
    use crate::utils::StemmerKind;

    fn build(dir: &Path, docs: &[(&str, &str)]) {
        let preprocessor = Preprocessor::new(StemmerKind::Porter, true);
        let mut writer = IndexWriter::open(dir, dir, StemmerKind::Porter, true).unwrap();
        for (name, text) in docs {
            let id = writer.register(name).unwrap();
            writer.add_document(id, &preprocessor.process(text));
        }
        writer.write().unwrap();
    }

    #[test]
    fn test_find_returns_names() {
        let dir = tempfile::tempdir().unwrap();
        build(
            dir.path(),
            &[
                ("macbeth.txt", "The Tragedy of Macbeth"),
                ("julius.txt", "The Tragedy of Julius Caesar"),
                ("both.txt", "Macbeth and Julius"),
            ],
        );

        let search = Search::open(dir.path(), &AppConfig::default());
        let results = search.find("(macbeth OR julius)").unwrap();
        assert_eq!(results.documents, vec!["macbeth.txt", "julius.txt", "both.txt"]);

        let results = search.find("(Macbeth AND Julius)").unwrap();
        assert_eq!(results.documents, vec!["both.txt"]);
        assert_eq!(results.len(), 1);

        let results = search.find("(NOT macbeth)").unwrap();
        assert_eq!(results.documents, vec!["julius.txt"]);
    }

    #[test]
    fn test_query_terms_are_stemmed_like_documents() {
        let dir = tempfile::tempdir().unwrap();
        build(dir.path(), &[("a.txt", "witches dancing"), ("b.txt", "one witch")]);

        let search = Search::open(dir.path(), &AppConfig::default());
        assert_eq!(search.find("witches").unwrap().documents, vec!["a.txt", "b.txt"]);
        assert_eq!(search.find("danced").unwrap().documents, vec!["a.txt"]);
        assert!(search.find("witches").unwrap().notes.is_empty());
    }

    #[test]
    fn test_recorded_normalization_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        build(dir.path(), &[("a.txt", "walking")]);

        let config = AppConfig {
            stemmer: StemmerKind::Identity,
            ..AppConfig::default()
        };
        let search = Search::open(dir.path(), &config);
        let results = search.find("walked").unwrap();
        assert_eq!(results.documents, vec!["a.txt"]);
        assert!(results.notes.is_empty());
    }

    #[test]
    fn test_missing_index_answers_empty() {
        let dir = tempfile::tempdir().unwrap();
        let search = Search::open(&dir.path().join("missing"), &AppConfig::default());

        assert!(search.find("anything").unwrap().is_empty());
        assert_eq!(search.find("NOT anything").unwrap().len(), 0);
        assert!(matches!(search.find(""), Err(QueryError::Empty)));
    }
}
