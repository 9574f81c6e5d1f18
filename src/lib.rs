//! # boolir - Boolean retrieval over a text corpus
//!
//! boolir crawls a directory of text documents once, building a term index,
//! and then answers boolean queries (`AND`, `OR`, `NOT`, parentheses,
//! single-`*` wildcards) against it. Terms that never occur in the corpus
//! fall back to the closest spellings by edit distance.
//!
//! ## Architecture
//!
//! - [`index`] - Trie, permuterm and inverted indexes, the document registry, crawling and persistence
//! - [`query`] - Query parsing, term resolution, postings algebra and search
//! - [`output`] - Result formatting
//! - [`utils`] - Preprocessing (tokenizing, stopwords, stemming), codecs and configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use boolir::index::build::build_index;
//! use boolir::query::Search;
//! use boolir::utils::AppConfig;
//! use std::path::Path;
//!
//! let config = AppConfig::default();
//! let index_dir = Path::new("/tmp/shakespeare-index");
//! build_index(Path::new("/path/to/corpus"), index_dir, &config, false, true).unwrap();
//!
//! let search = Search::open(index_dir, &config);
//! let results = search.find("((macbeth OR julius) AND (NOT witch*))").unwrap();
//! for name in &results.documents {
//!     println!("{}", name);
//! }
//! ```
//!
//! ## Indexes
//!
//! 1. **Inverted index** - term to ascending document-id postings
//! 2. **Permuterm index** - every rotation of `term$` in a trie, so `A*B`
//!    becomes a prefix lookup for `B$A`
//!
//! Both are written once at the end of a crawl in a versioned binary format
//! and memory-mapped on load.

pub mod index;
pub mod output;
pub mod query;
pub mod utils;
