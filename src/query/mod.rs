//! Boolean query evaluation.
//!
//! A query string is tokenized and normalized by the [`QueryParser`], each
//! term is turned into postings by the [`TermResolver`] (exact, wildcard or
//! nearest-spelling), and groups are reduced with the set operations in
//! [`postings`]. [`Search`] wraps all of it around a loaded index.

pub mod error;
pub mod parser;
pub mod postings;
pub mod resolver;
pub mod search;

pub use error::QueryError;
pub use parser::{tokenize, QueryOutcome, QueryParser};
pub use resolver::{Resolution, TermNote, TermResolver};
pub use search::{Search, SearchResults};
