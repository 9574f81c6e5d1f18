//! Index structures and their build/serve lifecycle.
//!
//! The crawler ([`build`]) feeds every normalized term of every document to
//! an [`IndexWriter`], which owns the [`InvertedIndex`], the
//! [`PermutermIndex`] and the [`DocumentRegistry`] and persists them once at
//! the end. Queries are then served from an [`IndexReader`].

pub mod build;
pub mod inverted;
pub mod permuterm;
pub(crate) mod persist;
pub mod reader;
pub mod registry;
pub mod stats;
pub mod trie;
pub mod types;
pub mod writer;

pub use inverted::InvertedIndex;
pub use permuterm::{PatternError, PermutermIndex};
pub use reader::IndexReader;
pub use registry::DocumentRegistry;
pub use trie::Trie;
pub use types::*;
pub use writer::IndexWriter;
