//! Utility functions and supporting components.
//!
//! ## Modules
//!
//! - [`app_data`] - Configuration and index directory management (XDG-compliant)
//! - [`encoding`] - Varint/delta codecs and the byte reader behind the index formats
//! - [`levenshtein`] - Edit distance for spelling correction
//! - [`progress`] - Crawl progress reporting
//! - [`stemmer`] - Stemming algorithms
//! - [`stopwords`] - English stopword list
//! - [`tokenizer`] - The text [`Preprocessor`] shared by crawling and querying
//!
//! ```no_run
//! use boolir::utils::{Preprocessor, StemmerKind};
//!
//! let preprocessor = Preprocessor::new(StemmerKind::Porter, true);
//! let terms = preprocessor.process("The Tragedy of Macbeth");
//! // Returns: ["tragedi", "macbeth"]
//! ```

pub mod app_data;
pub mod encoding;
pub mod levenshtein;
pub mod progress;
pub mod stemmer;
pub mod stopwords;
pub mod tokenizer;

pub use app_data::*;
pub use levenshtein::edit_distance;
pub use stemmer::{IdentityStemmer, PorterStemmer, Stemmer, StemmerKind};
pub use stopwords::is_stopword;
pub use tokenizer::{Preprocessor, WILDCARD};
