use crate::utils::stemmer::StemmerKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Dense identifier of a document in the registry
pub type DocId = u32;

/// Ascending, duplicate-free list of document ids
pub type Postings = Vec<DocId>;

pub const INVERTED_FILE: &str = "inverted.bin";
pub const PERMUTERM_FILE: &str = "permuterm.bin";
pub const REGISTRY_FILE: &str = "registry.bin";
pub const META_FILE: &str = "meta.json";

/// Every file an index directory holds
pub const INDEX_FILES: [&str; 4] = [INVERTED_FILE, PERMUTERM_FILE, REGISTRY_FILE, META_FILE];

pub const INVERTED_MAGIC: &[u8; 4] = b"BIRI";
pub const PERMUTERM_MAGIC: &[u8; 4] = b"BIRP";
pub const REGISTRY_MAGIC: &[u8; 4] = b"BIRD";

/// Current version of all binary index formats
pub const FORMAT_VERSION: u32 = 1;

/// Index metadata stored in meta.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub version: u32,
    pub corpus_path: PathBuf,
    pub doc_count: u32,
    pub term_count: u32,
    pub permuterm_tokens: u32,
    /// Normalization used at build time; queries must use the same
    pub stemmer: StemmerKind,
    pub remove_stopwords: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Default for IndexMeta {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            corpus_path: PathBuf::new(),
            doc_count: 0,
            term_count: 0,
            permuterm_tokens: 0,
            stemmer: StemmerKind::default(),
            remove_stopwords: true,
            created_at: 0,
            updated_at: 0,
        }
    }
}

/// Outcome of one crawl
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub documents_seen: usize,
    pub documents_indexed: usize,
    pub documents_skipped: usize,
    pub new_documents: usize,
    pub term_count: usize,
    pub elapsed_ms: u128,
}
