use crate::index::inverted::InvertedIndex;
use crate::index::permuterm::PermutermIndex;
use crate::index::persist::write_file;
use crate::index::reader::{load_parts, read_meta};
use crate::index::registry::DocumentRegistry;
use crate::index::types::*;
use crate::utils::stemmer::StemmerKind;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Owns every index structure during the build phase and persists them at the end
pub struct IndexWriter {
    index_path: PathBuf,
    corpus_path: PathBuf,
    stemmer: StemmerKind,
    remove_stopwords: bool,
    created_at: Option<u64>,
    inverted: InvertedIndex,
    permuterm: PermutermIndex,
    registry: DocumentRegistry,
}

impl IndexWriter {
    /// Open the index directory, continuing from whatever is already persisted there.
    ///
    /// Refuses to extend an index built with different term normalization.
    pub fn open(
        index_path: &Path,
        corpus_path: &Path,
        stemmer: StemmerKind,
        remove_stopwords: bool,
    ) -> Result<Self> {
        fs::create_dir_all(index_path)
            .with_context(|| format!("Failed to create index directory {}", index_path.display()))?;

        let existing = match read_meta(index_path) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("Ignoring index metadata: {:#}", e);
                None
            }
        };
        if let Some(meta) = &existing {
            if meta.stemmer != stemmer || meta.remove_stopwords != remove_stopwords {
                bail!(
                    "Index at {} was built with stemmer {:?} (stopwords removed: {}); \
                     rebuild with --force to change normalization",
                    index_path.display(),
                    meta.stemmer,
                    meta.remove_stopwords
                );
            }
        }

        let parts = load_parts(index_path);

        Ok(Self {
            index_path: index_path.to_path_buf(),
            corpus_path: corpus_path.to_path_buf(),
            stemmer,
            remove_stopwords,
            created_at: existing.map(|m| m.created_at),
            inverted: parts.inverted,
            permuterm: parts.permuterm,
            registry: parts.registry,
        })
    }

    /// Id for a document name, assigning a new one on first sight
    pub fn register(&mut self, name: &str) -> Result<DocId> {
        self.registry.register(name)
    }

    /// Feed one document's normalized terms to both indexes
    pub fn add_document<S: AsRef<str>>(&mut self, doc_id: DocId, terms: &[S]) {
        for term in terms {
            let term = term.as_ref();
            self.inverted.insert_token(term, doc_id);
            self.permuterm.insert_token(term);
        }
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn inverted(&self) -> &InvertedIndex {
        &self.inverted
    }

    pub fn permuterm(&self) -> &PermutermIndex {
        &self.permuterm
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Persist all artifacts and meta.json
    pub fn write(&self) -> Result<IndexMeta> {
        fs::create_dir_all(&self.index_path)?;

        self.inverted
            .save(&self.index_path.join(INVERTED_FILE))
            .context("Failed to write inverted index")?;
        self.permuterm
            .save(&self.index_path.join(PERMUTERM_FILE))
            .context("Failed to write permuterm index")?;
        self.registry
            .save(&self.index_path.join(REGISTRY_FILE))
            .context("Failed to write document registry")?;

        let meta = self.write_meta()?;
        log::info!(
            "Wrote index to {} ({} documents, {} terms)",
            self.index_path.display(),
            meta.doc_count,
            meta.term_count
        );
        Ok(meta)
    }

    fn write_meta(&self) -> Result<IndexMeta> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let meta = IndexMeta {
            version: FORMAT_VERSION,
            corpus_path: self.corpus_path.clone(),
            doc_count: self.registry.len() as u32,
            term_count: self.inverted.len() as u32,
            permuterm_tokens: self.permuterm.len() as u32,
            stemmer: self.stemmer,
            remove_stopwords: self.remove_stopwords,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        };

        let json = serde_json::to_vec_pretty(&meta).context("Failed to serialize index metadata")?;
        write_file(&self.index_path.join(META_FILE), &json)?;

        Ok(meta)
    }
}
