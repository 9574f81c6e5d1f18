use crate::index::inverted::InvertedIndex;
use crate::index::permuterm::PermutermIndex;
use crate::index::registry::DocumentRegistry;
use crate::index::types::*;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Read meta.json from an index directory; `None` if it does not exist
pub fn read_meta(index_path: &Path) -> Result<Option<IndexMeta>> {
    let meta_path = index_path.join(META_FILE);
    if !meta_path.exists() {
        return Ok(None);
    }
    let file = File::open(&meta_path).context("Failed to open meta.json")?;
    let meta = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", meta_path.display()))?;
    Ok(Some(meta))
}

/// The three persisted structures of one index
#[derive(Debug, Default)]
pub(crate) struct IndexParts {
    pub inverted: InvertedIndex,
    pub permuterm: PermutermIndex,
    pub registry: DocumentRegistry,
}

fn try_load_parts(index_path: &Path) -> Result<IndexParts> {
    Ok(IndexParts {
        inverted: InvertedIndex::load(&index_path.join(INVERTED_FILE))?,
        permuterm: PermutermIndex::load(&index_path.join(PERMUTERM_FILE))?,
        registry: DocumentRegistry::load(&index_path.join(REGISTRY_FILE))?,
    })
}

/// Load the artifacts of an index as one unit.
///
/// Postings are numbered by the registry they were built with, so if any
/// artifact is missing or corrupt all three start empty.
pub(crate) fn load_parts(index_path: &Path) -> IndexParts {
    let present = [INVERTED_FILE, PERMUTERM_FILE, REGISTRY_FILE]
        .iter()
        .any(|name| index_path.join(name).exists());
    if !present {
        log::info!("No index files in {}, starting empty", index_path.display());
        return IndexParts::default();
    }

    match try_load_parts(index_path) {
        Ok(parts) => parts,
        Err(e) => {
            log::warn!(
                "Discarding incomplete index at {} ({:#}); starting empty",
                index_path.display(),
                e
            );
            IndexParts::default()
        }
    }
}

/// Read-only view of a persisted index, used while serving queries
pub struct IndexReader {
    index_path: PathBuf,
    meta: Option<IndexMeta>,
    inverted: InvertedIndex,
    permuterm: PermutermIndex,
    registry: DocumentRegistry,
    universe: Vec<DocId>,
}

impl IndexReader {
    /// Load every artifact; a missing or corrupt index comes back empty
    pub fn open(index_path: &Path) -> Self {
        if !index_path.exists() {
            log::warn!(
                "No index found at {}. Run 'boolir index' first.",
                index_path.display()
            );
        }

        let meta = match read_meta(index_path) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("Ignoring index metadata: {:#}", e);
                None
            }
        };

        let parts = load_parts(index_path);
        let mut reader = Self::from_parts(parts.inverted, parts.permuterm, parts.registry);
        reader.index_path = index_path.to_path_buf();
        reader.meta = meta;
        reader
    }

    /// Serve from in-memory structures
    pub fn from_parts(
        inverted: InvertedIndex,
        permuterm: PermutermIndex,
        registry: DocumentRegistry,
    ) -> Self {
        let universe = registry.universe();
        Self {
            index_path: PathBuf::new(),
            meta: None,
            inverted,
            permuterm,
            registry,
            universe,
        }
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn meta(&self) -> Option<&IndexMeta> {
        self.meta.as_ref()
    }

    pub fn inverted(&self) -> &InvertedIndex {
        &self.inverted
    }

    pub fn permuterm(&self) -> &PermutermIndex {
        &self.permuterm
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    /// All known document ids, ascending
    pub fn universe(&self) -> &[DocId] {
        &self.universe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let reader = IndexReader::open(&dir.path().join("nothing-here"));

        assert!(reader.meta().is_none());
        assert!(reader.inverted().is_empty());
        assert!(reader.permuterm().is_empty());
        assert!(reader.universe().is_empty());
    }

    #[test]
    fn test_open_survives_corrupt_meta() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(META_FILE), "{").unwrap();

        assert!(read_meta(dir.path()).is_err());
        let reader = IndexReader::open(dir.path());
        assert!(reader.meta().is_none());
    }

    #[test]
    fn test_corrupt_registry_discards_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut inverted = InvertedIndex::new();
        inverted.insert_token("ghost", 0);
        inverted.save(&dir.path().join(INVERTED_FILE)).unwrap();
        PermutermIndex::new().save(&dir.path().join(PERMUTERM_FILE)).unwrap();
        std::fs::write(dir.path().join(REGISTRY_FILE), b"garbage").unwrap();

        let reader = IndexReader::open(dir.path());
        assert!(reader.inverted().is_empty());
        assert!(reader.registry().is_empty());
    }

    #[test]
    fn test_universe_follows_registry() {
        let mut registry = DocumentRegistry::new();
        registry.register("a.txt").unwrap();
        registry.register("b.txt").unwrap();

        let reader = IndexReader::from_parts(InvertedIndex::new(), PermutermIndex::new(), registry);
        assert_eq!(reader.universe(), &[0, 1]);
    }
}
