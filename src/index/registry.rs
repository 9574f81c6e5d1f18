use crate::index::persist::{load_or_empty, read_mapped, write_file};
use crate::index::types::{DocId, FORMAT_VERSION, REGISTRY_MAGIC};
use crate::utils::encoding::{write_header, write_str, ByteReader};
use ahash::AHashMap;
use anyhow::{bail, ensure, Result};
use std::path::Path;

/// Document name <-> dense id mapping.
///
/// Ids are handed out in first-seen order starting at 0 and are never
/// reused or removed, so they stay stable across runs once saved.
#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    names: Vec<String>,
    ids: AHashMap<String, DocId>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `name`, assigning the next free id on first sight
    pub fn register(&mut self, name: &str) -> Result<DocId> {
        if let Some(&id) = self.ids.get(name) {
            return Ok(id);
        }

        let Ok(id) = DocId::try_from(self.names.len()) else {
            bail!("document registry is full");
        };
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn id_of(&self, name: &str) -> Option<DocId> {
        self.ids.get(name).copied()
    }

    pub fn name_of(&self, id: DocId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn contains(&self, id: DocId) -> bool {
        (id as usize) < self.names.len()
    }

    /// Every known id, ascending
    pub fn universe(&self) -> Vec<DocId> {
        (0..self.names.len() as DocId).collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// (id, name) pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (DocId, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(id, name)| (id as DocId, name.as_str()))
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        write_header(&mut buf, REGISTRY_MAGIC, FORMAT_VERSION);
        buf.extend_from_slice(&(self.names.len() as u32).to_le_bytes());
        for name in &self.names {
            write_str(&mut buf, name)?;
        }
        Ok(buf)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        reader.expect_header(REGISTRY_MAGIC, FORMAT_VERSION)?;

        let count = reader.read_u32_le()?;
        let mut registry = Self::new();
        for expected in 0..count {
            let name = reader.read_str()?;
            let id = registry.register(name)?;
            ensure!(id == expected, "duplicate document name '{}'", name);
        }
        reader.finish()?;

        Ok(registry)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_file(path, &self.encode()?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        read_mapped(path, Self::decode)
    }

    /// Load, or start empty if the file is missing or corrupt
    pub fn load_or_default(path: &Path) -> Self {
        load_or_empty(path, "document registry", Self::decode)
    }
}
