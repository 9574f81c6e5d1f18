use crate::index::persist::{load_or_empty, read_mapped, write_file};
use crate::index::types::{DocId, FORMAT_VERSION, INVERTED_MAGIC};
use crate::utils::encoding::{delta_decode, delta_encode, write_header, write_str, ByteReader};
use anyhow::{ensure, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Term -> postings map.
///
/// Postings stay strictly ascending and duplicate-free after every insert.
/// Membership of a (term, doc) pair is checked against the postings list
/// itself, so no separate seen-pairs set is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    postings: BTreeMap<String, Vec<DocId>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `term` occurs in `doc_id`; returns false if already recorded.
    ///
    /// Appending in ascending doc order is O(1); an out-of-order id is placed
    /// by binary search.
    pub fn insert_token(&mut self, term: &str, doc_id: DocId) -> bool {
        if let Some(list) = self.postings.get_mut(term) {
            return insert_sorted(list, doc_id);
        }
        self.postings.insert(term.to_string(), vec![doc_id]);
        true
    }

    /// Index every term of one document
    pub fn insert_document<S: AsRef<str>>(&mut self, doc_id: DocId, terms: &[S]) {
        for term in terms {
            self.insert_token(term.as_ref(), doc_id);
        }
    }

    /// Postings for `term`; empty if unknown
    pub fn get_postings(&self, term: &str) -> &[DocId] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    /// Vocabulary in ascending order
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.postings.keys().map(String::as_str)
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Total number of (term, doc) pairs
    pub fn posting_count(&self) -> usize {
        self.postings.values().map(Vec::len).sum()
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        write_header(&mut buf, INVERTED_MAGIC, FORMAT_VERSION);
        buf.extend_from_slice(&(self.postings.len() as u32).to_le_bytes());

        let mut encoded = Vec::new();
        for (term, doc_ids) in &self.postings {
            encoded.clear();
            delta_encode(doc_ids, &mut encoded);

            write_str(&mut buf, term)?;
            buf.extend_from_slice(&(doc_ids.len() as u32).to_le_bytes());
            buf.extend_from_slice(&(encoded.len() as u32).to_le_bytes());
            buf.extend_from_slice(&encoded);
        }

        Ok(buf)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        reader.expect_header(INVERTED_MAGIC, FORMAT_VERSION)?;

        let count = reader.read_u32_le()?;
        let mut postings = BTreeMap::new();
        let mut prev_term: Option<&str> = None;

        for _ in 0..count {
            let term = reader.read_str()?;
            ensure!(
                prev_term.is_none_or(|prev| prev < term),
                "terms out of order at '{}'",
                term
            );
            prev_term = Some(term);

            let doc_freq = reader.read_u32_le()? as usize;
            let length = reader.read_u32_le()? as usize;
            let doc_ids = delta_decode(reader.read_bytes(length)?)?;
            ensure!(
                doc_ids.len() == doc_freq,
                "term '{}' declares {} postings but holds {}",
                term,
                doc_freq,
                doc_ids.len()
            );

            postings.insert(term.to_string(), doc_ids);
        }
        reader.finish()?;

        Ok(Self { postings })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_file(path, &self.encode()?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        read_mapped(path, Self::decode)
    }

    /// Load, or start empty if the file is missing or corrupt
    pub fn load_or_default(path: &Path) -> Self {
        load_or_empty(path, "inverted index", Self::decode)
    }
}

fn insert_sorted(list: &mut Vec<DocId>, doc_id: DocId) -> bool {
    match list.last() {
        Some(&last) if last < doc_id => {
            list.push(doc_id);
            true
        }
        Some(&last) if last == doc_id => false,
        _ => match list.binary_search(&doc_id) {
            Ok(_) => false,
            Err(pos) => {
                list.insert(pos, doc_id);
                true
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_strictly_ascending(list: &[DocId]) -> bool {
        list.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn test_insert_and_get() {
        let mut index = InvertedIndex::new();
        assert!(index.insert_token("macbeth", 0));
        assert!(index.insert_token("macbeth", 2));
        assert!(index.insert_token("julius", 1));

        assert_eq!(index.get_postings("macbeth"), &[0, 2]);
        assert_eq!(index.get_postings("julius"), &[1]);
        assert!(index.get_postings("hamlet").is_empty());
        assert_eq!(index.len(), 2);
        assert_eq!(index.posting_count(), 3);
    }

    #[test]
    fn test_repeated_pair_is_a_noop() {
        let mut index = InvertedIndex::new();
        index.insert_document(3, &["ghost", "ghost", "ghost"]);
        let before = index.clone();

        assert!(!index.insert_token("ghost", 3));
        assert_eq!(index, before);
        assert_eq!(index.get_postings("ghost"), &[3]);
    }

    #[test]
    fn test_out_of_order_inserts_stay_sorted() {
        let mut index = InvertedIndex::new();
        for doc in [5, 1, 9, 3, 1, 7, 0, 9, 4, 2, 5] {
            index.insert_token("term", doc);
        }

        let postings = index.get_postings("term");
        assert!(is_strictly_ascending(postings));
        assert_eq!(postings, &[0, 1, 2, 3, 4, 5, 7, 9]);
    }

    #[test]
    fn test_any_order_gives_same_postings() {
        let pairs = [("a", 4), ("b", 1), ("a", 2), ("a", 4), ("b", 0), ("a", 0)];

        let mut forward = InvertedIndex::new();
        for &(term, doc) in &pairs {
            forward.insert_token(term, doc);
        }
        let mut backward = InvertedIndex::new();
        for &(term, doc) in pairs.iter().rev() {
            backward.insert_token(term, doc);
        }

        assert_eq!(forward, backward);
        assert!(forward.terms().all(|t| is_strictly_ascending(forward.get_postings(t))));
    }

    #[test]
    fn test_terms_are_sorted() {
        let mut index = InvertedIndex::new();
        index.insert_document(0, &["witch", "cauldron", "thane"]);
        let terms: Vec<&str> = index.terms().collect();
        assert_eq!(terms, vec!["cauldron", "thane", "witch"]);
    }

    #[test]
    fn test_encode_decode() {
        let mut index = InvertedIndex::new();
        index.insert_document(0, &["macbeth", "witch"]);
        index.insert_document(1, &["julius"]);
        index.insert_document(1000, &["macbeth", "julius"]);

        let decoded = InvertedIndex::decode(&index.encode().unwrap()).unwrap();
        assert_eq!(decoded, index);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let mut bytes = InvertedIndex::new().encode().unwrap();
        bytes.push(0xFF);
        assert!(InvertedIndex::decode(&bytes).is_err());
        assert!(InvertedIndex::decode(b"BIRI").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let index = InvertedIndex::load_or_default(&dir.path().join("missing.bin"));
        assert!(index.is_empty());
    }
}
