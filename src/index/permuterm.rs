//! Permuterm index for wildcard lookups.
//!
//! Every term is stored as all cyclic rotations of `term$`, so for
//! `hello` the trie holds `hello$`, `ello$h`, `llo$he`, `lo$hel`, `o$hell`
//! and `$hello`. A pattern `A*B` becomes the prefix query `B$A`: for
//! `hel*o` that is `o$hel`, which reaches exactly the rotations of terms
//! starting with `hel` and ending with `o`.

use crate::index::persist::{load_or_empty, read_mapped, write_file};
use crate::index::trie::Trie;
use crate::index::types::{FORMAT_VERSION, PERMUTERM_MAGIC};
use crate::utils::encoding::{write_header, ByteReader};
use crate::utils::WILDCARD;
use ahash::AHashSet;
use anyhow::Result;
use std::path::Path;
use thiserror::Error;

/// Reserved end-of-term marker; never part of an indexed term
pub const SENTINEL: char = '$';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern '{0}' has more than one wildcard; only one '*' is supported")]
    MultipleWildcards(String),
    #[error("pattern '{0}' contains the reserved character '$'")]
    ReservedSentinel(String),
}

#[derive(Debug, Default)]
pub struct PermutermIndex {
    trie: Trie,
    /// Terms whose rotations are already in the trie
    tokens: AHashSet<String>,
}

impl PermutermIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert all rotations of `token$`; returns false for a repeat or a
    /// token containing the sentinel
    pub fn insert_token(&mut self, token: &str) -> bool {
        if self.tokens.contains(token) {
            return false;
        }
        if token.contains(SENTINEL) {
            log::debug!("Not adding '{}' to the permuterm index: contains '$'", token);
            return false;
        }

        let terminated = format!("{}{}", token, SENTINEL);
        for rotation in rotations(&terminated) {
            self.trie.insert(&rotation);
        }
        self.tokens.insert(token.to_string());
        true
    }

    /// Whether `token` was inserted verbatim
    pub fn search_token(&self, token: &str) -> bool {
        self.trie.contains(&format!("{}{}", token, SENTINEL))
    }

    /// Terms matching a pattern with at most one `*`, sorted.
    ///
    /// A pattern without a wildcard matches only itself.
    pub fn get_tokens(&self, pattern: &str) -> Result<Vec<String>, PatternError> {
        if pattern.contains(SENTINEL) {
            return Err(PatternError::ReservedSentinel(pattern.to_string()));
        }

        let Some((prefix, suffix)) = pattern.split_once(WILDCARD) else {
            return Ok(if self.search_token(pattern) {
                vec![pattern.to_string()]
            } else {
                Vec::new()
            });
        };
        if suffix.contains(WILDCARD) {
            return Err(PatternError::MultipleWildcards(pattern.to_string()));
        }

        let key = format!("{}{}{}", suffix, SENTINEL, prefix);
        let mut terms: Vec<String> = self
            .trie
            .words_with_prefix(&key)
            .iter()
            .filter_map(|hit| fix_rotation(hit))
            .collect();
        terms.sort_unstable();
        terms.dedup();
        Ok(terms)
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.trie.node_count() * 3 + 16);
        write_header(&mut buf, PERMUTERM_MAGIC, FORMAT_VERSION);
        self.trie.encode(&mut buf);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        reader.expect_header(PERMUTERM_MAGIC, FORMAT_VERSION)?;
        let trie = Trie::decode(&mut reader)?;
        reader.finish()?;

        // `$term` is the rotation that starts at the sentinel
        let sentinel = SENTINEL.to_string();
        let tokens = trie
            .words_with_prefix(&sentinel)
            .into_iter()
            .map(|rotation| rotation[SENTINEL.len_utf8()..].to_string())
            .collect();

        Ok(Self { trie, tokens })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_file(path, &self.encode())
    }

    pub fn load(path: &Path) -> Result<Self> {
        read_mapped(path, Self::decode)
    }

    /// Load, or start empty if the file is missing or corrupt
    pub fn load_or_default(path: &Path) -> Self {
        load_or_empty(path, "permuterm index", Self::decode)
    }
}

/// All cyclic rotations of `s`, one per char
fn rotations(s: &str) -> impl Iterator<Item = String> + '_ {
    s.char_indices()
        .map(move |(i, _)| format!("{}{}", &s[i..], &s[..i]))
}

/// Turn a stored rotation back into its term: `lo$hel` -> `hello`
pub fn fix_rotation(rotation: &str) -> Option<String> {
    let pos = memchr::memchr(SENTINEL as u8, rotation.as_bytes())?;
    Some(format!("{}{}", &rotation[pos + 1..], &rotation[..pos]))
}
