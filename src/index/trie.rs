//! Character prefix tree.
//!
//! Every traversal here (prefix enumeration, encoding, decoding) uses an
//! explicit work stack, so deep tries cannot overflow the call stack.

use crate::utils::encoding::{encode_varint, ByteReader};
use anyhow::{bail, Result};
use rustc_hash::FxHashMap;

/// Trie node: children keyed by char plus an end-of-word flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrieNode {
    children: FxHashMap<char, TrieNode>,
    terminal: bool,
}

impl TrieNode {
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Children ordered by char, for deterministic output
    fn sorted_children(&self) -> Vec<(char, &TrieNode)> {
        let mut children: Vec<_> = self.children.iter().map(|(&c, n)| (c, n)).collect();
        children.sort_unstable_by_key(|(c, _)| *c);
        children
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trie {
    root: TrieNode,
    words: usize,
    nodes: usize,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a string; returns false if it was already stored
    pub fn insert(&mut self, s: &str) -> bool {
        let mut created = 0;
        let mut node = &mut self.root;
        for ch in s.chars() {
            node = node.children.entry(ch).or_insert_with(|| {
                created += 1;
                TrieNode::default()
            });
        }
        let added = !node.terminal;
        node.terminal = true;

        self.nodes += created;
        if added {
            self.words += 1;
        }
        added
    }

    /// Exact-match lookup
    pub fn contains(&self, s: &str) -> bool {
        self.find_node(s).is_some_and(TrieNode::is_terminal)
    }

    /// Every stored string that starts with `prefix` (unordered)
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let Some(start) = self.find_node(prefix) else {
            return Vec::new();
        };

        let mut words = Vec::new();
        let mut stack: Vec<(&TrieNode, String)> = vec![(start, prefix.to_string())];

        while let Some((node, path)) = stack.pop() {
            for (&ch, child) in &node.children {
                let mut child_path = String::with_capacity(path.len() + ch.len_utf8());
                child_path.push_str(&path);
                child_path.push(ch);
                stack.push((child, child_path));
            }
            if node.terminal {
                words.push(path);
            }
        }

        words
    }

    /// Number of stored strings
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Number of nodes, root excluded
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    fn find_node(&self, s: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in s.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }

    /// Append the pre-order encoding of the trie to `buf`.
    ///
    /// Node record: varint edge char (0 for the root), u8 terminal flag,
    /// varint child count. Children follow their parent in char order.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        let mut stack: Vec<(char, &TrieNode)> = vec![('\0', &self.root)];

        while let Some((ch, node)) = stack.pop() {
            encode_varint(ch as u32, buf);
            buf.push(node.terminal as u8);
            encode_varint(node.children.len() as u32, buf);

            // Reverse so the smallest char is popped first
            for (c, child) in node.sorted_children().into_iter().rev() {
                stack.push((c, child));
            }
        }
    }

    /// Rebuild a trie from the bytes written by [`Trie::encode`]
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        struct Pending {
            ch: char,
            node: TrieNode,
            remaining: u32,
        }

        let mut words = 0usize;
        let mut nodes = 0usize;

        let (ch, root, remaining) = read_node_header(reader)?;
        if ch != '\0' {
            bail!("trie root has edge char {:?}", ch);
        }
        if root.terminal {
            words += 1;
        }
        let mut stack = vec![Pending {
            ch,
            node: root,
            remaining,
        }];

        loop {
            let Some(top) = stack.last_mut() else {
                bail!("trie decoder lost its root");
            };

            if top.remaining > 0 {
                top.remaining -= 1;
                let (ch, node, remaining) = read_node_header(reader)?;
                nodes += 1;
                if node.terminal {
                    words += 1;
                }
                stack.push(Pending { ch, node, remaining });
                continue;
            }

            // Node complete: attach to its parent, or finish at the root
            let Some(done) = stack.pop() else {
                bail!("trie decoder lost its root");
            };
            match stack.last_mut() {
                Some(parent) => {
                    if parent.node.children.insert(done.ch, done.node).is_some() {
                        bail!("duplicate child {:?} in trie", done.ch);
                    }
                }
                None => {
                    return Ok(Self {
                        root: done.node,
                        words,
                        nodes,
                    });
                }
            }
        }
    }
}

impl Drop for TrieNode {
    fn drop(&mut self) {
        if self.children.is_empty() {
            return;
        }
        // Detach descendants before they drop, so freeing a deep subtree
        // (including one half-built by a failed decode) never recurses
        let mut stack: Vec<TrieNode> = self.children.drain().map(|(_, n)| n).collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.children.drain().map(|(_, n)| n));
        }
    }
}

fn read_node_header(reader: &mut ByteReader<'_>) -> Result<(char, TrieNode, u32)> {
    let raw = reader.read_varint()?;
    let Some(ch) = char::from_u32(raw) else {
        bail!("invalid char {:#x} in trie", raw);
    };
    let terminal = match reader.read_u8()? {
        0 => false,
        1 => true,
        other => bail!("invalid terminal flag {}", other),
    };
    let child_count = reader.read_varint()?;
    let node = TrieNode {
        children: FxHashMap::default(),
        terminal,
    };
    Ok((ch, node, child_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut words: Vec<String>) -> Vec<String> {
        words.sort();
        words
    }

    #[test]
    fn test_insert_and_contains() {
        let mut trie = Trie::new();
        assert!(trie.insert("hello"));
        assert!(trie.insert("help"));

        assert!(trie.contains("hello"));
        assert!(trie.contains("help"));
        // Path exists but was never marked complete
        assert!(!trie.contains("hel"));
        assert!(!trie.contains("helping"));
        assert!(!trie.contains("world"));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut trie = Trie::new();
        trie.insert("abc");
        let before = trie.clone();

        assert!(!trie.insert("abc"));
        assert_eq!(trie, before);
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.node_count(), 3);
    }

    #[test]
    fn test_empty_string() {
        let mut trie = Trie::new();
        assert!(!trie.contains(""));
        trie.insert("");
        assert!(trie.contains(""));
        assert_eq!(trie.node_count(), 0);
    }

    #[test]
    fn test_words_with_prefix() {
        let mut trie = Trie::new();
        for word in ["car", "card", "care", "cat", "dog"] {
            trie.insert(word);
        }

        assert_eq!(
            sorted(trie.words_with_prefix("car")),
            vec!["car", "card", "care"]
        );
        assert_eq!(sorted(trie.words_with_prefix("ca")).len(), 4);
        assert_eq!(sorted(trie.words_with_prefix("")).len(), 5);
        assert!(trie.words_with_prefix("x").is_empty());
        assert!(trie.words_with_prefix("cards").is_empty());
    }

    #[test]
    fn test_deep_trie_does_not_overflow() {
        let mut trie = Trie::new();
        let long = "a".repeat(20_000);
        trie.insert(&long);

        let words = trie.words_with_prefix("aaa");
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].len(), 20_000);

        let mut buf = Vec::new();
        trie.encode(&mut buf);
        let decoded = Trie::decode(&mut ByteReader::new(&buf)).unwrap();
        assert!(decoded.contains(&long));
        assert_eq!(decoded.node_count(), 20_000);
    }

    #[test]
    fn test_encode_decode() {
        let mut trie = Trie::new();
        for word in ["", "a", "ab", "abc", "b", "ünïcode"] {
            trie.insert(word);
        }

        let mut buf = Vec::new();
        trie.encode(&mut buf);
        let mut reader = ByteReader::new(&buf);
        let decoded = Trie::decode(&mut reader).unwrap();
        reader.finish().unwrap();

        assert_eq!(decoded, trie);
        assert_eq!(decoded.len(), 6);
        assert_eq!(decoded.node_count(), trie.node_count());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let mut a = Trie::new();
        let mut b = Trie::new();
        for word in ["zeta", "alpha", "beta"] {
            a.insert(word);
        }
        for word in ["beta", "zeta", "alpha"] {
            b.insert(word);
        }

        let (mut buf_a, mut buf_b) = (Vec::new(), Vec::new());
        a.encode(&mut buf_a);
        b.encode(&mut buf_b);
        assert_eq!(buf_a, buf_b);
    }

    #[test]
    fn test_truncated_deep_trie_fails_cleanly() {
        let mut trie = Trie::new();
        trie.insert(&"a".repeat(300_000));
        trie.insert("b");
        let mut buf = Vec::new();
        trie.encode(&mut buf);
        buf.truncate(buf.len() - 3);

        // The deep "a" chain is complete and attached when the input runs out
        assert!(Trie::decode(&mut ByteReader::new(&buf)).is_err());
    }

    #[test]
    fn test_deep_subtree_drops_without_overflow() {
        let mut trie = Trie::new();
        trie.insert(&"z".repeat(300_000));
        let node = trie.root.children.remove(&'z');
        drop(trie);
        drop(node);
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        let mut trie = Trie::new();
        trie.insert("abc");
        let mut buf = Vec::new();
        trie.encode(&mut buf);
        buf.truncate(buf.len() - 2);

        assert!(Trie::decode(&mut ByteReader::new(&buf)).is_err());
    }
}
