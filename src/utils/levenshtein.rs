//! Edit distance used for spelling correction of unknown query terms.

use std::cmp::min;

/// Levenshtein distance between two strings, counted in chars.
///
/// Case-sensitive: callers compare already-normalized terms. Runs in
/// O(|a| * |b|) time with a single row of O(min(|a|, |b|)) memory.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // Keep the row over the shorter string
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    let mut row: Vec<usize> = (0..=short.len()).collect();

    for (i, &lc) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;

        for (j, &sc) in short.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if lc == sc {
                diagonal
            } else {
                1 + min(min(diagonal, above), row[j])
            };
            diagonal = above;
        }
    }

    row[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        assert_eq!(edit_distance("macbeth", "macbeth"), 0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("", ""), 0);
    }

    #[test]
    fn test_classic_pairs() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
        assert_eq!(edit_distance("cot", "cat"), 1);
        assert_eq!(edit_distance("cot", "cats"), 2);
    }

    #[test]
    fn test_symmetric() {
        assert_eq!(edit_distance("sunday", "saturday"), edit_distance("saturday", "sunday"));
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(edit_distance("Cat", "cat"), 1);
    }

    #[test]
    fn test_multibyte_chars() {
        assert_eq!(edit_distance("café", "cafe"), 1);
    }
}
