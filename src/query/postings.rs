//! Set algebra over postings lists.
//!
//! All inputs must be strictly ascending; all outputs are strictly ascending.

use crate::index::types::{DocId, Postings};
use std::cmp::Ordering;

/// Intersection by two-pointer merge, O(|a| + |b|)
pub fn intersect(a: &[DocId], b: &[DocId]) -> Postings {
    let mut result = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }

    result
}

/// Sorted, duplicate-free union by two-pointer merge
pub fn union(a: &[DocId], b: &[DocId]) -> Postings {
    let mut result = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => {
                result.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                result.push(b[j]);
                j += 1;
            }
            Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result.extend_from_slice(&a[i..]);
    result.extend_from_slice(&b[j..]);

    result
}

/// Union of any number of lists
pub fn union_all<'a, I>(lists: I) -> Postings
where
    I: IntoIterator<Item = &'a [DocId]>,
{
    lists
        .into_iter()
        .fold(Vec::new(), |acc, list| union(&acc, list))
}

/// Every id of `universe` that is not in `list`, O(|universe| + |list|)
pub fn complement(list: &[DocId], universe: &[DocId]) -> Postings {
    let mut result = Vec::with_capacity(universe.len().saturating_sub(list.len()));
    let mut j = 0;

    for &doc in universe {
        while j < list.len() && list[j] < doc {
            j += 1;
        }
        if j < list.len() && list[j] == doc {
            continue;
        }
        result.push(doc);
    }

    result
}
