use crate::index::inverted::InvertedIndex;
use crate::index::permuterm::{PatternError, PermutermIndex};
use crate::index::reader::IndexReader;
use crate::index::types::{DocId, Postings};
use crate::query::postings::{complement, union_all};
use crate::utils::{edit_distance, WILDCARD};
use std::fmt;

/// How a query term was resolved when it was not a plain exact hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermNote {
    /// No exact match; every term at the minimum edit distance was used instead
    Fuzzy {
        term: String,
        substitutes: Vec<String>,
        distance: usize,
    },
    /// Terms matched by a wildcard pattern
    Wildcard { pattern: String, matches: Vec<String> },
}

impl fmt::Display for TermNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermNote::Fuzzy {
                term,
                substitutes,
                distance,
            } => write!(
                f,
                "no exact match for '{}'; using {} (edit distance {})",
                term,
                substitutes.join(", "),
                distance
            ),
            TermNote::Wildcard { pattern, matches } if matches.is_empty() => {
                write!(f, "'{}' matched no terms", pattern)
            }
            TermNote::Wildcard { pattern, matches } => {
                write!(f, "'{}' matched {}", pattern, matches.join(", "))
            }
        }
    }
}

/// Postings for one query term, plus how they were found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub postings: Postings,
    pub note: Option<TermNote>,
}

/// Maps a normalized query term to postings: wildcard expansion, exact
/// lookup, or nearest-spelling fallback.
#[derive(Clone, Copy)]
pub struct TermResolver<'a> {
    inverted: &'a InvertedIndex,
    permuterm: &'a PermutermIndex,
    universe: &'a [DocId],
}

impl<'a> TermResolver<'a> {
    pub fn new(
        inverted: &'a InvertedIndex,
        permuterm: &'a PermutermIndex,
        universe: &'a [DocId],
    ) -> Self {
        Self {
            inverted,
            permuterm,
            universe,
        }
    }

    pub fn from_reader(reader: &'a IndexReader) -> Self {
        Self::new(reader.inverted(), reader.permuterm(), reader.universe())
    }

    /// Resolve `term`; with `negated` the complement against the universe is returned
    pub fn resolve(&self, term: &str, negated: bool) -> Result<Resolution, PatternError> {
        let mut resolution = if term.contains(WILDCARD) {
            self.resolve_wildcard(term)?
        } else if self.permuterm.search_token(term) {
            Resolution {
                postings: self.inverted.get_postings(term).to_vec(),
                note: None,
            }
        } else {
            self.resolve_fuzzy(term)
        };

        if negated {
            resolution.postings = complement(&resolution.postings, self.universe);
        }
        Ok(resolution)
    }

    fn resolve_wildcard(&self, pattern: &str) -> Result<Resolution, PatternError> {
        let matches = self.permuterm.get_tokens(pattern)?;
        log::debug!("Wildcard '{}' matched {} terms", pattern, matches.len());

        let postings = union_all(matches.iter().map(|t| self.inverted.get_postings(t)));
        Ok(Resolution {
            postings,
            note: Some(TermNote::Wildcard {
                pattern: pattern.to_string(),
                matches,
            }),
        })
    }

    fn resolve_fuzzy(&self, term: &str) -> Resolution {
        let Some((distance, substitutes)) = self.nearest_terms(term) else {
            log::debug!("No vocabulary to correct '{}' against", term);
            return Resolution {
                postings: Vec::new(),
                note: None,
            };
        };
        log::info!(
            "No exact match for '{}', using {:?} at distance {}",
            term,
            substitutes,
            distance
        );

        let postings = union_all(substitutes.iter().map(|t| self.inverted.get_postings(t)));
        Resolution {
            postings,
            note: Some(TermNote::Fuzzy {
                term: term.to_string(),
                substitutes,
                distance,
            }),
        }
    }

    /// Every vocabulary term at the minimum edit distance from `term`, ascending.
    ///
    /// `None` only for an empty vocabulary.
    pub fn nearest_terms(&self, term: &str) -> Option<(usize, Vec<String>)> {
        let term_len = term.chars().count();
        let mut best = usize::MAX;
        let mut ties: Vec<&str> = Vec::new();

        for candidate in self.inverted.terms() {
            // Length difference is a lower bound on the distance
            if candidate.chars().count().abs_diff(term_len) > best {
                continue;
            }
            let distance = edit_distance(term, candidate);
            if distance < best {
                best = distance;
                ties.clear();
            }
            if distance == best {
                ties.push(candidate);
            }
        }

        if ties.is_empty() {
            return None;
        }
        Some((best, ties.into_iter().map(str::to_string).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        inverted: InvertedIndex,
        permuterm: PermutermIndex,
        universe: Vec<DocId>,
    }

    impl Fixture {
        fn new(docs: &[&[&str]]) -> Self {
            let mut inverted = InvertedIndex::new();
            let mut permuterm = PermutermIndex::new();
            for (doc, &terms) in docs.iter().enumerate() {
                inverted.insert_document(doc as DocId, terms);
                for term in terms.iter() {
                    permuterm.insert_token(term);
                }
            }
            Self {
                inverted,
                permuterm,
                universe: (0..docs.len() as DocId).collect(),
            }
        }

        fn resolver(&self) -> TermResolver<'_> {
            TermResolver::new(&self.inverted, &self.permuterm, &self.universe)
        }
    }

    #[test]
    fn test_exact_term() {
        let fx = Fixture::new(&[&["macbeth"], &["julius"], &["macbeth", "julius"]]);
        let res = fx.resolver().resolve("macbeth", false).unwrap();
        assert_eq!(res.postings, vec![0, 2]);
        assert_eq!(res.note, None);
    }

    #[test]
    fn test_negated_term() {
        let fx = Fixture::new(&[&["macbeth"], &["julius"], &["macbeth", "julius"]]);
        let res = fx.resolver().resolve("macbeth", true).unwrap();
        assert_eq!(res.postings, vec![1]);
    }

    #[test]
    fn test_fuzzy_picks_nearest() {
        // "bat" and "cats" are both two edits away from "cot"
        let fx = Fixture::new(&[&["cat"], &["cats"], &["bat"]]);
        let res = fx.resolver().resolve("cot", false).unwrap();

        assert_eq!(res.postings, vec![0]);
        assert_eq!(
            res.note,
            Some(TermNote::Fuzzy {
                term: "cot".to_string(),
                substitutes: vec!["cat".to_string()],
                distance: 1,
            })
        );
    }

    #[test]
    fn test_fuzzy_unions_all_ties() {
        let fx = Fixture::new(&[&["cut"], &["cats"], &["cat"]]);
        let res = fx.resolver().resolve("cot", false).unwrap();

        assert_eq!(res.postings, vec![0, 2]);
        assert_eq!(
            res.note,
            Some(TermNote::Fuzzy {
                term: "cot".to_string(),
                substitutes: vec!["cat".to_string(), "cut".to_string()],
                distance: 1,
            })
        );
    }

    #[test]
    fn test_fuzzy_negated() {
        let fx = Fixture::new(&[&["cut"], &["cats"], &["cat"]]);
        let res = fx.resolver().resolve("cot", true).unwrap();
        assert_eq!(res.postings, vec![1]);
    }

    #[test]
    fn test_nearest_terms_empty_vocabulary() {
        let fx = Fixture::new(&[]);
        assert_eq!(fx.resolver().nearest_terms("anything"), None);
        let res = fx.resolver().resolve("anything", false).unwrap();
        assert!(res.postings.is_empty());
    }

    #[test]
    fn test_wildcard_unions_matches() {
        let fx = Fixture::new(&[&["hello"], &["help"], &["hero", "hello"], &["world"]]);
        let res = fx.resolver().resolve("hel*", false).unwrap();

        assert_eq!(res.postings, vec![0, 1, 2]);
        assert_eq!(
            res.note,
            Some(TermNote::Wildcard {
                pattern: "hel*".to_string(),
                matches: vec!["hello".to_string(), "help".to_string()],
            })
        );

        let res = fx.resolver().resolve("hel*", true).unwrap();
        assert_eq!(res.postings, vec![3]);
    }

    #[test]
    fn test_wildcard_without_matches_is_not_fuzzy() {
        let fx = Fixture::new(&[&["hello"]]);
        let res = fx.resolver().resolve("xyz*", false).unwrap();
        assert!(res.postings.is_empty());
        assert_eq!(res.note.unwrap().to_string(), "'xyz*' matched no terms");
    }

    #[test]
    fn test_multiple_wildcards_rejected() {
        let fx = Fixture::new(&[&["hello"]]);
        assert!(matches!(
            fx.resolver().resolve("h*l*", false),
            Err(PatternError::MultipleWildcards(_))
        ));
    }
}
