//! Boolean query parsing and evaluation.
//!
//! Queries are terms joined by `AND` / `OR`, with `NOT` allowed directly in
//! front of a term. There is no operator precedence: every binary operation
//! must be grouped with its operands in parentheses, e.g.
//! `((macbeth OR julius) AND (NOT caesar))`. The whole query is wrapped in
//! one pair of parentheses when it is not already enclosed by one.
//!
//! Evaluation is a single left-to-right pass over a stack. Each `)` closes
//! a group that must be either a single value `(x)` or a binary operation
//! `(a OP b)`, which is reduced in place.

use crate::index::types::{DocId, Postings};
use crate::query::error::QueryError;
use crate::query::postings::{intersect, union};
use crate::query::resolver::{TermNote, TermResolver};
use crate::utils::Preprocessor;

/// Split a query on whitespace, emitting every parenthesis as its own token
pub fn tokenize(query: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in query.char_indices() {
        if c.is_whitespace() || c == '(' || c == ')' {
            if let Some(s) = start.take() {
                tokens.push(&query[s..i]);
            }
            if !c.is_whitespace() {
                tokens.push(&query[i..i + 1]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&query[s..]);
    }

    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    And,
    Or,
}

impl Operator {
    fn apply(self, a: &[DocId], b: &[DocId]) -> Postings {
        match self {
            Operator::And => intersect(a, b),
            Operator::Or => union(a, b),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

/// A classified query token; terms are already normalized
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Not,
    Op(Operator),
    Term(String),
}

impl Token {
    fn classify(raw: &str, preprocessor: &Preprocessor) -> Self {
        match raw {
            "(" => Token::Open,
            ")" => Token::Close,
            "NOT" => Token::Not,
            "AND" => Token::Op(Operator::And),
            "OR" => Token::Op(Operator::Or),
            term => Token::Term(preprocessor.normalize_term(term)),
        }
    }
}

/// Stack element during reduction
#[derive(Debug)]
enum Item {
    Open,
    Op(Operator),
    /// A resolved list, with the source text it came from for error messages
    Value { postings: Postings, text: String },
}

impl Item {
    fn text(&self) -> &str {
        match self {
            Item::Open => "(",
            Item::Op(op) => op.as_str(),
            Item::Value { text, .. } => text,
        }
    }
}

/// Result of evaluating one query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Matching document ids, ascending
    pub postings: Postings,
    /// Fuzzy substitutions and wildcard expansions, in query order
    pub notes: Vec<TermNote>,
}

/// Check that every `)` closes an open `(` and nothing is left open
fn check_balance(tokens: &[Token]) -> Result<(), QueryError> {
    let mut open = Vec::new();
    for (position, token) in tokens.iter().enumerate() {
        match token {
            Token::Open => open.push(position),
            Token::Close => {
                if open.pop().is_none() {
                    return Err(QueryError::UnbalancedParentheses { position });
                }
            }
            _ => {}
        }
    }
    match open.first() {
        Some(&position) => Err(QueryError::UnbalancedParentheses { position }),
        None => Ok(()),
    }
}

/// Whether the first token is a `(` closed by the last token.
///
/// Expects balanced input.
fn is_enclosed(tokens: &[Token]) -> bool {
    if tokens.first() != Some(&Token::Open) {
        return false;
    }
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Open => depth += 1,
            Token::Close => {
                depth -= 1;
                if depth == 0 {
                    return i == tokens.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Parses and evaluates boolean queries against one index
pub struct QueryParser<'a> {
    resolver: TermResolver<'a>,
    preprocessor: &'a Preprocessor,
}

impl<'a> QueryParser<'a> {
    pub fn new(resolver: TermResolver<'a>, preprocessor: &'a Preprocessor) -> Self {
        Self {
            resolver,
            preprocessor,
        }
    }

    /// Evaluate `query` to the ascending list of matching document ids
    pub fn evaluate(&self, query: &str) -> Result<QueryOutcome, QueryError> {
        let mut tokens: Vec<Token> = tokenize(query)
            .into_iter()
            .map(|raw| Token::classify(raw, self.preprocessor))
            .collect();
        if tokens.is_empty() {
            return Err(QueryError::Empty);
        }

        check_balance(&tokens)?;
        // Error positions refer to the query as written, before wrapping
        let wrapped = !is_enclosed(&tokens);
        if wrapped {
            tokens.insert(0, Token::Open);
            tokens.push(Token::Close);
        }
        log::debug!("Query tokens: {:?}", tokens);

        let mut notes = Vec::new();
        let mut stack: Vec<Item> = Vec::with_capacity(tokens.len());
        let mut iter = tokens.into_iter().enumerate();

        while let Some((position, token)) = iter.next() {
            match token {
                Token::Open => stack.push(Item::Open),
                Token::Op(op) => stack.push(Item::Op(op)),
                Token::Term(term) => {
                    let value = self.resolve(term, false, &mut notes)?;
                    stack.push(value);
                }
                Token::Not => match iter.next() {
                    Some((_, Token::Term(term))) => {
                        let value = self.resolve(term, true, &mut notes)?;
                        stack.push(value);
                    }
                    _ => {
                        return Err(QueryError::MisplacedNot {
                            position: position - usize::from(wrapped),
                        });
                    }
                },
                Token::Close => {
                    let value = reduce_group(&mut stack)?;
                    stack.push(value);
                }
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(Item::Value { postings, .. }), true) => Ok(QueryOutcome { postings, notes }),
            _ => Err(QueryError::MalformedExpression),
        }
    }

    fn resolve(
        &self,
        term: String,
        negated: bool,
        notes: &mut Vec<TermNote>,
    ) -> Result<Item, QueryError> {
        let resolution = self.resolver.resolve(&term, negated)?;
        notes.extend(resolution.note);
        let text = if negated { format!("NOT {}", term) } else { term };
        Ok(Item::Value {
            postings: resolution.postings,
            text,
        })
    }
}

/// Pop back to the matching `(` and collapse the group to a single value
fn reduce_group(stack: &mut Vec<Item>) -> Result<Item, QueryError> {
    let mut group = Vec::new();
    loop {
        match stack.pop() {
            Some(Item::Open) => break,
            Some(item) => group.push(item),
            None => return Err(QueryError::UnbalancedParentheses { position: 0 }),
        }
    }

    // `group` is in pop order: last pushed first
    let well_formed = matches!(
        group.as_slice(),
        [Item::Value { .. }] | [Item::Value { .. }, Item::Op(_), Item::Value { .. }]
    );
    if !well_formed {
        let text: Vec<&str> = group.iter().rev().map(Item::text).collect();
        return Err(QueryError::MalformedGroup {
            group: format!("({})", text.join(" ")),
        });
    }

    let mut items = group.into_iter();
    match (items.next(), items.next(), items.next()) {
        (Some(value), None, None) => Ok(value),
        (
            Some(Item::Value { postings: b, text: tb }),
            Some(Item::Op(op)),
            Some(Item::Value { postings: a, text: ta }),
        ) => Ok(Item::Value {
            postings: op.apply(&a, &b),
            text: format!("({} {} {})", ta, op.as_str(), tb),
        }),
        _ => Err(QueryError::MalformedExpression),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::inverted::InvertedIndex;
    use crate::index::permuterm::{PatternError, PermutermIndex};
    use crate::utils::StemmerKind;

    /// doc 0: macbeth, doc 1: julius, doc 2: both, doc 3: hamlet
    struct Fixture {
        inverted: InvertedIndex,
        permuterm: PermutermIndex,
        universe: Vec<DocId>,
        preprocessor: Preprocessor,
    }

    impl Fixture {
        fn new() -> Self {
            let docs: [&[&str]; 4] = [
                &["macbeth", "witch"],
                &["julius", "caesar"],
                &["macbeth", "julius"],
                &["hamlet", "ghost", "witch"],
            ];
            let mut inverted = InvertedIndex::new();
            let mut permuterm = PermutermIndex::new();
            for (doc, terms) in docs.into_iter().enumerate() {
                inverted.insert_document(doc as DocId, terms);
                for &term in terms {
                    permuterm.insert_token(term);
                }
            }
            Self {
                inverted,
                permuterm,
                universe: (0..docs.len() as DocId).collect(),
                preprocessor: Preprocessor::new(StemmerKind::Identity, true),
            }
        }

        fn eval(&self, query: &str) -> Result<Postings, QueryError> {
            self.outcome(query).map(|o| o.postings)
        }

        fn outcome(&self, query: &str) -> Result<QueryOutcome, QueryError> {
            let resolver = TermResolver::new(&self.inverted, &self.permuterm, &self.universe);
            QueryParser::new(resolver, &self.preprocessor).evaluate(query)
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("(macbeth AND(NOT  julius))"),
            vec!["(", "macbeth", "AND", "(", "NOT", "julius", ")", ")"]
        );
        assert_eq!(tokenize(" a\tOR\nb "), vec!["a", "OR", "b"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_single_term() {
        let fx = Fixture::new();
        assert_eq!(fx.eval("macbeth").unwrap(), vec![0, 2]);
        assert_eq!(fx.eval("(macbeth)").unwrap(), vec![0, 2]);
        assert_eq!(fx.eval("((macbeth))").unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_or() {
        let fx = Fixture::new();
        assert_eq!(fx.eval("(macbeth OR julius)").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_and() {
        let fx = Fixture::new();
        assert_eq!(fx.eval("(macbeth AND julius)").unwrap(), vec![2]);
    }

    #[test]
    fn test_not() {
        let fx = Fixture::new();
        assert_eq!(fx.eval("(NOT macbeth)").unwrap(), vec![1, 3]);
        assert_eq!(fx.eval("NOT macbeth").unwrap(), vec![1, 3]);
        assert_eq!(fx.eval("(witch AND NOT hamlet)").unwrap(), vec![0]);
    }

    #[test]
    fn test_nested_groups() {
        let fx = Fixture::new();
        assert_eq!(
            fx.eval("((macbeth OR julius) AND (NOT caesar))").unwrap(),
            vec![0, 2]
        );
        assert_eq!(
            fx.eval("(macbeth OR (julius AND caesar))").unwrap(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_top_level_wrapping() {
        let fx = Fixture::new();
        assert_eq!(fx.eval("macbeth AND julius").unwrap(), vec![2]);
        // First "(" closes before the end, so the whole query is wrapped
        assert_eq!(fx.eval("(macbeth) AND (julius)").unwrap(), vec![2]);
    }

    #[test]
    fn test_keywords_are_case_sensitive_and_terms_are_not() {
        let fx = Fixture::new();
        assert_eq!(fx.eval("(MACBETH AND Julius)").unwrap(), vec![2]);
        assert!(matches!(
            fx.eval("(macbeth and julius)"),
            Err(QueryError::MalformedGroup { .. })
        ));
    }

    #[test]
    fn test_wildcard_term() {
        let fx = Fixture::new();
        let outcome = fx.outcome("(mac* AND NOT *ius)").unwrap();
        assert_eq!(outcome.postings, vec![0]);
        assert_eq!(outcome.notes.len(), 2);
    }

    #[test]
    fn test_fuzzy_term_reports_substitution() {
        let fx = Fixture::new();
        let outcome = fx.outcome("(macbeht OR hamlet)").unwrap();
        assert_eq!(outcome.postings, vec![0, 2, 3]);
        assert!(matches!(
            &outcome.notes[..],
            [TermNote::Fuzzy { term, substitutes, .. }]
                if term == "macbeht" && substitutes == &["macbeth".to_string()]
        ));
    }

    #[test]
    fn test_empty_query() {
        let fx = Fixture::new();
        assert_eq!(fx.eval(""), Err(QueryError::Empty));
        assert_eq!(fx.eval("  \t "), Err(QueryError::Empty));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let fx = Fixture::new();
        assert_eq!(
            fx.eval("(macbeth AND julius"),
            Err(QueryError::UnbalancedParentheses { position: 0 })
        );
        assert_eq!(
            fx.eval("macbeth)"),
            Err(QueryError::UnbalancedParentheses { position: 1 })
        );
        assert!(matches!(
            fx.eval(")macbeth("),
            Err(QueryError::UnbalancedParentheses { .. })
        ));
    }

    #[test]
    fn test_misplaced_not() {
        let fx = Fixture::new();
        assert_eq!(fx.eval("(macbeth AND NOT)"), Err(QueryError::MisplacedNot { position: 3 }));
        assert_eq!(fx.eval("NOT"), Err(QueryError::MisplacedNot { position: 0 }));
        assert_eq!(fx.eval("macbeth AND NOT"), Err(QueryError::MisplacedNot { position: 2 }));
        assert!(matches!(fx.eval("(NOT NOT macbeth)"), Err(QueryError::MisplacedNot { .. })));
        assert!(matches!(fx.eval("(NOT (macbeth))"), Err(QueryError::MisplacedNot { .. })));
    }

    #[test]
    fn test_malformed_groups() {
        let fx = Fixture::new();
        assert_eq!(
            fx.eval("(macbeth AND julius OR hamlet)"),
            Err(QueryError::MalformedGroup {
                group: "(macbeth AND julius OR hamlet)".to_string()
            })
        );
        assert!(matches!(fx.eval("(macbeth julius)"), Err(QueryError::MalformedGroup { .. })));
        assert!(matches!(fx.eval("()"), Err(QueryError::MalformedGroup { .. })));
        assert!(matches!(fx.eval("(AND macbeth)"), Err(QueryError::MalformedGroup { .. })));
    }

    #[test]
    fn test_malformed_group_shows_nested_text() {
        let fx = Fixture::new();
        assert_eq!(
            fx.eval("((macbeth OR julius) NOT hamlet)"),
            Err(QueryError::MalformedGroup {
                group: "((macbeth OR julius) NOT hamlet)".to_string()
            })
        );
    }

    #[test]
    fn test_multiple_wildcards_rejected() {
        let fx = Fixture::new();
        assert_eq!(
            fx.eval("(m*c*)"),
            Err(QueryError::Pattern(PatternError::MultipleWildcards("m*c*".to_string())))
        );
    }
}
