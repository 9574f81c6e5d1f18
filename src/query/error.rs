use crate::index::permuterm::PatternError;
use thiserror::Error;

/// Why a query was rejected. The index is never touched on failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("empty query")]
    Empty,

    #[error("unbalanced parentheses at token {position}")]
    UnbalancedParentheses { position: usize },

    #[error("NOT at token {position} must be followed by a term")]
    MisplacedNot { position: usize },

    /// A parenthesized group that is neither `(x)` nor `(x OP y)`
    #[error("malformed group '{group}': expected '(term)' or '(a AND b)' / '(a OR b)'")]
    MalformedGroup { group: String },

    /// Reduction did not leave exactly one result
    #[error("malformed expression: operands must be grouped with parentheses")]
    MalformedExpression,

    #[error(transparent)]
    Pattern(#[from] PatternError),
}
