//! Error types for parsing, automaton construction and GNFA reduction.

use thiserror::Error;

/// Malformed regular expression text.
///
/// Positions are character offsets (not byte offsets) into the parsed text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A `(` that is never closed.
    #[error("unbalanced parentheses: '(' at {position} is never closed")]
    UnclosedGroup { position: usize },

    /// A `)` without a matching `(`.
    #[error("unbalanced parentheses: ')' at {position} has no matching '('")]
    UnopenedGroup { position: usize },

    /// An operator that has fewer operands than it needs at its own nesting level.
    #[error("operator '{operator}' at {position} is missing an operand")]
    MissingOperand { operator: char, position: usize },
}

/// A snapshot (or builder input) that does not describe a valid automaton.
///
/// No partial automaton is ever produced when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the automaton has no start state")]
    MissingStart,

    #[error("the start state {state} is not a declared state")]
    UnknownStart { state: String },

    #[error("state {state} has a transition to {target}, which is not a declared state")]
    UnknownTarget { state: String, target: String },

    #[error("state {state} uses {symbol:?}, which is not a single non-reserved character")]
    InvalidSymbol { state: String, symbol: String },

    #[error("state {state} has an epsilon transition, which a DFA cannot have")]
    EpsilonInDfa { state: String },

    #[error("the start and accept state of a GNFA must be distinct")]
    StartIsAccept,

    #[error("the GNFA start state has an incoming edge from {from}")]
    IncomingToStart { from: String },

    #[error("the GNFA accept state has an outgoing edge to {to}")]
    OutgoingFromAccept { to: String },

    #[error("the label of edge {from} -> {to} is not a valid regular expression")]
    InvalidLabel {
        from: String,
        to: String,
        #[source]
        source: ParseError,
    },
}

/// A GNFA elimination that violates the structural preconditions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidOperation {
    #[error("invalid operation: cannot eliminate the start state {0}")]
    EliminateStart(String),

    #[error("invalid operation: cannot eliminate the accept state {0}")]
    EliminateAccept(String),

    #[error("invalid operation: state {0} does not exist")]
    UnknownState(String),
}

/// Errors that can occur while reading or writing snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The text is not valid JSON, or does not have the snapshot shape.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// The snapshot is well-formed JSON but does not describe a valid automaton.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Any error produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperation),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_messages() {
        let err = ParseError::MissingOperand {
            operator: '|',
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "operator '|' at 3 is missing an operand"
        );

        let err = ParseError::UnclosedGroup { position: 0 };
        assert!(err.to_string().contains("never closed"));
    }

    #[test]
    fn test_conversions_into_crate_error() {
        let err: Error = ValidationError::MissingStart.into();
        assert!(matches!(err, Error::Validation(ValidationError::MissingStart)));

        let err: Error = InvalidOperation::EliminateStart("start".to_string()).into();
        assert_eq!(
            err.to_string(),
            "invalid operation: cannot eliminate the start state start"
        );
    }
}
