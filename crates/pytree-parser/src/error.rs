//! The three error kinds named in the error contract, each carrying a
//! location the way `LocatedError<T>` wraps one, but expressed as a
//! `thiserror` enum so each variant gets its own `Display` message instead
//! of a single generic wrapper.

use pytree_parser_core::Location;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated triple-quoted string literal")]
    UnterminatedTripleString,
    #[error("unindent does not match any outer indentation level")]
    InconsistentIndentation,
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("invalid numeric literal")]
    InvalidNumericLiteral,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{kind} at {location}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: Location,
}

impl LexError {
    pub fn new(kind: LexErrorKind, location: Location) -> Self {
        Self { kind, location }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message} at {location}")]
pub struct ParseError {
    pub message: String,
    pub location: Location,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self { message: message.into(), location }
    }
}

/// Reserved for malformed input trees handed to the unparser (a required
/// field missing its invariant, e.g. a `Compare` with mismatched `ops`/
/// `comparators` lengths). The unparser is otherwise total.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct UnparseError {
    pub message: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Unparse(#[from] UnparseError),
}

pub type LexResult<T> = Result<T, LexError>;
pub type ParseResult<T> = Result<T, ParseError>;
