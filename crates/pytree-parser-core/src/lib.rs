//! Shared primitives used by the `pytree` lexer, parser, AST and unparser
//! crates: source positions and the generic "error at a location" wrapper.

mod error;
mod location;
mod mode;

pub use error::LocatedError;
pub use location::{Location, SourceSpan};
pub use mode::{Mode, ModeParseError};
