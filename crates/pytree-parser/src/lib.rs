//! Indentation-sensitive lexer and recursive-descent parser for
//! CPython-compatible source text.
//!
//! [`parse`] is the crate's single entry point: it tokenizes `source` with
//! [`lexer::Lexer`], then hands the token stream to [`parser::parse_tokens`].
//! Everything else here (the token vocabulary, string/f-string decoding,
//! the error types) exists to support those two passes.

mod error;
mod fstring;
mod lexer;
mod parser;
mod string;
mod token;

pub use error::{Error, LexError, LexErrorKind, LexResult, ParseError, ParseResult, UnparseError};
pub use lexer::Lexer;
pub use token::{keyword, Tok, Token};

use pytree_ast::{Expr, Mod, ModExpression, ModInteractive};
use pytree_parser_core::{Location, Mode};

/// A `(major, minor)` Python release, e.g. `FeatureVersion::new(3, 11)`.
/// Purely advisory: nothing in the lexer or parser consults it, since the
/// grammar already accepts the union of 3.8–3.12 syntax regardless of what
/// a caller declares here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureVersion {
    pub major: u8,
    pub minor: u8,
}

impl FeatureVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

/// Options controlling a single [`parse`] call. `filename` only affects
/// error messages that embed it (location tracking itself is relative to
/// the start of `source`, not any file on disk); `mode` selects which
/// [`Mod`] variant is produced, mirroring CPython's `compile()` modes.
#[derive(Clone, Debug)]
pub struct ParseOptions {
    pub mode: Mode,
    pub filename: String,
    /// When true, comments survive tokenization as standalone `StmtComment`
    /// nodes (or, for inline ones, attached to the preceding statement)
    /// instead of being discarded as trivia.
    pub keep_comments: bool,
    /// The dialect a caller believes it is feeding the parser. Recorded
    /// but never consulted -- see [`FeatureVersion`].
    pub feature_version: Option<FeatureVersion>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Module,
            filename: "<unknown>".to_string(),
            keep_comments: false,
            feature_version: None,
        }
    }
}

impl ParseOptions {
    pub fn new(mode: Mode) -> Self {
        Self { mode, ..Self::default() }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_comments(mut self, keep_comments: bool) -> Self {
        self.keep_comments = keep_comments;
        self
    }

    pub fn with_feature_version(mut self, version: FeatureVersion) -> Self {
        self.feature_version = Some(version);
        self
    }
}

/// Parses `source` per `options.mode`, producing the corresponding [`Mod`]
/// variant. `options.filename` is carried only for error reporting further
/// up the stack; this crate's own errors report a [`Location`] rather than
/// a filename.
pub fn parse(source: &str, options: ParseOptions) -> Result<Mod, Error> {
    tracing::debug!(
        mode = ?options.mode,
        filename = %options.filename,
        feature_version = ?options.feature_version,
        "parsing source"
    );
    let tokens = Lexer::new(source, options.keep_comments).tokenize()?;
    match options.mode {
        Mode::Module => Ok(parser::parse_tokens(tokens, options.keep_comments)?),
        Mode::Expression => Ok(parse_single_expression(tokens)?),
        Mode::Interactive => Ok(parse_interactive(tokens, options.keep_comments)?),
    }
}

/// Parses `source` as a module body with default options (no comments
/// retained, `Mode::Module`). The common case callers reach for.
pub fn parse_module(source: &str) -> Result<Mod, Error> {
    parse(source, ParseOptions::default())
}

fn parse_single_expression(tokens: Vec<Token>) -> ParseResult<Mod> {
    use pytree_ast::Ranged;
    let start = tokens.first().map(|t| t.span.start).unwrap_or_else(Location::start);
    let mut parser = parser::Parser::new(tokens, false);
    let body: Box<Expr> = Box::new(parser.parse_testlist_star_expr()?);
    parser.expect_tok(&Tok::EndOfFile, "end of expression")?;
    let end = body.span().end;
    Ok(Mod::Expression(ModExpression { span: pytree_parser_core::SourceSpan::new(start, end), body }))
}

/// A single interactive statement (what a REPL evaluates per input):
/// CPython's `single` mode accepts exactly one (possibly `;`-separated)
/// logical line rather than a whole file.
fn parse_interactive(tokens: Vec<Token>, keep_comments: bool) -> ParseResult<Mod> {
    let start = tokens.first().map(|t| t.span.start).unwrap_or_else(Location::start);
    let mut parser = parser::Parser::new(tokens, keep_comments);
    let body = parser.parse_one_interactive_statement_line()?;
    let end = parser.last_consumed_end();
    Ok(Mod::Interactive(ModInteractive { span: pytree_parser_core::SourceSpan::new(start, end), body }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_source() {
        let module = parse_module("x = 1\ny = x + 1\n").unwrap();
        match module {
            Mod::Module(m) => assert_eq!(m.body.len(), 2),
            _ => panic!("expected Module"),
        }
    }

    #[test]
    fn parses_single_expression_mode() {
        let result = parse("1 + 2\n", ParseOptions::new(Mode::Expression)).unwrap();
        assert!(matches!(result, Mod::Expression(_)));
    }

    #[test]
    fn parses_interactive_mode() {
        let result = parse("print(1)\n", ParseOptions::new(Mode::Interactive)).unwrap();
        match result {
            Mod::Interactive(m) => assert_eq!(m.body.len(), 1),
            _ => panic!("expected Interactive"),
        }
    }

    #[test]
    fn lex_error_propagates_through_parse() {
        let err = parse_module("x = \"unterminated\n");
        assert!(err.is_err());
    }

    #[test]
    fn keep_comments_promotes_standalone_comments() {
        let module = parse("# a comment\nx = 1\n", ParseOptions::default().with_comments(true)).unwrap();
        match module {
            Mod::Module(m) => assert!(m.body.iter().any(|s| matches!(s, pytree_ast::Stmt::Comment(_)))),
            _ => panic!("expected Module"),
        }
    }

    #[test]
    fn feature_version_is_advisory_only() {
        let with_version =
            ParseOptions::default().with_feature_version(FeatureVersion::new(3, 8));
        let without_version = ParseOptions::default();
        assert_eq!(with_version.feature_version, Some(FeatureVersion::new(3, 8)));
        assert_eq!(without_version.feature_version, None);
        // Same source parses identically regardless of the declared dialect.
        let a = parse("match x:\n    case 1:\n        pass\n", with_version).unwrap();
        let b = parse("match x:\n    case 1:\n        pass\n", without_version).unwrap();
        assert_eq!(a, b);
    }
}
