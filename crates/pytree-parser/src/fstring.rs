//! Parses the body of an f-string literal (the text the lexer captured
//! between the quotes, escapes left undecoded) into the `JoinedStr` value
//! list: literal runs become `Constant::Str` fragments, `{expr}` runs
//! become `FormattedValue` nodes. Format specs are themselves `JoinedStr`
//! values, so `{x:{width}}` recurses through the same code path.
//!
//! Sub-expressions are tokenized and parsed with their own `Lexer`/`Parser`
//! pair, positioned at the interpolation's true offset in the source file
//! via `Lexer::new_with_location` so the resulting nodes need no further
//! position correction.

use crate::error::{ParseError, ParseResult};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::string::decode_str_body;
use pytree_ast::{
    ConversionFlag, Constant, Expr, ExprConstant, ExprFormattedValue, ExprJoinedStr, ExprName,
    ExprContext, Identifier,
};
use pytree_parser_core::{Location, SourceSpan};

struct FCursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    loc: Location,
}

impl<'a> FCursor<'a> {
    fn new(source: &'a str, start: Location) -> Self {
        Self { chars: source.chars().peekable(), loc: start }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.loc.newline();
        } else {
            self.loc.go_right();
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }
}

/// Parses a complete f-string body (the text between the quotes) into its
/// `JoinedStr` values. `is_format_spec` disables `{{`/`}}` escaping, which
/// CPython's format-spec mini-language does not use.
fn parse_values(cur: &mut FCursor<'_>, is_format_spec: bool) -> ParseResult<Vec<Expr>> {
    let mut values = Vec::new();
    let mut literal = String::new();
    let mut literal_start = cur.loc;

    macro_rules! flush_literal {
        () => {
            if !literal.is_empty() {
                let decoded = decode_str_body(&literal, pytree_ast::StringPrefix::Regular)
                    .map_err(|k| ParseError::new(k.to_string(), literal_start))?;
                values.push(Expr::Constant(ExprConstant {
                    span: SourceSpan::new(literal_start, cur.loc),
                    value: Constant::Str(decoded),
                    kind: None,
                }));
                literal.clear();
            }
        };
    }

    loop {
        match cur.peek() {
            None => break,
            Some('{') if !is_format_spec => {
                // `{{` escapes to a literal brace.
                let mut lookahead = cur.chars.clone();
                lookahead.next();
                if lookahead.peek() == Some(&'{') {
                    cur.bump();
                    cur.bump();
                    literal.push('{');
                    continue;
                }
                flush_literal!();
                values.push(parse_interpolation(cur)?);
                literal_start = cur.loc;
            }
            Some('}') if !is_format_spec => {
                let mut lookahead = cur.chars.clone();
                lookahead.next();
                if lookahead.peek() == Some(&'}') {
                    cur.bump();
                    cur.bump();
                    literal.push('}');
                    continue;
                }
                return Err(ParseError::new("single '}' is not allowed in an f-string", cur.loc));
            }
            Some('{') => {
                flush_literal!();
                values.push(parse_interpolation(cur)?);
                literal_start = cur.loc;
            }
            Some(c) => {
                literal.push(c);
                cur.bump();
            }
        }
    }
    flush_literal!();
    Ok(values)
}

/// Consumes one `{expr[!conv][:spec]}` interpolation, `cur` positioned at
/// the opening brace.
fn parse_interpolation(cur: &mut FCursor<'_>) -> ParseResult<Expr> {
    let start = cur.loc;
    cur.bump(); // '{'
    let (text, text_start, stop) = scan_expr_text(cur)?;

    let value = parse_sub_expression(&text, text_start);

    let conversion = if stop == StopReason::Bang {
        cur.bump(); // '!'
        let c = cur.bump();
        match c.and_then(ConversionFlag::from_char) {
            Some(flag) => flag,
            None => return Err(ParseError::new("invalid conversion character", cur.loc)),
        }
    } else {
        ConversionFlag::None
    };

    // a conversion may be followed directly by a format spec too
    let format_spec = if matches!(cur.peek(), Some(':')) {
        cur.bump(); // ':'
        Some(Box::new(parse_format_spec(cur)?))
    } else {
        None
    };

    match cur.peek() {
        Some('}') => {
            cur.bump();
        }
        _ => return Err(ParseError::new("expected '}' to close f-string expression", cur.loc)),
    }

    let span = SourceSpan::new(start, cur.loc);
    Ok(Expr::FormattedValue(ExprFormattedValue {
        span,
        value: Box::new(value),
        conversion,
        format_spec,
    }))
}

fn parse_format_spec(cur: &mut FCursor<'_>) -> ParseResult<Expr> {
    let start = cur.loc;
    let mut depth = 0i32;
    let mut text = String::new();
    loop {
        match cur.peek() {
            None => return Err(ParseError::new("unterminated format spec", cur.loc)),
            Some('{') => {
                depth += 1;
                text.push(cur.bump().unwrap());
            }
            Some('}') if depth > 0 => {
                depth -= 1;
                text.push(cur.bump().unwrap());
            }
            Some('}') => break,
            Some(c) => {
                text.push(c);
                cur.bump();
            }
        }
    }
    let mut inner = FCursor::new(&text, start);
    let values = parse_values(&mut inner, true)?;
    let end = cur.loc;
    Ok(Expr::JoinedStr(ExprJoinedStr { span: SourceSpan::new(start, end), values, kind: None }))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Brace,
    Bang,
}

/// Scans the raw expression text of an interpolation, tracking bracket
/// depth and skipping over nested string literals so an embedded `}` or
/// `:` inside a string or a subscript doesn't end the scan early.
fn scan_expr_text(cur: &mut FCursor<'_>) -> ParseResult<(String, Location, StopReason)> {
    let text_start = cur.loc;
    let mut text = String::new();
    let mut depth = 0i32;
    loop {
        match cur.peek() {
            None => return Err(ParseError::new("unterminated f-string expression", cur.loc)),
            Some('\'') | Some('"') => {
                scan_nested_string(cur, &mut text)?;
            }
            Some(c @ ('(' | '[' | '{')) => {
                depth += 1;
                text.push(c);
                cur.bump();
            }
            Some(c @ (')' | ']')) => {
                depth -= 1;
                text.push(c);
                cur.bump();
            }
            Some('}') if depth == 0 => break,
            Some('}') => {
                depth -= 1;
                text.push('}');
                cur.bump();
            }
            Some('!') if depth == 0 => {
                let mut lookahead = cur.chars.clone();
                lookahead.next();
                if matches!(lookahead.peek(), Some('s') | Some('r') | Some('a')) {
                    let mut la2 = lookahead.clone();
                    la2.next();
                    if matches!(la2.peek(), Some(':') | Some('}')) {
                        return Ok((text, text_start, StopReason::Bang));
                    }
                }
                text.push('!');
                cur.bump();
            }
            Some(':') if depth == 0 => {
                return Ok((text, text_start, StopReason::Brace));
            }
            Some(c) => {
                text.push(c);
                cur.bump();
            }
        }
    }
    Ok((text, text_start, StopReason::Brace))
}

/// Copies a quoted string literal (simple or triple-quoted) verbatim into
/// `text`, without interpreting its contents, so brace/colon scanning
/// above treats it as opaque.
fn scan_nested_string(cur: &mut FCursor<'_>, text: &mut String) -> ParseResult<()> {
    let quote = cur.bump().unwrap();
    text.push(quote);
    let mut lookahead = cur.chars.clone();
    let triple = lookahead.next() == Some(quote) && lookahead.next() == Some(quote);
    if triple {
        text.push(cur.bump().unwrap());
        text.push(cur.bump().unwrap());
    }
    loop {
        match cur.peek() {
            None => return Err(ParseError::new("unterminated string in f-string expression", cur.loc)),
            Some('\\') => {
                text.push(cur.bump().unwrap());
                if let Some(escaped) = cur.bump() {
                    text.push(escaped);
                }
            }
            Some(c) if c == quote => {
                if !triple {
                    text.push(cur.bump().unwrap());
                    return Ok(());
                }
                let mut la = cur.chars.clone();
                la.next();
                if la.next() == Some(quote) {
                    text.push(cur.bump().unwrap());
                    text.push(cur.bump().unwrap());
                    text.push(cur.bump().unwrap());
                    return Ok(());
                }
                text.push(cur.bump().unwrap());
            }
            Some(c) => {
                text.push(c);
                cur.bump();
            }
        }
    }
}

/// Parses `text` (the raw source of an interpolation's expression, already
/// positioned at `start` in the enclosing file) as a full expression.
/// Falls back to a bare `Name` carrying the raw text, per the conservative
/// fallback the error contract describes for interpolations that don't
/// parse as an expression.
fn parse_sub_expression(text: &str, start: Location) -> Expr {
    let trimmed = text.trim();
    let lead = text.len() - text.trim_start().len();
    let sub_start = start.with_col_offset(lead as i32);
    let attempt = Lexer::new_with_location(trimmed, false, sub_start)
        .tokenize()
        .map_err(|e| ParseError::new(e.kind.to_string(), e.location))
        .and_then(|tokens| {
            let mut parser = Parser::new(tokens, false);
            let expr = parser.parse_testlist_star_expr()?;
            parser.expect_tok(&crate::token::Tok::EndOfFile, "end of expression")?;
            Ok(expr)
        });
    match attempt {
        Ok(expr) => expr,
        Err(_) => Expr::Name(ExprName {
            span: SourceSpan::new(start, start.with_col_offset(text.len() as i32)),
            id: Identifier::new(text.to_string(), SourceSpan::new(start, start.with_col_offset(text.len() as i32))),
            ctx: ExprContext::Load,
        }),
    }
}

/// Parses the full body of an f-string literal into its `JoinedStr` value
/// list. `start` is the location of the first character of `body` in the
/// enclosing source file.
pub fn parse_body(body: &str, start: Location, _keep_comments: bool) -> ParseResult<Vec<Expr>> {
    let mut cur = FCursor::new(body, start);
    parse_values(&mut cur, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pytree_ast::Ranged;

    fn at(row: u32, col: u32) -> Location {
        Location::new(row, col)
    }

    #[test]
    fn literal_only_body_is_one_constant() {
        let values = parse_body("hello", at(1, 1), false).unwrap();
        assert_eq!(values.len(), 1);
        assert!(matches!(&values[0], Expr::Constant(c) if matches!(&c.value, Constant::Str(s) if s == "hello")));
    }

    #[test]
    fn escaped_braces_decode_to_literal_braces() {
        let values = parse_body("{{x}}", at(1, 1), false).unwrap();
        assert_eq!(values.len(), 1);
        assert!(matches!(&values[0], Expr::Constant(c) if matches!(&c.value, Constant::Str(s) if s == "{x}")));
    }

    #[test]
    fn simple_interpolation_parses_a_name() {
        let values = parse_body("{x}", at(1, 1), false).unwrap();
        assert_eq!(values.len(), 1);
        match &values[0] {
            Expr::FormattedValue(f) => {
                assert!(matches!(f.value.as_ref(), Expr::Name(n) if n.id.as_str() == "x"));
                assert_eq!(f.conversion, ConversionFlag::None);
            }
            _ => panic!("expected FormattedValue"),
        }
    }

    #[test]
    fn conversion_marker_is_recognized() {
        let values = parse_body("{x!r}", at(1, 1), false).unwrap();
        match &values[0] {
            Expr::FormattedValue(f) => assert_eq!(f.conversion, ConversionFlag::Repr),
            _ => panic!("expected FormattedValue"),
        }
    }

    #[test]
    fn format_spec_is_its_own_joined_str() {
        let values = parse_body("{x:{width}}", at(1, 1), false).unwrap();
        match &values[0] {
            Expr::FormattedValue(f) => {
                let spec = f.format_spec.as_ref().expect("format_spec");
                assert!(matches!(spec.as_ref(), Expr::JoinedStr(_)));
            }
            _ => panic!("expected FormattedValue"),
        }
    }

    #[test]
    fn nested_string_with_brace_does_not_confuse_depth() {
        let values = parse_body(r#"{d["}"]}"#, at(1, 1), false).unwrap();
        assert_eq!(values.len(), 1);
        assert!(matches!(&values[0], Expr::FormattedValue(_)));
    }

    #[test]
    fn unparsable_expression_falls_back_to_raw_name() {
        let values = parse_body("{1 +}", at(1, 1), false).unwrap();
        match &values[0] {
            Expr::FormattedValue(f) => {
                assert!(matches!(f.value.as_ref(), Expr::Name(n) if n.id.as_str() == "1 +"));
            }
            _ => panic!("expected FormattedValue"),
        }
    }

    #[test]
    fn positions_land_in_enclosing_file() {
        let values = parse_body("{x}", at(3, 5), false).unwrap();
        assert_eq!(values[0].span().start, at(3, 5));
    }
}
