//! An indentation-sensitive, single-pass tokenizer. Mirrors the scan loop
//! from the data model almost line for line: an indent stack, three
//! bracket-nesting counters, and a cursor that never looks behind itself.

use crate::error::{LexErrorKind, LexResult};
use crate::string::{decode_bytes_body, decode_str_body};
use crate::token::{keyword, Tok, Token};
use pytree_ast::{QuoteStyle, StringKind, StringPrefix};
use pytree_parser_core::{Location, SourceSpan};

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    loc: Location,
    at_line_start: bool,
    paren_depth: u32,
    bracket_depth: u32,
    brace_depth: u32,
    indents: Vec<u32>,
    pending_dedents: u32,
    keep_comments: bool,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, keep_comments: bool) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            loc: Location::start(),
            at_line_start: true,
            paren_depth: 0,
            bracket_depth: 0,
            brace_depth: 0,
            indents: vec![0],
            pending_dedents: 0,
            keep_comments,
            done: false,
        }
    }

    /// Tokenizes a bare expression fragment (an f-string interpolation's
    /// expression text) whose first character does not begin a logical
    /// line: indentation tracking is disabled and positions are reported
    /// relative to `start` rather than `Location::start()`, so the
    /// resulting tokens land at their true position in the enclosing file.
    pub fn new_with_location(source: &'a str, keep_comments: bool, start: Location) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            loc: start,
            at_line_start: false,
            paren_depth: 0,
            bracket_depth: 0,
            brace_depth: 0,
            indents: vec![0],
            pending_dedents: 0,
            keep_comments,
            done: false,
        }
    }

    fn nesting(&self) -> u32 {
        self.paren_depth + self.bracket_depth + self.brace_depth
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

    fn peek2(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next()
    }

    fn emit(&self, kind: Tok, start: Location) -> Token {
        Token::new(kind, SourceSpan::new(start, self.loc))
    }

    /// Tokenizes the whole source into a flat vector, per the lexer's
    /// "token model" contract: a finite in-order sequence ending in EOF.
    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        let mut out = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.kind == Tok::EndOfFile;
            if self.keep_comments || !tok.kind.is_trivia() {
                out.push(tok);
            }
            if is_eof {
                break;
            }
        }
        Ok(out)
    }

    fn next_token(&mut self) -> LexResult<Token> {
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            return Ok(self.emit(Tok::Dedent, self.loc));
        }
        if self.at_line_start && self.nesting() == 0 {
            if let Some(tok) = self.handle_indentation()? {
                return Ok(tok);
            }
        }
        self.at_line_start = false;
        self.skip_non_newline_whitespace();

        let start = self.loc;
        let Some(c) = self.peek() else {
            return self.handle_eof();
        };

        if c == '#' {
            return Ok(self.scan_comment(start));
        }
        if c == '\n' || c == '\r' {
            return Ok(self.scan_newline(start));
        }
        if c == '\\' && matches!(self.peek2(), Some('\n') | Some('\r')) {
            self.bump();
            self.bump();
            if self.peek() == Some('\n') {
                self.bump();
            }
            return self.next_token();
        }
        if is_ident_start(c) {
            return self.scan_name_or_string_prefix(start);
        }
        if c.is_ascii_digit() || (c == '.' && self.peek2().is_some_and(|d| d.is_ascii_digit())) {
            return self.scan_number(start);
        }
        if c == '\'' || c == '"' {
            return self.scan_string(start, StringPrefix::Regular);
        }
        self.scan_operator(start)
    }

    fn handle_eof(&mut self) -> LexResult<Token> {
        if self.done {
            return Ok(self.emit(Tok::EndOfFile, self.loc));
        }
        if self.indents.len() > 1 {
            self.indents.pop();
            return Ok(self.emit(Tok::Dedent, self.loc));
        }
        self.done = true;
        Ok(self.emit(Tok::EndOfFile, self.loc))
    }

    fn handle_indentation(&mut self) -> LexResult<Option<Token>> {
        let start = self.loc;
        let mut width = 0u32;
        loop {
            match self.peek() {
                Some(' ') => {
                    width += 1;
                    self.bump();
                }
                Some('\t') => {
                    width += 8 - (width % 8);
                    self.bump();
                }
                Some('\x0c') => {
                    self.bump();
                }
                _ => break,
            }
        }
        match self.peek() {
            None => {
                self.at_line_start = false;
                return Ok(None);
            }
            Some('\n') | Some('\r') | Some('#') => {
                // blank or comment-only line: indentation is not adjusted
                self.at_line_start = false;
                return Ok(None);
            }
            _ => {}
        }
        self.at_line_start = false;
        let top = *self.indents.last().unwrap();
        if width > top {
            self.indents.push(width);
            return Ok(Some(self.emit(Tok::Indent, start)));
        }
        if width < top {
            let mut count = 0;
            while *self.indents.last().unwrap() > width {
                self.indents.pop();
                count += 1;
            }
            if *self.indents.last().unwrap() != width {
                return Err(crate::error::LexError::new(LexErrorKind::InconsistentIndentation, start));
            }
            self.pending_dedents = count - 1;
            return Ok(Some(self.emit(Tok::Dedent, start)));
        }
        Ok(None)
    }

    fn skip_non_newline_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\x0c')) {
            self.bump();
        }
    }

    fn scan_comment(&mut self, start: Location) -> Token {
        let mut text = String::from("#");
        self.bump();
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            text.push(c);
            self.bump();
        }
        self.emit(Tok::Comment(text), start)
    }

    fn scan_newline(&mut self, start: Location) -> Token {
        if self.peek() == Some('\r') {
            self.bump();
        }
        if self.peek() == Some('\n') {
            self.bump();
        }
        self.at_line_start = true;
        if self.nesting() == 0 {
            self.emit(Tok::Newline, start)
        } else {
            self.emit(Tok::NonLogicalNewline, start)
        }
    }

    fn scan_name_or_string_prefix(&mut self, start: Location) -> LexResult<Token> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                ident.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if ident.len() <= 2 {
            if let Some(prefix) = StringPrefix::from_lexeme(&ident.to_ascii_lowercase()) {
                if matches!(self.peek(), Some('\'') | Some('"')) {
                    return self.scan_string(start, prefix);
                }
            }
        }
        if let Some(kw) = keyword(&ident) {
            return Ok(self.emit(kw, start));
        }
        Ok(self.emit(Tok::Name(ident), start))
    }

    fn scan_string(&mut self, start: Location, prefix: StringPrefix) -> LexResult<Token> {
        let quote_char = self.peek().unwrap();
        let quote = if quote_char == '\'' { QuoteStyle::Single } else { QuoteStyle::Double };
        self.bump();
        let triple = self.peek() == Some(quote_char) && self.peek2() == Some(quote_char);
        if triple {
            self.bump();
            self.bump();
        }
        let kind = StringKind::new(prefix, quote, triple);
        let mut body = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(crate::error::LexError::new(
                        if triple { LexErrorKind::UnterminatedTripleString } else { LexErrorKind::UnterminatedString },
                        start,
                    ))
                }
                Some('\\') => {
                    body.push('\\');
                    self.bump();
                    if let Some(escaped) = self.peek() {
                        body.push(escaped);
                        self.bump();
                    }
                }
                Some(c) if c == quote_char => {
                    if !triple {
                        self.bump();
                        break;
                    }
                    if self.peek2() == Some(quote_char) {
                        let mut clone = self.chars.clone();
                        clone.next();
                        clone.next();
                        if clone.peek() == Some(&quote_char) {
                            self.bump();
                            self.bump();
                            self.bump();
                            break;
                        }
                    }
                    body.push(c);
                    self.bump();
                }
                Some('\n') if !triple => {
                    return Err(crate::error::LexError::new(LexErrorKind::UnterminatedString, start));
                }
                Some(c) => {
                    body.push(c);
                    self.bump();
                }
            }
        }

        if prefix.is_fstring() {
            return Ok(self.emit(Tok::FStringRaw { body, kind }, start));
        }
        if prefix.is_bytes() {
            let value = decode_bytes_body(&body, prefix)
                .map_err(|k| crate::error::LexError::new(k, start))?;
            return Ok(self.emit(Tok::Bytes { value, kind }, start));
        }
        let value = decode_str_body(&body, prefix).map_err(|k| crate::error::LexError::new(k, start))?;
        Ok(self.emit(Tok::String { value, kind }, start))
    }

    fn scan_number(&mut self, start: Location) -> LexResult<Token> {
        let mut text = String::new();
        if self.peek() == Some('0') && matches!(self.peek2(), Some('x') | Some('X')) {
            text.push(self.bump().unwrap());
            text.push(self.bump().unwrap());
            self.scan_digits(&mut text, |c| c.is_ascii_hexdigit());
            let n = i64::from_str_radix(&text[2..].replace('_', ""), 16)
                .unwrap_or(i64::MAX);
            return Ok(self.emit(Tok::Int(n), start));
        }
        if self.peek() == Some('0') && matches!(self.peek2(), Some('o') | Some('O')) {
            text.push(self.bump().unwrap());
            text.push(self.bump().unwrap());
            self.scan_digits(&mut text, |c| ('0'..='7').contains(&c));
            let n = i64::from_str_radix(&text[2..].replace('_', ""), 8).unwrap_or(i64::MAX);
            return Ok(self.emit(Tok::Int(n), start));
        }
        if self.peek() == Some('0') && matches!(self.peek2(), Some('b') | Some('B')) {
            text.push(self.bump().unwrap());
            text.push(self.bump().unwrap());
            self.scan_digits(&mut text, |c| c == '0' || c == '1');
            let n = i64::from_str_radix(&text[2..].replace('_', ""), 2).unwrap_or(i64::MAX);
            return Ok(self.emit(Tok::Int(n), start));
        }

        self.scan_digits(&mut text, |c| c.is_ascii_digit());
        let mut is_float = false;
        if self.peek() == Some('.') && self.peek2().is_some_and(|c| c.is_ascii_digit() || c == 'e' || c == 'E') || (self.peek() == Some('.') && !self.peek2().is_some_and(is_ident_start)) {
            is_float = true;
            text.push(self.bump().unwrap());
            self.scan_digits(&mut text, |c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e') | Some('E'))
            && matches!(self.peek2(), Some(c) if c.is_ascii_digit() || c == '+' || c == '-')
        {
            is_float = true;
            text.push(self.bump().unwrap());
            if matches!(self.peek(), Some('+') | Some('-')) {
                text.push(self.bump().unwrap());
            }
            self.scan_digits(&mut text, |c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('j') | Some('J')) {
            self.bump();
            let imag: f64 = text.replace('_', "").parse().unwrap_or(0.0);
            return Ok(self.emit(Tok::Complex { real: 0.0, imag }, start));
        }
        let cleaned = text.replace('_', "");
        if is_float {
            let f: f64 = cleaned.parse().unwrap_or(f64::NAN);
            Ok(self.emit(Tok::Float(f), start))
        } else {
            let n: i64 = cleaned.parse().unwrap_or(i64::MAX);
            Ok(self.emit(Tok::Int(n), start))
        }
    }

    fn scan_digits(&mut self, text: &mut String, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if pred(c) {
                text.push(c);
                self.bump();
            } else if c == '_' && self.peek2().is_some_and(&pred) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn scan_operator(&mut self, start: Location) -> LexResult<Token> {
        let c = self.bump().unwrap();
        macro_rules! two {
            ($second:expr, $tok2:expr, $tok1:expr) => {{
                if self.peek() == Some($second) {
                    self.bump();
                    $tok2
                } else {
                    $tok1
                }
            }};
        }
        let tok = match c {
            '(' => {
                self.paren_depth += 1;
                Tok::Lpar
            }
            ')' => {
                self.paren_depth = self.paren_depth.saturating_sub(1);
                Tok::Rpar
            }
            '[' => {
                self.bracket_depth += 1;
                Tok::Lsqb
            }
            ']' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                Tok::Rsqb
            }
            '{' => {
                self.brace_depth += 1;
                Tok::Lbrace
            }
            '}' => {
                self.brace_depth = self.brace_depth.saturating_sub(1);
                Tok::Rbrace
            }
            ',' => Tok::Comma,
            ':' => two!('=', Tok::ColonEqual, Tok::Colon),
            ';' => Tok::Semi,
            '~' => Tok::Tilde,
            '+' => two!('=', Tok::PlusEqual, Tok::Plus),
            '-' => {
                if self.peek() == Some('>') {
                    self.bump();
                    Tok::Arrow
                } else {
                    two!('=', Tok::MinusEqual, Tok::Minus)
                }
            }
            '*' => {
                if self.peek() == Some('*') {
                    self.bump();
                    two!('=', Tok::DoubleStarEqual, Tok::DoubleStar)
                } else {
                    two!('=', Tok::StarEqual, Tok::Star)
                }
            }
            '/' => {
                if self.peek() == Some('/') {
                    self.bump();
                    two!('=', Tok::DoubleSlashEqual, Tok::DoubleSlash)
                } else {
                    two!('=', Tok::SlashEqual, Tok::Slash)
                }
            }
            '%' => two!('=', Tok::PercentEqual, Tok::Percent),
            '@' => two!('=', Tok::AtEqual, Tok::At),
            '&' => two!('=', Tok::AmperEqual, Tok::Amper),
            '|' => two!('=', Tok::VbarEqual, Tok::Vbar),
            '^' => two!('=', Tok::CircumflexEqual, Tok::Circumflex),
            '<' => {
                if self.peek() == Some('<') {
                    self.bump();
                    two!('=', Tok::LShiftEqual, Tok::LShift)
                } else {
                    two!('=', Tok::LessEqual, Tok::Less)
                }
            }
            '>' => {
                if self.peek() == Some('>') {
                    self.bump();
                    two!('=', Tok::RShiftEqual, Tok::RShift)
                } else {
                    two!('=', Tok::GreaterEqual, Tok::Greater)
                }
            }
            '=' => two!('=', Tok::EqEqual, Tok::Equal),
            '!' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Tok::NotEqual
                } else {
                    return Err(crate::error::LexError::new(LexErrorKind::UnexpectedCharacter(c), start));
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek2() == Some('.') {
                    self.bump();
                    self.bump();
                    Tok::Ellipsis
                } else {
                    Tok::Dot
                }
            }
            other => return Err(crate::error::LexError::new(LexErrorKind::UnexpectedCharacter(other), start)),
        };
        Ok(self.emit(tok, start))
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Tok> {
        Lexer::new(src, false).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn simple_assignment() {
        let toks = kinds("x = 1\n");
        assert_eq!(toks, vec![Tok::Name("x".into()), Tok::Equal, Tok::Int(1), Tok::Newline, Tok::EndOfFile]);
    }

    #[test]
    fn indentation_emits_indent_and_dedent() {
        let toks = kinds("if x:\n    pass\n");
        assert!(toks.contains(&Tok::Indent));
        assert!(toks.contains(&Tok::Dedent));
    }

    #[test]
    fn bracket_nesting_suppresses_newline() {
        let toks = kinds("f(1,\n2)\n");
        let newline_count = toks.iter().filter(|t| **t == Tok::Newline).count();
        assert_eq!(newline_count, 1);
    }

    #[test]
    fn keywords_are_recognized() {
        assert_eq!(kinds("pass\n")[0], Tok::Pass);
        assert_eq!(kinds("True\n")[0], Tok::True);
    }

    #[test]
    fn string_prefix_is_recognized() {
        let toks = kinds("r'a\\nb'\n");
        assert!(matches!(&toks[0], Tok::String { value, .. } if value == "a\\nb"));
    }

    #[test]
    fn empty_source_yields_only_eof() {
        assert_eq!(kinds(""), vec![Tok::EndOfFile]);
    }

    #[test]
    fn inconsistent_indentation_is_an_error() {
        let result = Lexer::new("if x:\n    pass\n  pass\n", false).tokenize();
        assert!(result.is_err());
    }
}
