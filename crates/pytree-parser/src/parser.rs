//! The recursive-descent, precedence-climbing parser. Turns the flat token
//! vector the lexer produces into the typed tree `pytree_ast` defines.
//!
//! The parser is single-pass over an owned `Vec<Token>` and holds nothing
//! but a cursor into it, a `keep_comments` flag, and a small buffer of
//! comments seen while parsing an expression (flushed into the enclosing
//! statement list once the statement that contains them is done). There is
//! no backtracking: every `parse_*` function commits to the production it
//! started once it has consumed the token that identifies it.

use crate::error::{ParseError, ParseResult};
use crate::token::{Tok, Token};
use pytree_ast::*;
use pytree_parser_core::{Location, SourceSpan};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    keep_comments: bool,
    pending_comments: Vec<Comment>,
    last_end: Location,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, keep_comments: bool) -> Self {
        let last_end = tokens.first().map(|t| t.span.start).unwrap_or_else(Location::start);
        Self { tokens, pos: 0, keep_comments, pending_comments: Vec::new(), last_end }
    }

    // -- low-level cursor -------------------------------------------------

    fn raw_kind(&self) -> &Tok {
        &self.tokens[self.pos].kind
    }

    fn raw_span(&self) -> SourceSpan {
        self.tokens[self.pos].span
    }

    /// Skips tokens that never carry grammar meaning inside an expression:
    /// suppressed newlines from open brackets, and comments (which get
    /// buffered rather than discarded). Statement-boundary code deliberately
    /// reads `raw_kind`/`raw_span` directly instead of going through this, so
    /// it can tell a same-line trailing comment from a standalone one.
    fn skip_trivia(&mut self) {
        loop {
            match &self.tokens[self.pos].kind {
                Tok::NonLogicalNewline => self.pos += 1,
                Tok::Comment(text) => {
                    let span = self.tokens[self.pos].span;
                    self.pending_comments.push(Comment { span, text: text.clone(), inline: false });
                    self.pos += 1;
                }
                _ => break,
            }
        }
    }

    fn cur(&mut self) -> &Tok {
        self.skip_trivia();
        &self.tokens[self.pos].kind
    }

    fn cur_span(&mut self) -> SourceSpan {
        self.skip_trivia();
        self.tokens[self.pos].span
    }

    fn bump(&mut self) -> Token {
        self.skip_trivia();
        let tok = self.tokens[self.pos].clone();
        self.last_end = tok.span.end;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at(&mut self, tok: &Tok) -> bool {
        self.cur() == tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.at(tok) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn expect_tok(&mut self, tok: &Tok, what: &str) -> ParseResult<Token> {
        if self.at(tok) {
            Ok(self.bump())
        } else {
            let found = self.cur().clone();
            let loc = self.cur_span().start;
            Err(ParseError::new(format!("expected {what}, found {found:?}"), loc))
        }
    }

    fn error(&mut self, message: impl Into<String>) -> ParseError {
        let loc = self.cur_span().start;
        ParseError::new(message, loc)
    }

    fn span_from(&self, start: Location) -> SourceSpan {
        SourceSpan::new(start, self.last_end)
    }

    pub fn last_consumed_end(&self) -> Location {
        self.last_end
    }

    /// Parses exactly one interactive-mode statement group (a single
    /// compound statement, or a `;`-separated run of simple statements on
    /// one logical line) -- what a REPL would evaluate for one input.
    pub fn parse_one_interactive_statement_line(&mut self) -> ParseResult<Vec<Stmt>> {
        while matches!(self.raw_kind(), Tok::Newline | Tok::NonLogicalNewline) {
            self.pos += 1;
        }
        let stmts = self.parse_statement_group()?;
        self.expect_tok(&Tok::EndOfFile, "end of input")?;
        Ok(stmts)
    }

    fn eat_name(&mut self) -> ParseResult<(String, SourceSpan)> {
        let span = self.cur_span();
        match self.cur().clone() {
            Tok::Name(id) => {
                self.bump();
                Ok((id, span))
            }
            other => Err(self.error(format!("expected a name, found {other:?}"))),
        }
    }

    fn identifier(&mut self) -> ParseResult<Identifier> {
        let (id, span) = self.eat_name()?;
        Ok(Identifier::new(id, span))
    }

    /// Drains any comments buffered while parsing the statement(s) just
    /// completed into standalone `Comment` statements. Comments collected
    /// mid-expression (the "closes the bracket group" case from the data
    /// model) land here rather than as a precise inline attachment.
    fn flush_pending_comments(&mut self, body: &mut Vec<Stmt>) {
        if self.pending_comments.is_empty() {
            return;
        }
        for comment in std::mem::take(&mut self.pending_comments) {
            body.push(Stmt::Comment(StmtComment { span: comment.span, comment }));
        }
    }

    /// Checks whether a comment sits directly at the cursor, i.e. on the
    /// same physical line as whatever was just parsed (no intervening
    /// NEWLINE token). If so, consumes it and returns it as an inline
    /// comment.
    fn take_inline_comment(&mut self) -> Option<Comment> {
        if let Tok::Comment(text) = self.raw_kind().clone() {
            let span = self.raw_span();
            self.pos += 1;
            self.last_end = span.end;
            Some(Comment { span, text, inline: true })
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------
// Module entry points
// ---------------------------------------------------------------------

/// Parses a complete token stream (already ending in `EndOfFile`) as a
/// module body.
pub fn parse_tokens(tokens: Vec<Token>, keep_comments: bool) -> ParseResult<Mod> {
    let mut parser = Parser::new(tokens, keep_comments);
    let start = parser.cur_span().start;
    let body = parser.parse_statements(|t| *t == Tok::EndOfFile)?;
    let end = parser.cur_span().start;
    Ok(Mod::Module(ModModule { span: SourceSpan::new(start, end), body }))
}

impl Parser {
    /// Parses statements until `is_end` matches the raw token at the
    /// cursor (never consuming that terminator).
    fn parse_statements(&mut self, is_end: impl Fn(&Tok) -> bool) -> ParseResult<Vec<Stmt>> {
        let mut body = Vec::new();
        loop {
            self.flush_pending_comments(&mut body);
            loop {
                match self.raw_kind() {
                    Tok::Newline => {
                        self.pos += 1;
                    }
                    Tok::NonLogicalNewline => {
                        self.pos += 1;
                    }
                    _ => break,
                }
            }
            if let Tok::Comment(text) = self.raw_kind().clone() {
                let span = self.raw_span();
                self.pos += 1;
                if self.keep_comments {
                    body.push(Stmt::Comment(StmtComment {
                        span,
                        comment: Comment { span, text, inline: false },
                    }));
                }
                continue;
            }
            if is_end(self.raw_kind()) {
                break;
            }
            body.extend(self.parse_statement_group()?);
        }
        self.flush_pending_comments(&mut body);
        Ok(body)
    }

    /// One entry in a statement list: a single compound statement, or every
    /// `;`-separated simple statement on one logical line.
    fn parse_statement_group(&mut self) -> ParseResult<Vec<Stmt>> {
        match self.cur().clone() {
            Tok::At | Tok::Def | Tok::Async | Tok::Class | Tok::If | Tok::While | Tok::For | Tok::Try | Tok::With
            | Tok::Match => Ok(vec![self.parse_statement()?]),
            _ => self.parse_simple_statement_line(),
        }
    }

    /// Parses the suite following a compound statement's `:`: either a
    /// single simple-statement line, or NEWLINE INDENT stmt+ DEDENT.
    fn parse_suite(&mut self, is_match: bool) -> ParseResult<(Vec<Stmt>, Option<Comment>)> {
        let inline = self.take_inline_comment();
        if self.eat(&Tok::Newline) {
            self.expect_tok(&Tok::Indent, "an indented block")?;
            let body = self.parse_statements(|t| *t == Tok::Dedent)?;
            self.expect_tok(&Tok::Dedent, "dedent")?;
            Ok((body, inline))
        } else if is_match {
            Err(self.error("expected an indented block"))
        } else {
            let body = self.parse_simple_statement_line()?;
            Ok((body, inline))
        }
    }

    // -- statement dispatch -------------------------------------------------

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.cur().clone() {
            Tok::At => self.parse_decorated(),
            Tok::Def => self.parse_function_def(Vec::new(), false),
            Tok::Async => self.parse_async_statement(Vec::new()),
            Tok::Class => self.parse_class_def(Vec::new()),
            Tok::If => self.parse_if(),
            Tok::While => self.parse_while(),
            Tok::For => self.parse_for(false),
            Tok::Try => self.parse_try(),
            Tok::With => self.parse_with(false),
            Tok::Match => self.parse_match(),
            _ => {
                let mut stmts = self.parse_simple_statement_line()?;
                Ok(stmts.pop().expect("simple statement line is never empty"))
            }
        }
    }

    fn parse_decorated(&mut self) -> ParseResult<Stmt> {
        let mut decorators = Vec::new();
        while self.eat(&Tok::At) {
            let expr = self.parse_test_or_named()?;
            decorators.push(expr);
            self.expect_tok(&Tok::Newline, "newline after decorator")?;
        }
        match self.cur().clone() {
            Tok::Def => self.parse_function_def(decorators, false),
            Tok::Async => self.parse_async_statement(decorators),
            Tok::Class => self.parse_class_def(decorators),
            _ => Err(self.error("expected a function or class definition after decorator")),
        }
    }

    fn parse_async_statement(&mut self, decorators: Vec<Expr>) -> ParseResult<Stmt> {
        let start = self.cur_span().start;
        self.bump(); // 'async'
        match self.cur().clone() {
            Tok::Def => self.parse_function_def(decorators, true),
            Tok::For => self.parse_for(true),
            Tok::With => self.parse_with(true),
            _ => {
                let _ = start;
                Err(self.error("expected 'def', 'for' or 'with' after 'async'"))
            }
        }
    }

    // -- function / class definitions ---------------------------------------

    fn parse_function_def(&mut self, decorator_list: Vec<Expr>, is_async: bool) -> ParseResult<Stmt> {
        let start = decorator_list.first().map(|d| d.span().start).unwrap_or(self.cur_span().start);
        self.bump(); // 'def' (and the already-consumed 'async' if is_async)
        let name = self.identifier()?;
        let type_params = self.parse_optional_type_params()?;
        self.expect_tok(&Tok::Lpar, "'(' in function definition")?;
        let args = self.parse_parameters(Tok::Rpar)?;
        self.expect_tok(&Tok::Rpar, "')'")?;
        let returns = if self.eat(&Tok::Arrow) {
            Some(Box::new(self.parse_test_or_named()?))
        } else {
            None
        };
        self.expect_tok(&Tok::Colon, "':' after function signature")?;
        let (body, inline_comment) = self.parse_suite(false)?;
        let span = self.span_from(start);
        if is_async {
            Ok(Stmt::AsyncFunctionDef(StmtAsyncFunctionDef {
                span,
                name,
                type_params,
                args: Box::new(args),
                body,
                decorator_list,
                returns,
                type_comment: None,
                inline_comment,
            }))
        } else {
            Ok(Stmt::FunctionDef(StmtFunctionDef {
                span,
                name,
                type_params,
                args: Box::new(args),
                body,
                decorator_list,
                returns,
                type_comment: None,
                inline_comment,
            }))
        }
    }

    fn parse_class_def(&mut self, decorator_list: Vec<Expr>) -> ParseResult<Stmt> {
        let start = decorator_list.first().map(|d| d.span().start).unwrap_or(self.cur_span().start);
        self.bump(); // 'class'
        let name = self.identifier()?;
        let type_params = self.parse_optional_type_params()?;
        let mut bases = Vec::new();
        let mut keywords = Vec::new();
        if self.eat(&Tok::Lpar) {
            self.parse_call_arguments(&mut bases, &mut keywords, &Tok::Rpar)?;
            self.expect_tok(&Tok::Rpar, "')'")?;
        }
        self.expect_tok(&Tok::Colon, "':' after class header")?;
        let (body, inline_comment) = self.parse_suite(false)?;
        Ok(Stmt::ClassDef(StmtClassDef {
            span: self.span_from(start),
            name,
            type_params,
            bases,
            keywords,
            body,
            decorator_list,
            inline_comment,
        }))
    }

    /// PEP 695 `[T, *Ts, **P]` list following a `def`/`class`/`type` name.
    fn parse_optional_type_params(&mut self) -> ParseResult<Vec<TypeParam>> {
        if !self.eat(&Tok::Lsqb) {
            return Ok(Vec::new());
        }
        let mut params = Vec::new();
        loop {
            if self.at(&Tok::Rsqb) {
                break;
            }
            let start = self.cur_span().start;
            if self.eat(&Tok::DoubleStar) {
                let name = self.identifier()?;
                let default = if self.eat(&Tok::Equal) { Some(Box::new(self.parse_test_or_named()?)) } else { None };
                params.push(TypeParam::ParamSpec(TypeParamParamSpec { span: self.span_from(start), name, default }));
            } else if self.eat(&Tok::Star) {
                let name = self.identifier()?;
                let default = if self.eat(&Tok::Equal) { Some(Box::new(self.parse_test_or_named()?)) } else { None };
                params.push(TypeParam::TypeVarTuple(TypeParamTypeVarTuple {
                    span: self.span_from(start),
                    name,
                    default,
                }));
            } else {
                let name = self.identifier()?;
                let bound = if self.eat(&Tok::Colon) { Some(Box::new(self.parse_test_or_named()?)) } else { None };
                let default = if self.eat(&Tok::Equal) { Some(Box::new(self.parse_test_or_named()?)) } else { None };
                params.push(TypeParam::TypeVar(TypeParamTypeVar { span: self.span_from(start), name, bound, default }));
            }
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.expect_tok(&Tok::Rsqb, "']' to close type parameter list")?;
        Ok(params)
    }

    /// Parameter list grammar shared by `def` and `lambda`. `lambda`'s
    /// parameters carry no annotations; callers simply never see a `:`
    /// token in that position since lambda bodies start right after the
    /// parameter list with `:`, which this function does not consume.
    fn parse_parameters(&mut self, close: Tok) -> ParseResult<Arguments> {
        let start = self.cur_span().start;
        let mut posonlyargs = Vec::new();
        let mut args = Vec::new();
        let mut vararg = None;
        let mut kwonlyargs = Vec::new();
        let mut kw_defaults = Vec::new();
        let mut kwarg = None;
        let mut defaults = Vec::new();
        let mut seen_star = false;
        let mut seen_slash_group: Vec<Arg> = Vec::new();

        loop {
            if self.at(&close) {
                break;
            }
            if self.eat(&Tok::Slash) {
                // Everything parsed so far was positional-only.
                posonlyargs.append(&mut seen_slash_group);
                posonlyargs.append(&mut args);
                args = Vec::new();
                if !self.eat(&Tok::Comma) {
                    break;
                }
                continue;
            }
            if self.eat(&Tok::DoubleStar) {
                let arg = self.parse_single_parameter()?;
                kwarg = Some(Box::new(arg));
                self.eat(&Tok::Comma);
                break;
            }
            if self.eat(&Tok::Star) {
                seen_star = true;
                if !self.at(&Tok::Comma) && !self.at(&close) {
                    let arg = self.parse_single_parameter()?;
                    vararg = Some(Box::new(arg));
                }
                if !self.eat(&Tok::Comma) {
                    break;
                }
                continue;
            }
            let arg = self.parse_single_parameter()?;
            let default = if self.eat(&Tok::Equal) { Some(self.parse_test_or_named()?) } else { None };
            if seen_star {
                kwonlyargs.push(arg);
                kw_defaults.push(default);
            } else {
                args.push(arg);
                if let Some(d) = default {
                    defaults.push(d);
                }
            }
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.reject_duplicate_parameter_names(
            &posonlyargs,
            &args,
            vararg.as_deref(),
            &kwonlyargs,
            kwarg.as_deref(),
            start,
        )?;
        Ok(Arguments {
            span: self.span_from(start),
            posonlyargs,
            args,
            vararg,
            kwonlyargs,
            kw_defaults,
            kwarg,
            defaults,
        })
    }

    /// CPython rejects a parameter list that binds the same name twice
    /// (`def f(x, x): ...`) with a `SyntaxError` at compile time rather than
    /// waiting for a later pass, so this parser does too.
    fn reject_duplicate_parameter_names(
        &self,
        posonlyargs: &[Arg],
        args: &[Arg],
        vararg: Option<&Arg>,
        kwonlyargs: &[Arg],
        kwarg: Option<&Arg>,
        start: Location,
    ) -> ParseResult<()> {
        use itertools::Itertools;
        let all = posonlyargs.iter().chain(args).chain(vararg).chain(kwonlyargs).chain(kwarg);
        if let Some(name) = all.map(|a| a.arg.as_str()).duplicates().next() {
            return Err(ParseError::new(format!("duplicate argument '{name}' in function definition"), start));
        }
        Ok(())
    }

    fn parse_single_parameter(&mut self) -> ParseResult<Arg> {
        let start = self.cur_span().start;
        let arg = self.identifier()?;
        let annotation = if self.eat(&Tok::Colon) { Some(Box::new(self.parse_test_or_named()?)) } else { None };
        Ok(Arg { span: self.span_from(start), arg, annotation, type_comment: None })
    }

    // -- simple statements ----------------------------------------------------

    /// Parses one logical line of `;`-separated simple statements, ending
    /// in NEWLINE or EOF. Returns all statements on the line (almost always
    /// one); a trailing comment on the line attaches to the last of them.
    fn parse_simple_statement_line(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = vec![self.parse_simple_statement()?];
        while self.eat(&Tok::Semi) {
            if matches!(self.cur(), Tok::Newline | Tok::EndOfFile) {
                break;
            }
            stmts.push(self.parse_simple_statement()?);
        }
        if let Some(comment) = self.take_inline_comment() {
            attach_inline_comment(stmts.last_mut().unwrap(), comment);
        }
        if !matches!(self.cur(), Tok::EndOfFile) {
            self.expect_tok(&Tok::Newline, "end of statement")?;
        }
        Ok(stmts)
    }

    fn parse_simple_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.cur_span().start;
        match self.cur().clone() {
            Tok::Pass => {
                self.bump();
                Ok(Stmt::Pass(StmtPass { span: self.span_from(start), inline_comment: None }))
            }
            Tok::Break => {
                self.bump();
                Ok(Stmt::Break(StmtBreak { span: self.span_from(start), inline_comment: None }))
            }
            Tok::Continue => {
                self.bump();
                Ok(Stmt::Continue(StmtContinue { span: self.span_from(start), inline_comment: None }))
            }
            Tok::Return => {
                self.bump();
                let value = if matches!(self.cur(), Tok::Newline | Tok::Semi | Tok::EndOfFile) {
                    None
                } else {
                    Some(Box::new(self.parse_testlist_star_expr()?))
                };
                Ok(Stmt::Return(StmtReturn { span: self.span_from(start), value, inline_comment: None }))
            }
            Tok::Del => {
                self.bump();
                let mut targets = Vec::new();
                loop {
                    targets.push(self.parse_test_or_star()?);
                    if !self.eat(&Tok::Comma) {
                        break;
                    }
                    if matches!(self.cur(), Tok::Newline | Tok::Semi | Tok::EndOfFile) {
                        break;
                    }
                }
                for t in &mut targets {
                    set_context(t, ExprContext::Del)?;
                }
                Ok(Stmt::Delete(StmtDelete { span: self.span_from(start), targets, inline_comment: None }))
            }
            Tok::Global => {
                self.bump();
                let names = self.parse_name_list()?;
                Ok(Stmt::Global(StmtGlobal { span: self.span_from(start), names, inline_comment: None }))
            }
            Tok::Nonlocal => {
                self.bump();
                let names = self.parse_name_list()?;
                Ok(Stmt::Nonlocal(StmtNonlocal { span: self.span_from(start), names, inline_comment: None }))
            }
            Tok::Raise => {
                self.bump();
                let (exc, cause) = if matches!(self.cur(), Tok::Newline | Tok::Semi | Tok::EndOfFile) {
                    (None, None)
                } else {
                    let exc = Some(Box::new(self.parse_test_or_named()?));
                    let cause = if self.eat(&Tok::From) { Some(Box::new(self.parse_test_or_named()?)) } else { None };
                    (exc, cause)
                };
                Ok(Stmt::Raise(StmtRaise { span: self.span_from(start), exc, cause, inline_comment: None }))
            }
            Tok::Assert => {
                self.bump();
                let test = Box::new(self.parse_test_or_named()?);
                let msg = if self.eat(&Tok::Comma) { Some(Box::new(self.parse_test_or_named()?)) } else { None };
                Ok(Stmt::Assert(StmtAssert { span: self.span_from(start), test, msg, inline_comment: None }))
            }
            Tok::Import => self.parse_import(start),
            Tok::From => self.parse_import_from(start),
            Tok::Name(ref id) if id == "type" && self.looks_like_type_alias() => self.parse_type_alias(start),
            _ => self.parse_expr_or_assign_statement(start),
        }
    }

    fn looks_like_type_alias(&self) -> bool {
        matches!(
            self.tokens.get(self.pos + 1).map(|t| &t.kind),
            Some(Tok::Name(_))
        )
    }

    fn parse_name_list(&mut self) -> ParseResult<Vec<Identifier>> {
        let mut names = vec![self.identifier()?];
        while self.eat(&Tok::Comma) {
            names.push(self.identifier()?);
        }
        Ok(names)
    }

    fn parse_import(&mut self, start: Location) -> ParseResult<Stmt> {
        self.bump(); // 'import'
        let mut names = Vec::new();
        loop {
            names.push(self.parse_dotted_alias()?);
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        Ok(Stmt::Import(StmtImport { span: self.span_from(start), names, inline_comment: None }))
    }

    fn parse_dotted_alias(&mut self) -> ParseResult<Alias> {
        let start = self.cur_span().start;
        let (mut dotted, _) = self.eat_name()?;
        while self.eat(&Tok::Dot) {
            let (part, _) = self.eat_name()?;
            dotted.push('.');
            dotted.push_str(&part);
        }
        let name = Identifier::new(dotted, self.span_from(start));
        let asname = if self.eat(&Tok::As) { Some(self.identifier()?) } else { None };
        Ok(Alias { span: self.span_from(start), name, asname })
    }

    fn parse_import_from(&mut self, start: Location) -> ParseResult<Stmt> {
        self.bump(); // 'from'
        let mut level = 0u32;
        loop {
            if self.eat(&Tok::Dot) {
                level += 1;
            } else if self.eat(&Tok::Ellipsis) {
                level += 3;
            } else {
                break;
            }
        }
        let module = if matches!(self.cur(), Tok::Import) { None } else { Some(self.identifier_path()?) };
        self.expect_tok(&Tok::Import, "'import'")?;
        let mut names = Vec::new();
        if self.eat(&Tok::Star) {
            names.push(Alias { span: self.span_from(start), name: Identifier::new("*", self.span_from(start)), asname: None });
        } else {
            let parenthesized = self.eat(&Tok::Lpar);
            loop {
                let name_start = self.cur_span().start;
                let name = self.identifier()?;
                let asname = if self.eat(&Tok::As) { Some(self.identifier()?) } else { None };
                names.push(Alias { span: self.span_from(name_start), name, asname });
                if !self.eat(&Tok::Comma) {
                    break;
                }
                if parenthesized && self.at(&Tok::Rpar) {
                    break;
                }
            }
            if parenthesized {
                self.expect_tok(&Tok::Rpar, "')' to close import list")?;
            }
        }
        Ok(Stmt::ImportFrom(StmtImportFrom { span: self.span_from(start), module, names, level, inline_comment: None }))
    }

    fn identifier_path(&mut self) -> ParseResult<Identifier> {
        let start = self.cur_span().start;
        let (mut dotted, _) = self.eat_name()?;
        while self.eat(&Tok::Dot) {
            let (part, _) = self.eat_name()?;
            dotted.push('.');
            dotted.push_str(&part);
        }
        Ok(Identifier::new(dotted, self.span_from(start)))
    }

    fn parse_type_alias(&mut self, start: Location) -> ParseResult<Stmt> {
        self.bump(); // 'type'
        let name_span = self.cur_span();
        let name_id = self.identifier()?;
        let type_params = self.parse_optional_type_params()?;
        self.expect_tok(&Tok::Equal, "'=' in type alias")?;
        let value = Box::new(self.parse_test_or_named()?);
        let name = Box::new(Expr::Name(ExprName { span: name_span, id: name_id, ctx: ExprContext::Store }));
        Ok(Stmt::TypeAlias(StmtTypeAlias { span: self.span_from(start), name, type_params, value, inline_comment: None }))
    }

    /// The assignment/aug-assign/ann-assign/expression-statement family:
    /// parse a starred-expression list, then dispatch on what follows it.
    fn parse_expr_or_assign_statement(&mut self, start: Location) -> ParseResult<Stmt> {
        let first = self.parse_testlist_star_expr()?;

        if let Some(op) = aug_assign_op(self.cur()) {
            self.bump();
            let mut target = first;
            set_context(&mut target, ExprContext::Store)?;
            require_single_target(&target)?;
            let value = Box::new(self.parse_testlist_star_expr()?);
            return Ok(Stmt::AugAssign(StmtAugAssign {
                span: self.span_from(start),
                target: Box::new(target),
                op,
                value,
                inline_comment: None,
            }));
        }

        if self.eat(&Tok::Colon) {
            let annotation = Box::new(self.parse_test_or_named()?);
            let mut target = first;
            let simple = matches!(&target, Expr::Name(_));
            set_context(&mut target, ExprContext::Store)?;
            require_single_target(&target)?;
            let value = if self.eat(&Tok::Equal) { Some(Box::new(self.parse_testlist_star_expr()?)) } else { None };
            return Ok(Stmt::AnnAssign(StmtAnnAssign {
                span: self.span_from(start),
                target: Box::new(target),
                annotation,
                value,
                simple,
                inline_comment: None,
            }));
        }

        if self.at(&Tok::Equal) {
            let mut targets = vec![first];
            let mut value = None;
            while self.eat(&Tok::Equal) {
                let expr = self.parse_testlist_star_expr()?;
                if matches!(self.cur(), Tok::Equal) {
                    targets.push(expr);
                } else {
                    value = Some(expr);
                    break;
                }
            }
            let value = value.ok_or_else(|| self.error("expected an expression after '='"))?;
            for t in &mut targets {
                set_context(t, ExprContext::Store)?;
            }
            return Ok(Stmt::Assign(StmtAssign {
                span: self.span_from(start),
                targets,
                value: Box::new(value),
                type_comment: None,
                inline_comment: None,
            }));
        }

        Ok(Stmt::Expr(StmtExpr { span: self.span_from(start), value: Box::new(first), inline_comment: None }))
    }

    // -- compound statements --------------------------------------------------

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let start = self.cur_span().start;
        self.bump(); // 'if'
        let test = Box::new(self.parse_test_or_named()?);
        self.expect_tok(&Tok::Colon, "':' after if condition")?;
        let (body, inline_comment) = self.parse_suite(false)?;
        let orelse = self.parse_elif_or_else()?;
        Ok(Stmt::If(StmtIf { span: self.span_from(start), test, body, orelse, inline_comment }))
    }

    fn parse_elif_or_else(&mut self) -> ParseResult<Vec<Stmt>> {
        if matches!(self.cur(), Tok::Elif) {
            let start = self.cur_span().start;
            self.bump(); // 'elif'
            let test = Box::new(self.parse_test_or_named()?);
            self.expect_tok(&Tok::Colon, "':' after elif condition")?;
            let (body, inline_comment) = self.parse_suite(false)?;
            let orelse = self.parse_elif_or_else()?;
            return Ok(vec![Stmt::If(StmtIf { span: self.span_from(start), test, body, orelse, inline_comment })]);
        }
        if self.eat(&Tok::Else) {
            self.expect_tok(&Tok::Colon, "':' after else")?;
            let (body, _inline) = self.parse_suite(false)?;
            return Ok(body);
        }
        Ok(Vec::new())
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let start = self.cur_span().start;
        self.bump(); // 'while'
        let test = Box::new(self.parse_test_or_named()?);
        self.expect_tok(&Tok::Colon, "':' after while condition")?;
        let (body, inline_comment) = self.parse_suite(false)?;
        let orelse = self.parse_plain_else()?;
        Ok(Stmt::While(StmtWhile { span: self.span_from(start), test, body, orelse, inline_comment }))
    }

    fn parse_plain_else(&mut self) -> ParseResult<Vec<Stmt>> {
        if self.eat(&Tok::Else) {
            self.expect_tok(&Tok::Colon, "':' after else")?;
            let (body, _inline) = self.parse_suite(false)?;
            Ok(body)
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_for(&mut self, is_async: bool) -> ParseResult<Stmt> {
        let start = self.cur_span().start;
        self.bump(); // 'for'
        let mut target = self.parse_target_list()?;
        set_context(&mut target, ExprContext::Store)?;
        self.expect_tok(&Tok::In, "'in' in for statement")?;
        let iter = Box::new(self.parse_testlist_star_expr()?);
        self.expect_tok(&Tok::Colon, "':' after for header")?;
        let (body, inline_comment) = self.parse_suite(false)?;
        let orelse = self.parse_plain_else()?;
        let span = self.span_from(start);
        if is_async {
            Ok(Stmt::AsyncFor(StmtAsyncFor {
                span,
                target: Box::new(target),
                iter,
                body,
                orelse,
                type_comment: None,
                inline_comment,
            }))
        } else {
            Ok(Stmt::For(StmtFor { span, target: Box::new(target), iter, body, orelse, type_comment: None, inline_comment }))
        }
    }

    /// A `for` target: a starred-expression list, collapsed to a bare
    /// expression when there's exactly one element and no trailing comma
    /// (same shape `parse_testlist_star_expr` uses for other tuple sites).
    fn parse_target_list(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        let mut elts = vec![self.parse_test_or_star()?];
        let mut trailing_comma = false;
        while self.eat(&Tok::Comma) {
            if matches!(self.cur(), Tok::In) {
                trailing_comma = true;
                break;
            }
            elts.push(self.parse_test_or_star()?);
            trailing_comma = true;
        }
        if elts.len() == 1 && !trailing_comma {
            Ok(elts.pop().unwrap())
        } else {
            Ok(Expr::Tuple(ExprTuple { span: self.span_from(start), elts, ctx: ExprContext::Load }))
        }
    }

    fn parse_with(&mut self, is_async: bool) -> ParseResult<Stmt> {
        let start = self.cur_span().start;
        self.bump(); // 'with'
        let parenthesized = self.at(&Tok::Lpar) && self.with_items_are_parenthesized();
        if parenthesized {
            self.bump();
        }
        let mut items = vec![self.parse_with_item()?];
        while self.eat(&Tok::Comma) {
            if parenthesized && self.at(&Tok::Rpar) {
                break;
            }
            items.push(self.parse_with_item()?);
        }
        if parenthesized {
            self.expect_tok(&Tok::Rpar, "')' to close with items")?;
        }
        self.expect_tok(&Tok::Colon, "':' after with header")?;
        let (body, inline_comment) = self.parse_suite(false)?;
        let span = self.span_from(start);
        if is_async {
            Ok(Stmt::AsyncWith(StmtAsyncWith { span, items, body, type_comment: None, inline_comment }))
        } else {
            Ok(Stmt::With(StmtWith { span, items, body, type_comment: None, inline_comment }))
        }
    }

    /// `with (a, b):` is ambiguous with `with (a, b) as c:` parenthesizing a
    /// single tuple context-expr; CPython resolves it by looking for `as`
    /// or a second top-level item inside the parens before the closing `)`
    /// is immediately followed by `:`. We approximate with the same scan
    /// used for `match`: a parenthesized group directly followed by `:`
    /// (allowing nested `as`/`,`) is treated as the parenthesized-items form.
    fn with_items_are_parenthesized(&self) -> bool {
        let mut i = self.pos;
        let mut depth = 0i32;
        loop {
            match &self.tokens[i].kind {
                Tok::Lpar | Tok::Lsqb | Tok::Lbrace => depth += 1,
                Tok::Rpar | Tok::Rsqb | Tok::Rbrace => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(
                            self.tokens.get(i + 1).map(|t| &t.kind),
                            Some(Tok::Colon)
                        );
                    }
                }
                Tok::EndOfFile => return false,
                _ => {}
            }
            i += 1;
        }
    }

    fn parse_with_item(&mut self) -> ParseResult<WithItem> {
        let context_expr = self.parse_test_or_named()?;
        let optional_vars = if self.eat(&Tok::As) {
            let mut target = self.parse_atom_trailer()?;
            set_context(&mut target, ExprContext::Store)?;
            Some(Box::new(target))
        } else {
            None
        };
        Ok(WithItem { context_expr, optional_vars })
    }

    fn parse_try(&mut self) -> ParseResult<Stmt> {
        let start = self.cur_span().start;
        self.bump(); // 'try'
        self.expect_tok(&Tok::Colon, "':' after try")?;
        let (body, inline_comment) = self.parse_suite(false)?;
        let mut handlers = Vec::new();
        let mut star: Option<bool> = None;
        while matches!(self.cur(), Tok::Except) {
            let handler_start = self.cur_span().start;
            self.bump(); // 'except'
            let is_star = self.eat(&Tok::Star);
            match star {
                None => star = Some(is_star),
                Some(prev) if prev != is_star => {
                    return Err(self.error("cannot have both 'except' and 'except*' on the same 'try'"));
                }
                _ => {}
            }
            let (exc_type, name) = if matches!(self.cur(), Tok::Colon) {
                (None, None)
            } else {
                let exc = self.parse_test_or_named()?;
                let name = if self.eat(&Tok::As) { Some(self.identifier()?) } else { None };
                (Some(Box::new(exc)), name)
            };
            self.expect_tok(&Tok::Colon, "':' after except clause")?;
            let (handler_body, _inline) = self.parse_suite(false)?;
            handlers.push(ExceptHandler { span: self.span_from(handler_start), exc_type, name, body: handler_body });
        }
        let orelse = self.parse_plain_else()?;
        let finalbody = if self.eat(&Tok::Finally) {
            self.expect_tok(&Tok::Colon, "':' after finally")?;
            let (body, _inline) = self.parse_suite(false)?;
            body
        } else {
            Vec::new()
        };
        if handlers.is_empty() && finalbody.is_empty() {
            return Err(self.error("expected 'except' or 'finally' after 'try' block"));
        }
        let span = self.span_from(start);
        if star == Some(true) {
            Ok(Stmt::TryStar(StmtTryStar { span, body, handlers, orelse, finalbody, inline_comment }))
        } else {
            Ok(Stmt::Try(StmtTry { span, body, handlers, orelse, finalbody, inline_comment }))
        }
    }

    // -- match statement and patterns ----------------------------------------

    fn parse_match(&mut self) -> ParseResult<Stmt> {
        let start = self.cur_span().start;
        self.bump(); // 'match'
        let subject = Box::new(self.parse_match_subject()?);
        self.expect_tok(&Tok::Colon, "':' after match subject")?;
        let inline_comment = self.take_inline_comment();
        self.expect_tok(&Tok::Newline, "an indented block of case clauses")?;
        self.expect_tok(&Tok::Indent, "an indented block of case clauses")?;
        let mut cases = Vec::new();
        loop {
            // Comments between `case` clauses have no statement to attach
            // to (a `match` block holds `MatchCase`s, not `Stmt`s), so they
            // are dropped here rather than promoted to standalone nodes.
            self.pending_comments.clear();
            while matches!(self.raw_kind(), Tok::Newline | Tok::NonLogicalNewline) {
                self.pos += 1;
            }
            if matches!(self.raw_kind(), Tok::Comment(_)) {
                self.pos += 1;
                continue;
            }
            if matches!(self.cur(), Tok::Dedent) {
                break;
            }
            cases.push(self.parse_match_case()?);
        }
        self.expect_tok(&Tok::Dedent, "dedent")?;
        Ok(Stmt::Match(StmtMatch { span: self.span_from(start), subject, cases, inline_comment }))
    }

    /// The subject of a `match` is a star-expression list, same shape as a
    /// `for` target, but never collapses a trailing comma away implicitly
    /// (a bare `match x,:` still yields a one-tuple subject).
    fn parse_match_subject(&mut self) -> ParseResult<Expr> {
        self.parse_testlist_star_expr()
    }

    fn parse_match_case(&mut self) -> ParseResult<MatchCase> {
        self.expect_tok(&Tok::Case, "'case'")?;
        let pattern = self.parse_patterns_or()?;
        let guard = if self.eat(&Tok::If) { Some(Box::new(self.parse_test_or_named()?)) } else { None };
        self.expect_tok(&Tok::Colon, "':' after case pattern")?;
        let (body, _inline) = self.parse_suite(false)?;
        Ok(MatchCase { pattern, guard, body })
    }

    /// `pattern ('|' pattern)*`, optionally followed by `as NAME`.
    fn parse_patterns_or(&mut self) -> ParseResult<Pattern> {
        let start = self.cur_span().start;
        let mut alts = vec![self.parse_closed_or_sequence_pattern()?];
        while self.eat(&Tok::Vbar) {
            alts.push(self.parse_closed_or_sequence_pattern()?);
        }
        let pattern = if alts.len() == 1 {
            alts.pop().unwrap()
        } else {
            Pattern::MatchOr(PatternMatchOr { span: self.span_from(start), patterns: alts })
        };
        if self.eat(&Tok::As) {
            let name = self.identifier()?;
            Ok(Pattern::MatchAs(PatternMatchAs { span: self.span_from(start), pattern: Some(Box::new(pattern)), name: Some(name) }))
        } else {
            Ok(pattern)
        }
    }

    /// A bare top-level sequence pattern without brackets: `a, b, c` (used
    /// directly in `case a, b:`), collapsing to its single element when
    /// there is no comma.
    fn parse_closed_or_sequence_pattern(&mut self) -> ParseResult<Pattern> {
        let start = self.cur_span().start;
        let first = self.parse_single_pattern()?;
        if !matches!(self.cur(), Tok::Comma) {
            return Ok(first);
        }
        let mut patterns = vec![first];
        while self.eat(&Tok::Comma) {
            if matches!(self.cur(), Tok::Colon | Tok::If | Tok::Vbar) {
                break;
            }
            patterns.push(self.parse_single_pattern()?);
        }
        Ok(Pattern::MatchSequence(PatternMatchSequence { span: self.span_from(start), patterns }))
    }

    fn parse_single_pattern(&mut self) -> ParseResult<Pattern> {
        let start = self.cur_span().start;
        match self.cur().clone() {
            Tok::Star => {
                self.bump();
                let (name, _) = self.eat_name()?;
                let name = if name == "_" { None } else { Some(Identifier::new(name, self.span_from(start))) };
                Ok(Pattern::MatchStar(PatternMatchStar { span: self.span_from(start), name }))
            }
            Tok::Lsqb => self.parse_sequence_pattern(Tok::Lsqb, Tok::Rsqb),
            Tok::Lpar => self.parse_sequence_pattern(Tok::Lpar, Tok::Rpar),
            Tok::Lbrace => self.parse_mapping_pattern(),
            Tok::None_ | Tok::True | Tok::False => {
                let value = self.parse_atom()?;
                match value {
                    Expr::Constant(c) => Ok(Pattern::MatchSingleton(PatternMatchSingleton { span: c.span, value: c.value })),
                    _ => unreachable!(),
                }
            }
            Tok::Minus | Tok::Int(_) | Tok::Float(_) | Tok::Complex { .. } | Tok::String { .. } | Tok::FStringRaw { .. } => {
                let value = Box::new(self.parse_pattern_literal_expr()?);
                Ok(Pattern::MatchValue(PatternMatchValue { span: self.span_from(start), value }))
            }
            Tok::Name(ref id) if id == "_" => {
                self.bump();
                Ok(Pattern::MatchAs(PatternMatchAs { span: self.span_from(start), pattern: None, name: None }))
            }
            Tok::Name(_) => self.parse_name_or_class_or_value_pattern(),
            other => Err(self.error(format!("unexpected token in pattern: {other:?}"))),
        }
    }

    /// Literal and value patterns on the right side of `MatchValue`: a
    /// dotted attribute chain, a signed number, or a string/bytes constant.
    fn parse_pattern_literal_expr(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        if self.eat(&Tok::Minus) {
            let operand = self.parse_pattern_literal_expr()?;
            return Ok(Expr::UnaryOp(ExprUnaryOp { span: self.span_from(start), op: UnaryOp::USub, operand: Box::new(operand) }));
        }
        self.parse_atom_trailer()
    }

    fn parse_name_or_class_or_value_pattern(&mut self) -> ParseResult<Pattern> {
        let start = self.cur_span().start;
        let (first, first_span) = self.eat_name()?;
        let mut value = Expr::Name(ExprName { span: first_span, id: Identifier::new(first.clone(), first_span), ctx: ExprContext::Load });
        let mut dotted = false;
        while self.eat(&Tok::Dot) {
            dotted = true;
            let attr = self.identifier()?;
            value = Expr::Attribute(ExprAttribute { span: self.span_from(start), value: Box::new(value), attr, ctx: ExprContext::Load });
        }
        if self.at(&Tok::Lpar) {
            return self.parse_class_pattern(value);
        }
        if dotted {
            return Ok(Pattern::MatchValue(PatternMatchValue { span: self.span_from(start), value: Box::new(value) }));
        }
        Ok(Pattern::MatchAs(PatternMatchAs {
            span: self.span_from(start),
            pattern: None,
            name: Some(Identifier::new(first, first_span)),
        }))
    }

    fn parse_class_pattern(&mut self, cls: Expr) -> ParseResult<Pattern> {
        let start = cls.span().start;
        self.bump(); // '('
        let mut patterns = Vec::new();
        let mut kwd_attrs = Vec::new();
        let mut kwd_patterns = Vec::new();
        loop {
            if self.at(&Tok::Rpar) {
                break;
            }
            if matches!((self.cur(), self.tokens.get(self.pos + 1).map(|t| &t.kind)), (Tok::Name(_), Some(Tok::Equal))) {
                let name = self.identifier()?;
                self.bump(); // '='
                let pattern = self.parse_patterns_or()?;
                kwd_attrs.push(name);
                kwd_patterns.push(pattern);
            } else {
                patterns.push(self.parse_patterns_or()?);
            }
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.expect_tok(&Tok::Rpar, "')' to close class pattern")?;
        Ok(Pattern::MatchClass(PatternMatchClass { span: self.span_from(start), cls: Box::new(cls), patterns, kwd_attrs, kwd_patterns }))
    }

    fn parse_sequence_pattern(&mut self, open: Tok, close: Tok) -> ParseResult<Pattern> {
        let start = self.cur_span().start;
        self.bump(); // opening bracket
        let _ = &open;
        let mut patterns = Vec::new();
        loop {
            if self.at(&close) {
                break;
            }
            patterns.push(self.parse_single_pattern()?);
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.expect_tok(&close, "closing bracket of sequence pattern")?;
        Ok(Pattern::MatchSequence(PatternMatchSequence { span: self.span_from(start), patterns }))
    }

    fn parse_mapping_pattern(&mut self) -> ParseResult<Pattern> {
        let start = self.cur_span().start;
        self.bump(); // '{'
        let mut keys = Vec::new();
        let mut patterns = Vec::new();
        let mut rest = None;
        loop {
            if self.at(&Tok::Rbrace) {
                break;
            }
            if self.eat(&Tok::DoubleStar) {
                rest = Some(self.identifier()?);
            } else {
                let key = self.parse_pattern_literal_expr()?;
                self.expect_tok(&Tok::Colon, "':' in mapping pattern")?;
                let pattern = self.parse_single_pattern()?;
                keys.push(key);
                patterns.push(pattern);
            }
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.expect_tok(&Tok::Rbrace, "'}' to close mapping pattern")?;
        Ok(Pattern::MatchMapping(PatternMatchMapping { span: self.span_from(start), keys, patterns, rest }))
    }

    // -----------------------------------------------------------------
    // Expression grammar, low to high precedence.
    // -----------------------------------------------------------------

    /// `tuple` level: one or more comma-separated starred expressions,
    /// collapsing to a bare expression when there's exactly one and no
    /// trailing comma. This is the entry point `fstring.rs` calls to parse
    /// a full interpolation expression.
    pub fn parse_testlist_star_expr(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        let first = self.parse_test_or_star()?;
        if !matches!(self.cur(), Tok::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(&Tok::Comma) {
            if is_expr_end(self.cur()) {
                break;
            }
            elts.push(self.parse_test_or_star()?);
        }
        Ok(Expr::Tuple(ExprTuple { span: self.span_from(start), elts, ctx: ExprContext::Load }))
    }

    fn parse_test_or_star(&mut self) -> ParseResult<Expr> {
        if matches!(self.cur(), Tok::Star) {
            let start = self.cur_span().start;
            self.bump();
            let value = Box::new(self.parse_or_expr_bitor()?);
            return Ok(Expr::Starred(ExprStarred { span: self.span_from(start), value, ctx: ExprContext::Load }));
        }
        self.parse_test_or_named()
    }

    /// `test` (ternary/lambda), without the walrus form -- used wherever
    /// the grammar forbids a bare `name := value` (e.g. keyword defaults).
    fn parse_test_or_named(&mut self) -> ParseResult<Expr> {
        if matches!(self.cur(), Tok::Lambda) {
            return self.parse_lambda();
        }
        if matches!(self.cur(), Tok::Yield) {
            return self.parse_yield();
        }
        let start = self.cur_span().start;
        let body = self.parse_or_test()?;
        if self.eat(&Tok::If) {
            let test = Box::new(self.parse_or_test()?);
            self.expect_tok(&Tok::Else, "'else' in conditional expression")?;
            let orelse = Box::new(self.parse_test_or_named()?);
            return Ok(Expr::IfExp(ExprIfExp { span: self.span_from(start), test, body: Box::new(body), orelse }));
        }
        Ok(body)
    }

    fn parse_lambda(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        self.bump(); // 'lambda'
        let args = if matches!(self.cur(), Tok::Colon) {
            Arguments::empty(self.cur_span())
        } else {
            self.parse_parameters(Tok::Colon)?
        };
        self.expect_tok(&Tok::Colon, "':' in lambda")?;
        let body = Box::new(self.parse_test_or_named()?);
        Ok(Expr::Lambda(ExprLambda { span: self.span_from(start), args: Box::new(args), body }))
    }

    fn parse_yield(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        self.bump(); // 'yield'
        if self.eat(&Tok::From) {
            let value = Box::new(self.parse_test_or_named()?);
            return Ok(Expr::YieldFrom(ExprYieldFrom { span: self.span_from(start), value }));
        }
        let value = if is_expr_end(self.cur()) {
            None
        } else {
            Some(Box::new(self.parse_testlist_star_expr()?))
        };
        Ok(Expr::Yield(ExprYield { span: self.span_from(start), value }))
    }

    fn parse_or_test(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        let first = self.parse_and_test()?;
        if !matches!(self.cur(), Tok::Or) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&Tok::Or) {
            values.push(self.parse_and_test()?);
        }
        Ok(Expr::BoolOp(ExprBoolOp { span: self.span_from(start), op: BoolOp::Or, values }))
    }

    fn parse_and_test(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        let first = self.parse_not_test_or_walrus()?;
        if !matches!(self.cur(), Tok::And) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&Tok::And) {
            values.push(self.parse_not_test_or_walrus()?);
        }
        Ok(Expr::BoolOp(ExprBoolOp { span: self.span_from(start), op: BoolOp::And, values }))
    }

    /// Handles the walrus operator: `NAME := test`. Per the data model this
    /// sits at the `and_test` level, so we check for it immediately after
    /// parsing a `not_test` operand.
    fn parse_not_test_or_walrus(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        let expr = self.parse_not_test()?;
        if self.eat(&Tok::ColonEqual) {
            let mut target = expr;
            set_context(&mut target, ExprContext::Store)?;
            let value = Box::new(self.parse_test_or_named()?);
            return Ok(Expr::NamedExpr(ExprNamedExpr { span: self.span_from(start), target: Box::new(target), value }));
        }
        Ok(expr)
    }

    fn parse_not_test(&mut self) -> ParseResult<Expr> {
        if matches!(self.cur(), Tok::Not) {
            let start = self.cur_span().start;
            self.bump();
            let operand = Box::new(self.parse_not_test()?);
            return Ok(Expr::UnaryOp(ExprUnaryOp { span: self.span_from(start), op: UnaryOp::Not, operand }));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        let left = self.parse_or_expr_bitor()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        loop {
            let op = match self.cur().clone() {
                Tok::Less => CmpOp::Lt,
                Tok::Greater => CmpOp::Gt,
                Tok::EqEqual => CmpOp::Eq,
                Tok::NotEqual => CmpOp::NotEq,
                Tok::LessEqual => CmpOp::LtE,
                Tok::GreaterEqual => CmpOp::GtE,
                Tok::In => CmpOp::In,
                Tok::Is => {
                    self.bump();
                    if self.eat(&Tok::Not) {
                        comparators.push(self.parse_or_expr_bitor()?);
                        ops.push(CmpOp::IsNot);
                        continue;
                    }
                    comparators.push(self.parse_or_expr_bitor()?);
                    ops.push(CmpOp::Is);
                    continue;
                }
                Tok::Not if matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(Tok::In)) => {
                    self.bump();
                    self.bump();
                    comparators.push(self.parse_or_expr_bitor()?);
                    ops.push(CmpOp::NotIn);
                    continue;
                }
                _ => break,
            };
            self.bump();
            comparators.push(self.parse_or_expr_bitor()?);
            ops.push(op);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(Expr::Compare(ExprCompare { span: self.span_from(start), left: Box::new(left), ops, comparators }))
    }

    fn parse_or_expr_bitor(&mut self) -> ParseResult<Expr> {
        self.parse_binop_level(&[(Tok::Vbar, Operator::BitOr)], Self::parse_xor_expr)
    }

    fn parse_xor_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binop_level(&[(Tok::Circumflex, Operator::BitXor)], Self::parse_and_expr)
    }

    fn parse_and_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binop_level(&[(Tok::Amper, Operator::BitAnd)], Self::parse_shift_expr)
    }

    fn parse_shift_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binop_level(&[(Tok::LShift, Operator::LShift), (Tok::RShift, Operator::RShift)], Self::parse_arith_expr)
    }

    fn parse_arith_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binop_level(&[(Tok::Plus, Operator::Add), (Tok::Minus, Operator::Sub)], Self::parse_term)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        self.parse_binop_level(
            &[
                (Tok::Star, Operator::Mult),
                (Tok::At, Operator::MatMult),
                (Tok::Slash, Operator::Div),
                (Tok::DoubleSlash, Operator::FloorDiv),
                (Tok::Percent, Operator::Mod),
            ],
            Self::parse_factor,
        )
    }

    /// Shared left-associative binary-operator loop: parses one `next`
    /// level operand, then repeatedly consumes any operator in `ops`
    /// followed by another `next` operand.
    fn parse_binop_level(&mut self, ops: &[(Tok, Operator)], next: fn(&mut Self) -> ParseResult<Expr>) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        let mut left = next(self)?;
        loop {
            let matched = ops.iter().find(|(tok, _)| self.cur() == tok).map(|(_, op)| *op);
            let Some(op) = matched else { break };
            self.bump();
            let right = next(self)?;
            left = Expr::BinOp(ExprBinOp { span: self.span_from(start), left: Box::new(left), op, right: Box::new(right) });
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        let op = match self.cur() {
            Tok::Plus => UnaryOp::UAdd,
            Tok::Minus => UnaryOp::USub,
            Tok::Tilde => UnaryOp::Invert,
            _ => return self.parse_power(),
        };
        self.bump();
        let operand = Box::new(self.parse_factor()?);
        Ok(Expr::UnaryOp(ExprUnaryOp { span: self.span_from(start), op, operand }))
    }

    /// `**` is right-associative: `a ** b ** c` is `a ** (b ** c)`, and its
    /// right-hand side binds as another `factor` (so `2 ** -1` parses).
    fn parse_power(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        let base = self.parse_await_expr()?;
        if self.eat(&Tok::DoubleStar) {
            let exponent = Box::new(self.parse_factor()?);
            return Ok(Expr::BinOp(ExprBinOp { span: self.span_from(start), left: Box::new(base), op: Operator::Pow, right: exponent }));
        }
        Ok(base)
    }

    fn parse_await_expr(&mut self) -> ParseResult<Expr> {
        if matches!(self.cur(), Tok::Await) {
            let start = self.cur_span().start;
            self.bump();
            let value = Box::new(self.parse_atom_trailer()?);
            return Ok(Expr::Await(ExprAwait { span: self.span_from(start), value }));
        }
        self.parse_atom_trailer()
    }

    /// An atom followed by zero or more trailers: `.NAME`, `[slice]`, `(args)`.
    fn parse_atom_trailer(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        let mut expr = self.parse_atom()?;
        loop {
            match self.cur().clone() {
                Tok::Dot => {
                    self.bump();
                    let attr = self.identifier()?;
                    expr = Expr::Attribute(ExprAttribute { span: self.span_from(start), value: Box::new(expr), attr, ctx: ExprContext::Load });
                }
                Tok::Lpar => {
                    self.bump();
                    let mut args = Vec::new();
                    let mut keywords = Vec::new();
                    self.parse_call_arguments(&mut args, &mut keywords, &Tok::Rpar)?;
                    self.expect_tok(&Tok::Rpar, "')' to close call")?;
                    expr = Expr::Call(ExprCall { span: self.span_from(start), func: Box::new(expr), args, keywords });
                }
                Tok::Lsqb => {
                    self.bump();
                    let slice = self.parse_subscript()?;
                    self.expect_tok(&Tok::Rsqb, "']' to close subscript")?;
                    expr = Expr::Subscript(ExprSubscript { span: self.span_from(start), value: Box::new(expr), slice: Box::new(slice), ctx: ExprContext::Load });
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Call arguments: positional expressions (including `*args` splats
    /// and, as a shorthand, a single bare generator expression), followed
    /// by keyword arguments and `**kwargs` splats.
    fn parse_call_arguments(&mut self, args: &mut Vec<Expr>, keywords: &mut Vec<Keyword>, close: &Tok) -> ParseResult<()> {
        loop {
            if self.at(close) {
                break;
            }
            if matches!((self.cur(), self.tokens.get(self.pos + 1).map(|t| &t.kind)), (Tok::Name(_), Some(Tok::Equal)))
                && !matches!(self.tokens.get(self.pos + 2).map(|t| &t.kind), Some(Tok::Equal))
            {
                let name = self.identifier()?;
                self.bump(); // '='
                let value = self.parse_test_or_named()?;
                keywords.push(Keyword { span: value.span(), arg: Some(name), value });
            } else if self.eat(&Tok::DoubleStar) {
                let value = self.parse_test_or_named()?;
                keywords.push(Keyword { span: value.span(), arg: None, value });
            } else if matches!(self.cur(), Tok::Star) {
                let start = self.cur_span().start;
                self.bump();
                let value = Box::new(self.parse_test_or_named()?);
                args.push(Expr::Starred(ExprStarred { span: self.span_from(start), value, ctx: ExprContext::Load }));
            } else {
                let expr = self.parse_test_or_named()?;
                if matches!(self.cur(), Tok::For) || (matches!(self.cur(), Tok::Async) && matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(Tok::For))) {
                    let generators = self.parse_comprehension_clauses()?;
                    let start = expr.span().start;
                    args.push(Expr::GeneratorExp(ExprGeneratorExp { span: self.span_from(start), elt: Box::new(expr), generators }));
                } else {
                    args.push(expr);
                }
            }
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        Ok(())
    }

    /// `[subscript_list]` contents: either a single slice/expression, or a
    /// comma-separated list (itself forming a `Tuple` whose elements may be
    /// `Slice`s), matching CPython's "a tuple of slices" subscript shape.
    fn parse_subscript(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        let first = self.parse_subscript_element()?;
        if !matches!(self.cur(), Tok::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(&Tok::Comma) {
            if matches!(self.cur(), Tok::Rsqb) {
                break;
            }
            elts.push(self.parse_subscript_element()?);
        }
        Ok(Expr::Tuple(ExprTuple { span: self.span_from(start), elts, ctx: ExprContext::Load }))
    }

    fn parse_subscript_element(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        if matches!(self.cur(), Tok::Star) {
            self.bump();
            let value = Box::new(self.parse_or_expr_bitor()?);
            return Ok(Expr::Starred(ExprStarred { span: self.span_from(start), value, ctx: ExprContext::Load }));
        }
        let lower = if matches!(self.cur(), Tok::Colon) { None } else { Some(Box::new(self.parse_test_or_named()?)) };
        if !matches!(self.cur(), Tok::Colon) {
            return Ok(*lower.unwrap());
        }
        self.bump(); // ':'
        let upper = if matches!(self.cur(), Tok::Colon | Tok::Comma | Tok::Rsqb) {
            None
        } else {
            Some(Box::new(self.parse_test_or_named()?))
        };
        let step = if self.eat(&Tok::Colon) {
            if matches!(self.cur(), Tok::Comma | Tok::Rsqb) { None } else { Some(Box::new(self.parse_test_or_named()?)) }
        } else {
            None
        };
        Ok(Expr::Slice(ExprSlice { span: self.span_from(start), lower, upper, step }))
    }

    fn parse_comprehension_clauses(&mut self) -> ParseResult<Vec<Comprehension>> {
        let mut generators = Vec::new();
        loop {
            let is_async = self.eat(&Tok::Async);
            if !self.eat(&Tok::For) {
                if is_async {
                    return Err(self.error("expected 'for' after 'async' in comprehension"));
                }
                break;
            }
            let mut target = self.parse_target_list()?;
            set_context(&mut target, ExprContext::Store)?;
            self.expect_tok(&Tok::In, "'in' in comprehension")?;
            let iter = self.parse_or_test()?;
            let mut ifs = Vec::new();
            while matches!(self.cur(), Tok::If) {
                self.bump();
                ifs.push(self.parse_or_test_no_walrus_cond()?);
            }
            generators.push(Comprehension { target, iter, ifs, is_async });
        }
        Ok(generators)
    }

    /// An `if` filter clause inside a comprehension binds at `or_test`
    /// precedence (no ternary, but a bare `:=` is still permitted, so we
    /// reuse the regular `or_test` production).
    fn parse_or_test_no_walrus_cond(&mut self) -> ParseResult<Expr> {
        self.parse_or_test()
    }

    // -- atoms ---------------------------------------------------------------

    fn parse_atom(&mut self) -> ParseResult<Expr> {
        let start = self.cur_span().start;
        match self.cur().clone() {
            Tok::Name(id) => {
                self.bump();
                Ok(Expr::Name(ExprName { span: self.span_from(start), id: Identifier::new(id, self.span_from(start)), ctx: ExprContext::Load }))
            }
            Tok::Int(v) => {
                self.bump();
                Ok(Expr::Constant(ExprConstant { span: self.span_from(start), value: Constant::Int(v), kind: None }))
            }
            Tok::Float(v) => {
                self.bump();
                Ok(Expr::Constant(ExprConstant { span: self.span_from(start), value: Constant::Float(v), kind: None }))
            }
            Tok::Complex { real, imag } => {
                self.bump();
                Ok(Expr::Constant(ExprConstant { span: self.span_from(start), value: Constant::Complex { real, imag }, kind: None }))
            }
            Tok::True => {
                self.bump();
                Ok(Expr::Constant(ExprConstant { span: self.span_from(start), value: Constant::Bool(true), kind: None }))
            }
            Tok::False => {
                self.bump();
                Ok(Expr::Constant(ExprConstant { span: self.span_from(start), value: Constant::Bool(false), kind: None }))
            }
            Tok::None_ => {
                self.bump();
                Ok(Expr::Constant(ExprConstant { span: self.span_from(start), value: Constant::None, kind: None }))
            }
            Tok::Ellipsis => {
                self.bump();
                Ok(Expr::Constant(ExprConstant { span: self.span_from(start), value: Constant::Ellipsis, kind: None }))
            }
            Tok::String { .. } | Tok::Bytes { .. } | Tok::FStringRaw { .. } => self.parse_string_group(start),
            Tok::Lpar => self.parse_paren_or_tuple_or_genexp(start),
            Tok::Lsqb => self.parse_list_or_listcomp(start),
            Tok::Lbrace => self.parse_set_or_dict(start),
            Tok::Yield => self.parse_yield(),
            other => Err(self.error(format!("unexpected token: {other:?}"))),
        }
    }

    /// Adjacent string/bytes/f-string literals concatenate into one
    /// `Constant`/`JoinedStr`, matching CPython's implicit literal
    /// concatenation (`"a" "b"` == `"ab"`).
    fn parse_string_group(&mut self, start: Location) -> ParseResult<Expr> {
        let mut parts: Vec<Expr> = Vec::new();
        let mut any_fstring = false;
        let mut bytes_acc: Option<Vec<u8>> = None;
        loop {
            match self.cur().clone() {
                Tok::String { value, kind } => {
                    self.bump();
                    parts.push(Expr::Constant(ExprConstant { span: self.span_from(start), value: Constant::Str(value), kind: Some(kind) }));
                }
                Tok::Bytes { value, kind } => {
                    self.bump();
                    match &mut bytes_acc {
                        Some(acc) => acc.extend(value),
                        None => bytes_acc = Some(value),
                    }
                    let _ = kind;
                }
                Tok::FStringRaw { body, kind } => {
                    self.bump();
                    any_fstring = true;
                    let values = crate::fstring::parse_body(&body, self.tokens[self.pos.saturating_sub(1)].span.start, self.keep_comments)?;
                    parts.push(Expr::JoinedStr(ExprJoinedStr { span: self.span_from(start), values, kind: Some(kind) }));
                }
                _ => break,
            }
        }
        if let Some(bytes) = bytes_acc {
            return Ok(Expr::Constant(ExprConstant { span: self.span_from(start), value: Constant::Bytes(bytes), kind: None }));
        }
        if !any_fstring && parts.len() == 1 {
            return Ok(parts.pop().unwrap());
        }
        if !any_fstring {
            // Plain adjacent string literals: fold into a single Constant.
            let mut joined = String::new();
            let mut kind = None;
            for part in parts {
                if let Expr::Constant(ExprConstant { value: Constant::Str(s), kind: k, .. }) = part {
                    joined.push_str(&s);
                    kind = kind.or(k);
                }
            }
            return Ok(Expr::Constant(ExprConstant { span: self.span_from(start), value: Constant::Str(joined), kind }));
        }
        // Any f-string in the concatenation promotes the whole group to a
        // single JoinedStr, flattening plain-string neighbours into it.
        let mut values = Vec::new();
        for part in parts {
            match part {
                Expr::JoinedStr(j) => values.extend(j.values),
                other => values.push(other),
            }
        }
        Ok(Expr::JoinedStr(ExprJoinedStr { span: self.span_from(start), values, kind: None }))
    }

    fn parse_paren_or_tuple_or_genexp(&mut self, start: Location) -> ParseResult<Expr> {
        self.bump(); // '('
        if self.eat(&Tok::Rpar) {
            return Ok(Expr::Tuple(ExprTuple { span: self.span_from(start), elts: Vec::new(), ctx: ExprContext::Load }));
        }
        if matches!(self.cur(), Tok::Yield) {
            let y = self.parse_yield()?;
            self.expect_tok(&Tok::Rpar, "')'")?;
            return Ok(y);
        }
        let first = self.parse_test_or_star()?;
        if matches!(self.cur(), Tok::For) || (matches!(self.cur(), Tok::Async) && matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(Tok::For))) {
            let generators = self.parse_comprehension_clauses()?;
            self.expect_tok(&Tok::Rpar, "')' to close generator expression")?;
            return Ok(Expr::GeneratorExp(ExprGeneratorExp { span: self.span_from(start), elt: Box::new(first), generators }));
        }
        if !matches!(self.cur(), Tok::Comma) {
            self.expect_tok(&Tok::Rpar, "')'")?;
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(&Tok::Comma) {
            if matches!(self.cur(), Tok::Rpar) {
                break;
            }
            elts.push(self.parse_test_or_star()?);
        }
        self.expect_tok(&Tok::Rpar, "')' to close tuple")?;
        Ok(Expr::Tuple(ExprTuple { span: self.span_from(start), elts, ctx: ExprContext::Load }))
    }

    fn parse_list_or_listcomp(&mut self, start: Location) -> ParseResult<Expr> {
        self.bump(); // '['
        if self.eat(&Tok::Rsqb) {
            return Ok(Expr::List(ExprList { span: self.span_from(start), elts: Vec::new(), ctx: ExprContext::Load }));
        }
        let first = self.parse_test_or_star()?;
        if matches!(self.cur(), Tok::For) || (matches!(self.cur(), Tok::Async) && matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(Tok::For))) {
            let generators = self.parse_comprehension_clauses()?;
            self.expect_tok(&Tok::Rsqb, "']' to close list comprehension")?;
            return Ok(Expr::ListComp(ExprListComp { span: self.span_from(start), elt: Box::new(first), generators }));
        }
        let mut elts = vec![first];
        while self.eat(&Tok::Comma) {
            if matches!(self.cur(), Tok::Rsqb) {
                break;
            }
            elts.push(self.parse_test_or_star()?);
        }
        self.expect_tok(&Tok::Rsqb, "']' to close list")?;
        Ok(Expr::List(ExprList { span: self.span_from(start), elts, ctx: ExprContext::Load }))
    }

    fn parse_set_or_dict(&mut self, start: Location) -> ParseResult<Expr> {
        self.bump(); // '{'
        if self.eat(&Tok::Rbrace) {
            return Ok(Expr::Dict(ExprDict { span: self.span_from(start), keys: Vec::new(), values: Vec::new() }));
        }
        if self.eat(&Tok::DoubleStar) {
            let value = self.parse_or_expr_bitor()?;
            return self.parse_dict_rest(start, vec![None], vec![value]);
        }
        let first = self.parse_test_or_star()?;
        if self.eat(&Tok::Colon) {
            let value = self.parse_test_or_named()?;
            if matches!(self.cur(), Tok::For) || (matches!(self.cur(), Tok::Async) && matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(Tok::For))) {
                let generators = self.parse_comprehension_clauses()?;
                self.expect_tok(&Tok::Rbrace, "'}' to close dict comprehension")?;
                return Ok(Expr::DictComp(ExprDictComp { span: self.span_from(start), key: Box::new(first), value: Box::new(value), generators }));
            }
            return self.parse_dict_rest(start, vec![Some(first)], vec![value]);
        }
        if matches!(self.cur(), Tok::For) || (matches!(self.cur(), Tok::Async) && matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(Tok::For))) {
            let generators = self.parse_comprehension_clauses()?;
            self.expect_tok(&Tok::Rbrace, "'}' to close set comprehension")?;
            return Ok(Expr::SetComp(ExprSetComp { span: self.span_from(start), elt: Box::new(first), generators }));
        }
        let mut elts = vec![first];
        while self.eat(&Tok::Comma) {
            if matches!(self.cur(), Tok::Rbrace) {
                break;
            }
            elts.push(self.parse_test_or_star()?);
        }
        self.expect_tok(&Tok::Rbrace, "'}' to close set")?;
        Ok(Expr::Set(ExprSet { span: self.span_from(start), elts }))
    }

    fn parse_dict_rest(&mut self, start: Location, mut keys: Vec<Option<Expr>>, mut values: Vec<Expr>) -> ParseResult<Expr> {
        while self.eat(&Tok::Comma) {
            if matches!(self.cur(), Tok::Rbrace) {
                break;
            }
            if self.eat(&Tok::DoubleStar) {
                keys.push(None);
                values.push(self.parse_or_expr_bitor()?);
                continue;
            }
            let key = self.parse_test_or_named()?;
            self.expect_tok(&Tok::Colon, "':' in dict display")?;
            let value = self.parse_test_or_named()?;
            keys.push(Some(key));
            values.push(value);
        }
        self.expect_tok(&Tok::Rbrace, "'}' to close dict")?;
        Ok(Expr::Dict(ExprDict { span: self.span_from(start), keys, values }))
    }
}

// ---------------------------------------------------------------------
// Free functions: target validation, context rewriting, small lookups.
// ---------------------------------------------------------------------

fn aug_assign_op(tok: &Tok) -> Option<Operator> {
    Some(match tok {
        Tok::PlusEqual => Operator::Add,
        Tok::MinusEqual => Operator::Sub,
        Tok::StarEqual => Operator::Mult,
        Tok::AtEqual => Operator::MatMult,
        Tok::SlashEqual => Operator::Div,
        Tok::DoubleSlashEqual => Operator::FloorDiv,
        Tok::PercentEqual => Operator::Mod,
        Tok::AmperEqual => Operator::BitAnd,
        Tok::VbarEqual => Operator::BitOr,
        Tok::CircumflexEqual => Operator::BitXor,
        Tok::LShiftEqual => Operator::LShift,
        Tok::RShiftEqual => Operator::RShift,
        Tok::DoubleStarEqual => Operator::Pow,
        _ => return None,
    })
}

fn is_expr_end(tok: &Tok) -> bool {
    matches!(
        tok,
        Tok::Newline
            | Tok::Semi
            | Tok::EndOfFile
            | Tok::Rpar
            | Tok::Rsqb
            | Tok::Rbrace
            | Tok::Colon
            | Tok::Equal
            | Tok::Dedent
    )
}

fn attach_inline_comment(stmt: &mut Stmt, comment: Comment) {
    macro_rules! set {
        ($($variant:ident),*) => {
            match stmt {
                $(Stmt::$variant(s) => s.inline_comment = Some(comment),)*
                Stmt::Comment(_) => {}
            }
        };
    }
    set!(
        FunctionDef, AsyncFunctionDef, ClassDef, Return, Delete, Assign, AugAssign, AnnAssign, TypeAlias, For, AsyncFor,
        While, If, With, AsyncWith, Match, Raise, Try, TryStar, Assert, Import, ImportFrom, Global, Nonlocal, Expr, Pass,
        Break, Continue
    );
}

/// Rewrites the `Load` context every contained `Name`/`Attribute`/
/// `Subscript`/`Starred`/`List`/`Tuple` carries into `ctx`, and rejects
/// expression kinds that can never be a legal assignment target (literals,
/// calls, binary/unary/compare results, and so on).
fn set_context(expr: &mut Expr, ctx: ExprContext) -> ParseResult<()> {
    match expr {
        Expr::Name(e) => {
            e.ctx = ctx;
            Ok(())
        }
        Expr::Attribute(e) => {
            e.ctx = ctx;
            Ok(())
        }
        Expr::Subscript(e) => {
            e.ctx = ctx;
            Ok(())
        }
        Expr::Starred(e) => {
            e.ctx = ctx;
            set_context(&mut e.value, ctx)
        }
        Expr::List(e) => {
            e.ctx = ctx;
            for elt in &mut e.elts {
                set_context(elt, ctx)?;
            }
            Ok(())
        }
        Expr::Tuple(e) => {
            e.ctx = ctx;
            for elt in &mut e.elts {
                set_context(elt, ctx)?;
            }
            Ok(())
        }
        other => Err(ParseError::new(
            format!("cannot assign to {}", other.kind_name()),
            other.span().start,
        )),
    }
}

/// Rejects a `Tuple`/`List`/`Starred` target, for the assignment forms
/// (aug-assign, ann-assign) that CPython restricts to a single `Name`,
/// `Attribute`, or `Subscript` -- unlike plain `=` assignment, which
/// happily destructures into a tuple or list of targets.
fn require_single_target(target: &Expr) -> ParseResult<()> {
    match target {
        Expr::Name(_) | Expr::Attribute(_) | Expr::Subscript(_) => Ok(()),
        other => Err(ParseError::new(
            format!("cannot use {} as a single assignment target", other.kind_name()),
            other.span().start,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Mod {
        let tokens = Lexer::new(src, false).tokenize().unwrap();
        parse_tokens(tokens, false).unwrap()
    }

    fn first_stmt(src: &str) -> Stmt {
        match parse(src) {
            Mod::Module(m) => m.body.into_iter().next().unwrap(),
            _ => unreachable!(),
        }
    }

    fn first_expr(src: &str) -> Expr {
        match first_stmt(src) {
            Stmt::Expr(e) => *e.value,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_simple_assignment() {
        match first_stmt("x = 1\n") {
            Stmt::Assign(a) => {
                assert_eq!(a.targets.len(), 1);
                assert!(matches!(&a.targets[0], Expr::Name(n) if n.id.as_str() == "x" && n.ctx == ExprContext::Store));
                assert!(matches!(*a.value, Expr::Constant(ref c) if c.value == Constant::Int(1)));
            }
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn chained_comparison_is_one_compare_node() {
        match first_expr("a < b <= c\n") {
            Expr::Compare(c) => {
                assert_eq!(c.ops, vec![CmpOp::Lt, CmpOp::LtE]);
                assert_eq!(c.comparators.len(), 2);
            }
            other => panic!("expected Compare, got {other:?}"),
        }
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        match first_expr("-2 ** 2\n") {
            Expr::UnaryOp(u) => {
                assert_eq!(u.op, UnaryOp::USub);
                assert!(matches!(u.operand.as_ref(), Expr::BinOp(b) if b.op == Operator::Pow));
            }
            other => panic!("expected UnaryOp, got {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        match first_expr("a ** b ** c\n") {
            Expr::BinOp(b) => {
                assert_eq!(b.op, Operator::Pow);
                assert!(matches!(b.right.as_ref(), Expr::BinOp(inner) if inner.op == Operator::Pow));
            }
            other => panic!("expected BinOp, got {other:?}"),
        }
    }

    #[test]
    fn walrus_inside_condition() {
        match first_stmt("if (n := len(items)) > 0 < threshold:\n    print(n)\n") {
            Stmt::If(s) => match s.test.as_ref() {
                Expr::Compare(c) => {
                    assert!(matches!(c.left.as_ref(), Expr::NamedExpr(_)));
                    assert_eq!(c.ops, vec![CmpOp::Gt, CmpOp::Lt]);
                }
                other => panic!("expected Compare, got {other:?}"),
            },
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn function_with_annotations() {
        match first_stmt("def greet(name: str) -> str:\n    return \"Hi \" + name\n") {
            Stmt::FunctionDef(f) => {
                assert_eq!(f.name.as_str(), "greet");
                assert_eq!(f.args.args.len(), 1);
                assert!(f.args.args[0].annotation.is_some());
                assert!(f.returns.is_some());
                assert_eq!(f.body.len(), 1);
            }
            other => panic!("expected FunctionDef, got {other:?}"),
        }
    }

    #[test]
    fn single_element_tuple_parses() {
        match first_expr("(x,)\n") {
            Expr::Tuple(t) => assert_eq!(t.elts.len(), 1),
            other => panic!("expected Tuple, got {other:?}"),
        }
    }

    #[test]
    fn match_with_class_and_mapping_patterns() {
        let src = "match v:\n    case int(x) if x > 0:\n        pass\n    case {\"k\": str(s), **rest}:\n        pass\n";
        match first_stmt(src) {
            Stmt::Match(m) => {
                assert_eq!(m.cases.len(), 2);
                assert!(matches!(m.cases[0].pattern, Pattern::MatchClass(_)));
                assert!(m.cases[0].guard.is_some());
                assert!(matches!(m.cases[1].pattern, Pattern::MatchMapping(_)));
            }
            other => panic!("expected Match, got {other:?}"),
        }
    }

    #[test]
    fn except_star_uniformity_is_enforced() {
        let src = "try:\n    x()\nexcept ValueError:\n    pass\nexcept* TypeError:\n    pass\n";
        let tokens = Lexer::new(src, false).tokenize().unwrap();
        let err = parse_tokens(tokens, false).unwrap_err();
        assert!(err.message.contains("except"));
    }

    #[test]
    fn except_star_accepted_uniformly() {
        let src = "try:\n    x()\nexcept* ValueError as e:\n    pass\n";
        match first_stmt(src) {
            Stmt::TryStar(t) => {
                assert_eq!(t.handlers.len(), 1);
                assert_eq!(t.handlers[0].name.as_ref().unwrap().as_str(), "e");
            }
            other => panic!("expected TryStar, got {other:?}"),
        }
    }

    #[test]
    fn f_string_with_conversion_and_format_spec() {
        let src = "f\"v={obj!r:>{width}.2f}\"\n";
        match first_expr(src) {
            Expr::JoinedStr(j) => {
                assert_eq!(j.values.len(), 2);
                match &j.values[1] {
                    Expr::FormattedValue(f) => {
                        assert_eq!(f.conversion, ConversionFlag::Repr);
                        assert!(f.format_spec.is_some());
                    }
                    other => panic!("expected FormattedValue, got {other:?}"),
                }
            }
            other => panic!("expected JoinedStr, got {other:?}"),
        }
    }

    #[test]
    fn assigning_to_literal_is_rejected() {
        let tokens = Lexer::new("1 = 2\n", false).tokenize().unwrap();
        assert!(parse_tokens(tokens, false).is_err());
    }

    #[test]
    fn tuple_target_aug_assign_is_rejected() {
        let tokens = Lexer::new("x, y += 1\n", false).tokenize().unwrap();
        assert!(parse_tokens(tokens, false).is_err());
    }

    #[test]
    fn list_target_aug_assign_is_rejected() {
        let tokens = Lexer::new("[x, y] += 1\n", false).tokenize().unwrap();
        assert!(parse_tokens(tokens, false).is_err());
    }

    #[test]
    fn single_target_aug_assign_is_accepted() {
        match first_stmt("x += 1\n") {
            Stmt::AugAssign(a) => assert!(matches!(*a.target, Expr::Name(_))),
            other => panic!("expected AugAssign, got {other:?}"),
        }
    }

    #[test]
    fn tuple_target_ann_assign_is_rejected() {
        let tokens = Lexer::new("x, y: int\n", false).tokenize().unwrap();
        assert!(parse_tokens(tokens, false).is_err());
    }

    #[test]
    fn list_comprehension_with_filter() {
        match first_expr("[x**2 for x in range(10) if x % 2 == 0]\n") {
            Expr::ListComp(c) => {
                assert_eq!(c.generators.len(), 1);
                assert_eq!(c.generators[0].ifs.len(), 1);
            }
            other => panic!("expected ListComp, got {other:?}"),
        }
    }

    #[test]
    fn type_alias_statement() {
        match first_stmt("type IntList = list[int]\n") {
            Stmt::TypeAlias(t) => assert!(matches!(t.name.as_ref(), Expr::Name(n) if n.id.as_str() == "IntList")),
            other => panic!("expected TypeAlias, got {other:?}"),
        }
    }

    #[test]
    fn generic_function_with_type_params() {
        match first_stmt("def first[T](xs: list[T]) -> T:\n    return xs[0]\n") {
            Stmt::FunctionDef(f) => {
                assert_eq!(f.type_params.len(), 1);
                assert!(matches!(f.type_params[0], TypeParam::TypeVar(_)));
            }
            other => panic!("expected FunctionDef, got {other:?}"),
        }
    }

    #[test]
    fn with_statement_multiple_items() {
        match first_stmt("with a() as x, b() as y:\n    pass\n") {
            Stmt::With(w) => assert_eq!(w.items.len(), 2),
            other => panic!("expected With, got {other:?}"),
        }
    }

    #[test]
    fn elif_chain_builds_nested_if() {
        match first_stmt("if a:\n    pass\nelif b:\n    pass\nelse:\n    pass\n") {
            Stmt::If(s) => match s.orelse.as_slice() {
                [Stmt::If(nested)] => assert_eq!(nested.orelse.len(), 1),
                other => panic!("expected nested If, got {other:?}"),
            },
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_import_with_trailing_comma() {
        match first_stmt("from pkg import (a, b as c,)\n") {
            Stmt::ImportFrom(i) => {
                assert_eq!(i.names.len(), 2);
                assert_eq!(i.names[1].asname.as_ref().unwrap().as_str(), "c");
            }
            other => panic!("expected ImportFrom, got {other:?}"),
        }
    }

    #[test]
    fn empty_module_parses() {
        match parse("") {
            Mod::Module(m) => assert!(m.body.is_empty()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn match_statement_with_single_pattern() {
        match first_stmt("match command:\n    case \"go\":\n        pass\n") {
            Stmt::Match(m) => {
                assert_eq!(m.cases.len(), 1);
                assert!(matches!(m.cases[0].pattern, Pattern::MatchValue(_)));
            }
            other => panic!("expected Match, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_parameter_name_is_rejected() {
        let tokens = Lexer::new("def f(x, x):\n    pass\n", false).tokenize().unwrap();
        let err = parse_tokens(tokens, false).unwrap_err();
        assert!(err.to_string().contains("duplicate argument 'x'"));
    }

    #[test]
    fn duplicate_across_positional_and_starred_is_rejected() {
        let tokens = Lexer::new("def f(x, *x):\n    pass\n", false).tokenize().unwrap();
        assert!(parse_tokens(tokens, false).is_err());
    }
}
