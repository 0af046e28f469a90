//! Converts an AST back into Python source.
//!
//! The expression half of this file is a direct generalization of the
//! classic `Unparser::unparse_expr` shape (same precedence table, same
//! `p`/`p_id`/`p_if`/`p_delim`/`group_if!`/`op_prec!` helpers), adapted from
//! a generic `Expr<U>` + `fmt::Formatter` trick to our concrete `Expr` +
//! a small owned-`String` printer, since the statement half needs to carry
//! indentation state across many lines rather than format one expression
//! into a single `Display` call.

use crate::builtin::Constant;
use crate::nodes::*;
use crate::operators::{BoolOp, ConversionFlag, Operator, UnaryOp};
use std::fmt::Write as _;

mod precedence {
    macro_rules! precedence {
        ($($op:ident,)*) => {
            precedence!(@0, $($op,)*);
        };
        (@$i:expr, $op1:ident, $($op:ident,)*) => {
            pub const $op1: u8 = $i;
            precedence!(@$i + 1, $($op,)*);
        };
        (@$i:expr,) => {};
    }
    precedence!(
        TUPLE, TEST, OR, AND, NOT, CMP, // "EXPR" =
        BOR, BXOR, BAND, SHIFT, ARITH, TERM, FACTOR, POWER, AWAIT, ATOM,
    );
    pub const EXPR: u8 = BOR;
}

/// Indentation unit used when a caller doesn't supply [`UnparseOptions`].
/// CPython's own tokenizer tolerates tabs or any consistent width; four
/// spaces is what `unparse` assumes when reproducing a tree that didn't
/// come from a `parse` round-trip.
const DEFAULT_INDENT: &str = "    ";

/// Options controlling a single [`unparse`]/[`unparse_expr`] call.
#[derive(Clone, Debug)]
pub struct UnparseOptions {
    /// The string repeated `depth` times at the start of each indented
    /// line. Defaults to four spaces; tabs and other strings are
    /// permitted, matching the external interface contract.
    pub indent: String,
}

impl Default for UnparseOptions {
    fn default() -> Self {
        Self { indent: DEFAULT_INDENT.to_string() }
    }
}

impl UnparseOptions {
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self { indent: indent.into() }
    }
}

pub struct Unparser {
    out: String,
    indent: usize,
    indent_unit: String,
}

impl Unparser {
    fn new(options: &UnparseOptions) -> Self {
        Self { out: String::new(), indent: 0, indent_unit: options.indent.clone() }
    }

    /// A fresh buffer sharing this printer's indent unit, for the
    /// self-contained sub-renders f-string interpolation needs (the
    /// embedded expression and joined-string bodies are assembled
    /// separately, then spliced back in).
    fn sub_buffer(&self) -> Self {
        Self { out: String::new(), indent: 0, indent_unit: self.indent_unit.clone() }
    }

    fn p(&mut self, s: &str) -> std::fmt::Result {
        self.out.write_str(s)
    }

    fn p_id(&mut self, s: &str) -> std::fmt::Result {
        self.out.write_str(s)
    }

    fn p_if(&mut self, cond: bool, s: &str) -> std::fmt::Result {
        if cond {
            self.out.write_str(s)?;
        }
        Ok(())
    }

    fn p_delim(&mut self, first: &mut bool, s: &str) -> std::fmt::Result {
        self.p_if(!std::mem::take(first), s)
    }

    fn newline_indent(&mut self) -> std::fmt::Result {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.write_str(&self.indent_unit)?;
        }
        Ok(())
    }

    fn indented(&mut self, body: impl FnOnce(&mut Self) -> std::fmt::Result) -> std::fmt::Result {
        self.indent += 1;
        let ret = body(self);
        self.indent -= 1;
        ret
    }

    // -- expressions ----------------------------------------------------

    fn unparse_expr(&mut self, ast: &Expr, level: u8) -> std::fmt::Result {
        macro_rules! op_prec {
            ($op_ty:ident, $x:expr, $enu:path, $($var:ident($op:literal, $prec:ident)),*$(,)?) => {
                match $x {
                    $(<$enu>::$var => (op_prec!(@space $op_ty, $op), precedence::$prec),)*
                }
            };
            (@space bin, $op:literal) => {
                concat!(" ", $op, " ")
            };
            (@space un, $op:literal) => {
                $op
            };
        }
        macro_rules! group_if {
            ($lvl:expr, $body:block) => {{
                let group = level > $lvl;
                self.p_if(group, "(")?;
                let ret = $body;
                self.p_if(group, ")")?;
                ret
            }};
        }
        match ast {
            Expr::BoolOp(ExprBoolOp { op, values, .. }) => {
                let (op, prec) = op_prec!(bin, op, BoolOp, And("and", AND), Or("or", OR));
                group_if!(prec, {
                    let mut first = true;
                    for val in values {
                        self.p_delim(&mut first, op)?;
                        self.unparse_expr(val, prec + 1)?;
                    }
                })
            }
            Expr::NamedExpr(ExprNamedExpr { target, value, .. }) => {
                group_if!(precedence::TUPLE, {
                    self.unparse_expr(target, precedence::ATOM)?;
                    self.p(" := ")?;
                    self.unparse_expr(value, precedence::ATOM)?;
                })
            }
            Expr::BinOp(ExprBinOp { left, op, right, .. }) => {
                let right_associative = matches!(op, Operator::Pow);
                let (op, prec) = op_prec!(
                    bin,
                    op,
                    Operator,
                    Add("+", ARITH),
                    Sub("-", ARITH),
                    Mult("*", TERM),
                    MatMult("@", TERM),
                    Div("/", TERM),
                    Mod("%", TERM),
                    Pow("**", POWER),
                    LShift("<<", SHIFT),
                    RShift(">>", SHIFT),
                    BitOr("|", BOR),
                    BitXor("^", BXOR),
                    BitAnd("&", BAND),
                    FloorDiv("//", TERM),
                );
                group_if!(prec, {
                    self.unparse_expr(left, prec + right_associative as u8)?;
                    self.p(op)?;
                    self.unparse_expr(right, prec + !right_associative as u8)?;
                })
            }
            Expr::UnaryOp(ExprUnaryOp { op, operand, .. }) => {
                let (op, prec) = op_prec!(
                    un,
                    op,
                    UnaryOp,
                    Invert("~", FACTOR),
                    Not("not ", NOT),
                    UAdd("+", FACTOR),
                    USub("-", FACTOR)
                );
                group_if!(prec, {
                    self.p(op)?;
                    self.unparse_expr(operand, prec)?;
                })
            }
            Expr::Lambda(ExprLambda { args, body, .. }) => {
                group_if!(precedence::TEST, {
                    let pos = args.args.len() + args.posonlyargs.len();
                    self.p(if pos > 0 { "lambda " } else { "lambda" })?;
                    self.unparse_arguments(args)?;
                    self.p(": ")?;
                    self.unparse_expr(body, precedence::TEST)?;
                })
            }
            Expr::IfExp(ExprIfExp { test, body, orelse, .. }) => {
                group_if!(precedence::TEST, {
                    self.unparse_expr(body, precedence::TEST + 1)?;
                    self.p(" if ")?;
                    self.unparse_expr(test, precedence::TEST + 1)?;
                    self.p(" else ")?;
                    self.unparse_expr(orelse, precedence::TEST)?;
                })
            }
            Expr::Dict(ExprDict { keys, values, .. }) => {
                self.p("{")?;
                let mut first = true;
                let (packed, unpacked) = values.split_at(keys.len());
                for (k, v) in keys.iter().zip(packed) {
                    self.p_delim(&mut first, ", ")?;
                    if let Some(k) = k {
                        self.unparse_expr(k, precedence::TEST)?;
                        self.p(": ")?;
                        self.unparse_expr(v, precedence::TEST)?;
                    } else {
                        self.p("**")?;
                        self.unparse_expr(v, precedence::TEST)?;
                    }
                }
                for d in unpacked {
                    self.p_delim(&mut first, ", ")?;
                    self.p("**")?;
                    self.unparse_expr(d, precedence::TEST)?;
                }
                self.p("}")?;
            }
            Expr::Set(ExprSet { elts, .. }) => {
                if elts.is_empty() {
                    // `{}` means empty dict; CPython spells an empty set via `set()`.
                    return self.p("set()");
                }
                self.p("{")?;
                let mut first = true;
                for v in elts {
                    self.p_delim(&mut first, ", ")?;
                    self.unparse_expr(v, precedence::TEST)?;
                }
                self.p("}")?;
            }
            Expr::ListComp(ExprListComp { elt, generators, .. }) => {
                self.p("[")?;
                self.unparse_expr(elt, precedence::TEST)?;
                self.unparse_comp(generators)?;
                self.p("]")?;
            }
            Expr::SetComp(ExprSetComp { elt, generators, .. }) => {
                self.p("{")?;
                self.unparse_expr(elt, precedence::TEST)?;
                self.unparse_comp(generators)?;
                self.p("}")?;
            }
            Expr::DictComp(ExprDictComp { key, value, generators, .. }) => {
                self.p("{")?;
                self.unparse_expr(key, precedence::TEST)?;
                self.p(": ")?;
                self.unparse_expr(value, precedence::TEST)?;
                self.unparse_comp(generators)?;
                self.p("}")?;
            }
            Expr::GeneratorExp(ExprGeneratorExp { elt, generators, .. }) => {
                self.p("(")?;
                self.unparse_expr(elt, precedence::TEST)?;
                self.unparse_comp(generators)?;
                self.p(")")?;
            }
            Expr::Await(ExprAwait { value, .. }) => {
                group_if!(precedence::AWAIT, {
                    self.p("await ")?;
                    self.unparse_expr(value, precedence::ATOM)?;
                })
            }
            Expr::Yield(ExprYield { value, .. }) => {
                if let Some(value) = value {
                    self.p("(yield ")?;
                    self.unparse_expr(value, precedence::TEST)?;
                    self.p(")")?;
                } else {
                    self.p("(yield)")?;
                }
            }
            Expr::YieldFrom(ExprYieldFrom { value, .. }) => {
                self.p("(yield from ")?;
                self.unparse_expr(value, precedence::TEST)?;
                self.p(")")?;
            }
            Expr::Compare(ExprCompare { left, ops, comparators, .. }) => {
                group_if!(precedence::CMP, {
                    let new_lvl = precedence::CMP + 1;
                    self.unparse_expr(left, new_lvl)?;
                    for (op, cmp) in ops.iter().zip(comparators) {
                        self.p(" ")?;
                        self.p(op.as_str())?;
                        self.p(" ")?;
                        self.unparse_expr(cmp, new_lvl)?;
                    }
                })
            }
            Expr::Call(ExprCall { func, args, keywords, .. }) => {
                self.unparse_expr(func, precedence::ATOM)?;
                self.p("(")?;
                if let ([Expr::GeneratorExp(ExprGeneratorExp { elt, generators, .. })], []) =
                    (&args[..], &keywords[..])
                {
                    // a lone genexpr argument doesn't need a second pair of parens
                    self.unparse_expr(elt, precedence::TEST)?;
                    self.unparse_comp(generators)?;
                } else {
                    let mut first = true;
                    for arg in args {
                        self.p_delim(&mut first, ", ")?;
                        self.unparse_expr(arg, precedence::TEST)?;
                    }
                    for kw in keywords {
                        self.p_delim(&mut first, ", ")?;
                        if let Some(arg) = &kw.arg {
                            self.p_id(arg.as_str())?;
                            self.p("=")?;
                        } else {
                            self.p("**")?;
                        }
                        self.unparse_expr(&kw.value, precedence::TEST)?;
                    }
                }
                self.p(")")?;
            }
            Expr::FormattedValue(ExprFormattedValue { value, conversion, format_spec, .. }) => {
                self.unparse_formatted(value, *conversion, format_spec.as_deref())?
            }
            Expr::JoinedStr(ExprJoinedStr { values, .. }) => self.unparse_joined_str(values, false)?,
            Expr::Constant(ExprConstant { value, kind, .. }) => {
                if let Some(kind) = kind {
                    write!(self.out, "{kind}")?;
                }
                const INF_STR: &str = "1e309";
                match value {
                    Constant::Float(f) if f.is_infinite() => self.p(INF_STR)?,
                    Constant::Complex { real, imag } if real.is_infinite() || imag.is_infinite() => {
                        self.p(&value.to_string().replace("inf", INF_STR))?
                    }
                    _ => write!(self.out, "{value}")?,
                }
            }
            Expr::Attribute(ExprAttribute { value, attr, .. }) => {
                self.unparse_expr(value, precedence::ATOM)?;
                let period = if matches!(
                    value.as_ref(),
                    Expr::Constant(ExprConstant { value: Constant::Int(_), .. })
                ) {
                    " ."
                } else {
                    "."
                };
                self.p(period)?;
                self.p_id(attr.as_str())?;
            }
            Expr::Subscript(ExprSubscript { value, slice, .. }) => {
                self.unparse_expr(value, precedence::ATOM)?;
                let mut lvl = precedence::TUPLE;
                if let Expr::Tuple(ExprTuple { elts, .. }) = slice.as_ref() {
                    if elts.iter().any(Expr::is_starred) {
                        lvl += 1;
                    }
                }
                self.p("[")?;
                self.unparse_expr(slice, lvl)?;
                self.p("]")?;
            }
            Expr::Starred(ExprStarred { value, .. }) => {
                self.p("*")?;
                self.unparse_expr(value, precedence::EXPR)?;
            }
            Expr::Name(ExprName { id, .. }) => self.p_id(id.as_str())?,
            Expr::List(ExprList { elts, .. }) => {
                self.p("[")?;
                let mut first = true;
                for elt in elts {
                    self.p_delim(&mut first, ", ")?;
                    self.unparse_expr(elt, precedence::TEST)?;
                }
                self.p("]")?;
            }
            Expr::Tuple(ExprTuple { elts, .. }) => {
                if elts.is_empty() {
                    self.p("()")?;
                } else {
                    group_if!(precedence::TUPLE, {
                        let mut first = true;
                        for elt in elts {
                            self.p_delim(&mut first, ", ")?;
                            self.unparse_expr(elt, precedence::TEST)?;
                        }
                        self.p_if(elts.len() == 1, ",")?;
                    })
                }
            }
            Expr::Slice(ExprSlice { lower, upper, step, .. }) => {
                if let Some(lower) = lower {
                    self.unparse_expr(lower, precedence::TEST)?;
                }
                self.p(":")?;
                if let Some(upper) = upper {
                    self.unparse_expr(upper, precedence::TEST)?;
                }
                if let Some(step) = step {
                    self.p(":")?;
                    self.unparse_expr(step, precedence::TEST)?;
                }
            }
        }
        Ok(())
    }

    fn unparse_arguments(&mut self, args: &Arguments) -> std::fmt::Result {
        let mut first = true;
        let defaults_start = args.posonlyargs.len() + args.args.len() - args.defaults.len();
        for (i, arg) in args.posonlyargs.iter().chain(&args.args).enumerate() {
            self.p_delim(&mut first, ", ")?;
            self.unparse_arg(arg)?;
            if let Some(default_idx) = i.checked_sub(defaults_start) {
                self.p("=")?;
                self.unparse_expr(&args.defaults[default_idx], precedence::TEST)?;
            }
            self.p_if(!args.posonlyargs.is_empty() && i + 1 == args.posonlyargs.len(), ", /")?;
        }
        if args.vararg.is_some() || !args.kwonlyargs.is_empty() {
            self.p_delim(&mut first, ", ")?;
            self.p("*")?;
        }
        if let Some(vararg) = &args.vararg {
            self.unparse_arg(vararg)?;
        }
        for (kwarg, default) in args.kwonlyargs.iter().zip(&args.kw_defaults) {
            self.p_delim(&mut first, ", ")?;
            self.unparse_arg(kwarg)?;
            if let Some(default) = default {
                self.p("=")?;
                self.unparse_expr(default, precedence::TEST)?;
            }
        }
        if let Some(kwarg) = &args.kwarg {
            self.p_delim(&mut first, ", ")?;
            self.p("**")?;
            self.unparse_arg(kwarg)?;
        }
        Ok(())
    }

    fn unparse_arg(&mut self, arg: &Arg) -> std::fmt::Result {
        self.p_id(arg.arg.as_str())?;
        if let Some(ann) = &arg.annotation {
            self.p(": ")?;
            self.unparse_expr(ann, precedence::TEST)?;
        }
        Ok(())
    }

    fn unparse_comp(&mut self, generators: &[Comprehension]) -> std::fmt::Result {
        for comp in generators {
            self.p(if comp.is_async { " async for " } else { " for " })?;
            self.unparse_expr(&comp.target, precedence::TUPLE)?;
            self.p(" in ")?;
            self.unparse_expr(&comp.iter, precedence::TEST + 1)?;
            for cond in &comp.ifs {
                self.p(" if ")?;
                self.unparse_expr(cond, precedence::TEST + 1)?;
            }
        }
        Ok(())
    }

    fn unparse_fstring_body(&mut self, values: &[Expr], is_spec: bool) -> std::fmt::Result {
        for value in values {
            self.unparse_fstring_elem(value, is_spec)?;
        }
        Ok(())
    }

    fn unparse_formatted(
        &mut self,
        val: &Expr,
        conversion: ConversionFlag,
        spec: Option<&Expr>,
    ) -> std::fmt::Result {
        let mut buf = self.sub_buffer();
        buf.unparse_expr(val, precedence::TEST + 1)?;
        let buffered = buf.out;
        let brace = if buffered.starts_with('{') { "{ " } else { "{" };
        self.p(brace)?;
        self.p(&buffered)?;

        if conversion != ConversionFlag::None {
            self.p("!")?;
            if let Some(c) = conversion.as_char() {
                self.out.push(c);
            }
        }

        if let Some(spec) = spec {
            self.p(":")?;
            self.unparse_fstring_elem(spec, true)?;
        }

        self.p("}")
    }

    fn unparse_fstring_elem(&mut self, expr: &Expr, is_spec: bool) -> std::fmt::Result {
        match expr {
            Expr::Constant(ExprConstant { value: Constant::Str(s), .. }) => self.unparse_fstring_str(s),
            Expr::JoinedStr(ExprJoinedStr { values, .. }) => self.unparse_joined_str(values, is_spec),
            Expr::FormattedValue(ExprFormattedValue { value, conversion, format_spec, .. }) => {
                self.unparse_formatted(value, *conversion, format_spec.as_deref())
            }
            _ => unreachable!("f-string body may only contain literal text or formatted values"),
        }
    }

    fn unparse_fstring_str(&mut self, s: &str) -> std::fmt::Result {
        let s = s.replace('{', "{{").replace('}', "}}");
        self.p(&s)
    }

    fn unparse_joined_str(&mut self, values: &[Expr], is_spec: bool) -> std::fmt::Result {
        if is_spec {
            self.unparse_fstring_body(values, is_spec)
        } else {
            self.p("f")?;
            let mut buf = self.sub_buffer();
            buf.unparse_fstring_body(values, is_spec)?;
            let body = pytree_literal::escape::UnicodeEscape::new_repr(&buf.out)
                .str_repr()
                .to_string_repr();
            self.p(&body)
        }
    }

    // -- statements -------------------------------------------------------

    fn unparse_suite(&mut self, body: &[Stmt]) -> std::fmt::Result {
        self.indented(|this| {
            for stmt in body {
                this.newline_indent()?;
                this.unparse_stmt(stmt)?;
            }
            Ok(())
        })
    }

    fn unparse_decorators(&mut self, decorators: &[Expr]) -> std::fmt::Result {
        for dec in decorators {
            self.p("@")?;
            self.unparse_expr(dec, precedence::TEST)?;
            self.newline_indent()?;
        }
        Ok(())
    }

    fn unparse_type_params(&mut self, type_params: &[TypeParam]) -> std::fmt::Result {
        if type_params.is_empty() {
            return Ok(());
        }
        self.p("[")?;
        let mut first = true;
        for tp in type_params {
            self.p_delim(&mut first, ", ")?;
            match tp {
                TypeParam::TypeVar(t) => {
                    self.p_id(t.name.as_str())?;
                    if let Some(bound) = &t.bound {
                        self.p(": ")?;
                        self.unparse_expr(bound, precedence::TEST)?;
                    }
                    if let Some(default) = &t.default {
                        self.p(" = ")?;
                        self.unparse_expr(default, precedence::TEST)?;
                    }
                }
                TypeParam::ParamSpec(t) => {
                    self.p("**")?;
                    self.p_id(t.name.as_str())?;
                    if let Some(default) = &t.default {
                        self.p(" = ")?;
                        self.unparse_expr(default, precedence::TEST)?;
                    }
                }
                TypeParam::TypeVarTuple(t) => {
                    self.p("*")?;
                    self.p_id(t.name.as_str())?;
                    if let Some(default) = &t.default {
                        self.p(" = ")?;
                        self.unparse_expr(default, precedence::TEST)?;
                    }
                }
            }
        }
        self.p("]")
    }

    fn unparse_inline_comment(&mut self, comment: &Option<Comment>) -> std::fmt::Result {
        if let Some(comment) = comment {
            self.p("  ")?;
            self.p(&comment.text)?;
        }
        Ok(())
    }

    fn unparse_stmt(&mut self, stmt: &Stmt) -> std::fmt::Result {
        match stmt {
            Stmt::FunctionDef(s) => {
                self.unparse_decorators(&s.decorator_list)?;
                self.p("def ")?;
                self.p_id(s.name.as_str())?;
                self.unparse_type_params(&s.type_params)?;
                self.p("(")?;
                self.unparse_arguments(&s.args)?;
                self.p(")")?;
                if let Some(returns) = &s.returns {
                    self.p(" -> ")?;
                    self.unparse_expr(returns, precedence::TEST)?;
                }
                self.p(":")?;
                self.unparse_inline_comment(&s.inline_comment)?;
                self.unparse_suite(&s.body)?;
            }
            Stmt::AsyncFunctionDef(s) => {
                self.unparse_decorators(&s.decorator_list)?;
                self.p("async def ")?;
                self.p_id(s.name.as_str())?;
                self.unparse_type_params(&s.type_params)?;
                self.p("(")?;
                self.unparse_arguments(&s.args)?;
                self.p(")")?;
                if let Some(returns) = &s.returns {
                    self.p(" -> ")?;
                    self.unparse_expr(returns, precedence::TEST)?;
                }
                self.p(":")?;
                self.unparse_inline_comment(&s.inline_comment)?;
                self.unparse_suite(&s.body)?;
            }
            Stmt::ClassDef(s) => {
                self.unparse_decorators(&s.decorator_list)?;
                self.p("class ")?;
                self.p_id(s.name.as_str())?;
                self.unparse_type_params(&s.type_params)?;
                if !s.bases.is_empty() || !s.keywords.is_empty() {
                    self.p("(")?;
                    let mut first = true;
                    for base in &s.bases {
                        self.p_delim(&mut first, ", ")?;
                        self.unparse_expr(base, precedence::TEST)?;
                    }
                    for kw in &s.keywords {
                        self.p_delim(&mut first, ", ")?;
                        if let Some(arg) = &kw.arg {
                            self.p_id(arg.as_str())?;
                            self.p("=")?;
                        } else {
                            self.p("**")?;
                        }
                        self.unparse_expr(&kw.value, precedence::TEST)?;
                    }
                    self.p(")")?;
                }
                self.p(":")?;
                self.unparse_inline_comment(&s.inline_comment)?;
                self.unparse_suite(&s.body)?;
            }
            Stmt::Return(s) => {
                self.p("return")?;
                if let Some(value) = &s.value {
                    self.p(" ")?;
                    self.unparse_expr(value, precedence::TEST)?;
                }
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::Delete(s) => {
                self.p("del ")?;
                let mut first = true;
                for t in &s.targets {
                    self.p_delim(&mut first, ", ")?;
                    self.unparse_expr(t, precedence::TEST)?;
                }
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::Assign(s) => {
                for t in &s.targets {
                    self.unparse_expr(t, precedence::TEST)?;
                    self.p(" = ")?;
                }
                self.unparse_expr(&s.value, precedence::TEST)?;
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::AugAssign(s) => {
                self.unparse_expr(&s.target, precedence::TEST)?;
                self.p(" ")?;
                self.p(s.op.as_str())?;
                self.p("= ")?;
                self.unparse_expr(&s.value, precedence::TEST)?;
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::AnnAssign(s) => {
                let parenthesize = !s.simple;
                self.p_if(parenthesize, "(")?;
                self.unparse_expr(&s.target, precedence::TEST)?;
                self.p_if(parenthesize, ")")?;
                self.p(": ")?;
                self.unparse_expr(&s.annotation, precedence::TEST)?;
                if let Some(value) = &s.value {
                    self.p(" = ")?;
                    self.unparse_expr(value, precedence::TEST)?;
                }
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::TypeAlias(s) => {
                self.p("type ")?;
                self.unparse_expr(&s.name, precedence::TEST)?;
                self.unparse_type_params(&s.type_params)?;
                self.p(" = ")?;
                self.unparse_expr(&s.value, precedence::TEST)?;
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::For(s) => self.unparse_for(false, &s.target, &s.iter, &s.body, &s.orelse, &s.inline_comment)?,
            Stmt::AsyncFor(s) => self.unparse_for(true, &s.target, &s.iter, &s.body, &s.orelse, &s.inline_comment)?,
            Stmt::While(s) => {
                self.p("while ")?;
                self.unparse_expr(&s.test, precedence::TEST)?;
                self.p(":")?;
                self.unparse_inline_comment(&s.inline_comment)?;
                self.unparse_suite(&s.body)?;
                self.unparse_orelse(&s.orelse)?;
            }
            Stmt::If(s) => {
                self.p("if ")?;
                self.unparse_expr(&s.test, precedence::TEST)?;
                self.p(":")?;
                self.unparse_inline_comment(&s.inline_comment)?;
                self.unparse_suite(&s.body)?;
                // A single trailing `elif` renders as `elif` rather than a
                // nested `else: if ...:` block.
                if let [Stmt::If(elif)] = &s.orelse[..] {
                    self.newline_indent()?;
                    self.p("el")?;
                    self.unparse_stmt(&Stmt::If(elif.clone()))?;
                } else {
                    self.unparse_orelse(&s.orelse)?;
                }
            }
            Stmt::With(s) => self.unparse_with(false, &s.items, &s.body, &s.inline_comment)?,
            Stmt::AsyncWith(s) => self.unparse_with(true, &s.items, &s.body, &s.inline_comment)?,
            Stmt::Match(s) => {
                self.p("match ")?;
                self.unparse_expr(&s.subject, precedence::TEST)?;
                self.p(":")?;
                self.unparse_inline_comment(&s.inline_comment)?;
                self.indented(|this| {
                    for case in &s.cases {
                        this.newline_indent()?;
                        this.p("case ")?;
                        this.unparse_pattern(&case.pattern)?;
                        if let Some(guard) = &case.guard {
                            this.p(" if ")?;
                            this.unparse_expr(guard, precedence::TEST)?;
                        }
                        this.p(":")?;
                        this.unparse_suite(&case.body)?;
                    }
                    Ok(())
                })?;
            }
            Stmt::Raise(s) => {
                self.p("raise")?;
                if let Some(exc) = &s.exc {
                    self.p(" ")?;
                    self.unparse_expr(exc, precedence::TEST)?;
                }
                if let Some(cause) = &s.cause {
                    self.p(" from ")?;
                    self.unparse_expr(cause, precedence::TEST)?;
                }
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::Try(s) => self.unparse_try(false, &s.body, &s.handlers, &s.orelse, &s.finalbody, &s.inline_comment)?,
            Stmt::TryStar(s) => self.unparse_try(true, &s.body, &s.handlers, &s.orelse, &s.finalbody, &s.inline_comment)?,
            Stmt::Assert(s) => {
                self.p("assert ")?;
                self.unparse_expr(&s.test, precedence::TEST)?;
                if let Some(msg) = &s.msg {
                    self.p(", ")?;
                    self.unparse_expr(msg, precedence::TEST)?;
                }
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::Import(s) => {
                self.p("import ")?;
                self.unparse_aliases(&s.names)?;
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::ImportFrom(s) => {
                self.p("from ")?;
                for _ in 0..s.level {
                    self.p(".")?;
                }
                if let Some(module) = &s.module {
                    self.p_id(module.as_str())?;
                }
                self.p(" import ")?;
                self.unparse_aliases(&s.names)?;
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::Global(s) => {
                self.p("global ")?;
                let mut first = true;
                for n in &s.names {
                    self.p_delim(&mut first, ", ")?;
                    self.p_id(n.as_str())?;
                }
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::Nonlocal(s) => {
                self.p("nonlocal ")?;
                let mut first = true;
                for n in &s.names {
                    self.p_delim(&mut first, ", ")?;
                    self.p_id(n.as_str())?;
                }
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::Expr(s) => {
                self.unparse_expr(&s.value, precedence::TEST)?;
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::Pass(s) => {
                self.p("pass")?;
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::Break(s) => {
                self.p("break")?;
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::Continue(s) => {
                self.p("continue")?;
                self.unparse_inline_comment(&s.inline_comment)?;
            }
            Stmt::Comment(s) => self.p(&s.comment.text)?,
        }
        Ok(())
    }

    fn unparse_for(
        &mut self,
        is_async: bool,
        target: &Expr,
        iter: &Expr,
        body: &[Stmt],
        orelse: &[Stmt],
        inline_comment: &Option<Comment>,
    ) -> std::fmt::Result {
        self.p_if(is_async, "async ")?;
        self.p("for ")?;
        self.unparse_expr(target, precedence::TUPLE)?;
        self.p(" in ")?;
        self.unparse_expr(iter, precedence::TEST)?;
        self.p(":")?;
        self.unparse_inline_comment(inline_comment)?;
        self.unparse_suite(body)?;
        self.unparse_orelse(orelse)
    }

    fn unparse_orelse(&mut self, orelse: &[Stmt]) -> std::fmt::Result {
        if orelse.is_empty() {
            return Ok(());
        }
        self.newline_indent()?;
        self.p("else:")?;
        self.unparse_suite(orelse)
    }

    fn unparse_with(
        &mut self,
        is_async: bool,
        items: &[WithItem],
        body: &[Stmt],
        inline_comment: &Option<Comment>,
    ) -> std::fmt::Result {
        self.p_if(is_async, "async ")?;
        self.p("with ")?;
        let mut first = true;
        for item in items {
            self.p_delim(&mut first, ", ")?;
            self.unparse_expr(&item.context_expr, precedence::TEST)?;
            if let Some(vars) = &item.optional_vars {
                self.p(" as ")?;
                self.unparse_expr(vars, precedence::TEST)?;
            }
        }
        self.p(":")?;
        self.unparse_inline_comment(inline_comment)?;
        self.unparse_suite(body)
    }

    fn unparse_try(
        &mut self,
        is_star: bool,
        body: &[Stmt],
        handlers: &[ExceptHandler],
        orelse: &[Stmt],
        finalbody: &[Stmt],
        inline_comment: &Option<Comment>,
    ) -> std::fmt::Result {
        self.p("try:")?;
        self.unparse_inline_comment(inline_comment)?;
        self.unparse_suite(body)?;
        for handler in handlers {
            self.newline_indent()?;
            self.p("except")?;
            self.p_if(is_star, "*")?;
            if let Some(exc_type) = &handler.exc_type {
                self.p(" ")?;
                self.unparse_expr(exc_type, precedence::TEST)?;
            }
            if let Some(name) = &handler.name {
                self.p(" as ")?;
                self.p_id(name.as_str())?;
            }
            self.p(":")?;
            self.unparse_suite(&handler.body)?;
        }
        self.unparse_orelse(orelse)?;
        if !finalbody.is_empty() {
            self.newline_indent()?;
            self.p("finally:")?;
            self.unparse_suite(finalbody)?;
        }
        Ok(())
    }

    fn unparse_aliases(&mut self, names: &[Alias]) -> std::fmt::Result {
        let mut first = true;
        for alias in names {
            self.p_delim(&mut first, ", ")?;
            self.p_id(alias.name.as_str())?;
            if let Some(asname) = &alias.asname {
                self.p(" as ")?;
                self.p_id(asname.as_str())?;
            }
        }
        Ok(())
    }

    fn unparse_pattern(&mut self, pattern: &Pattern) -> std::fmt::Result {
        match pattern {
            Pattern::MatchValue(p) => self.unparse_expr(&p.value, precedence::TEST)?,
            Pattern::MatchSingleton(p) => write!(self.out, "{}", p.value)?,
            Pattern::MatchSequence(p) => {
                self.p("[")?;
                let mut first = true;
                for sub in &p.patterns {
                    self.p_delim(&mut first, ", ")?;
                    self.unparse_pattern(sub)?;
                }
                self.p("]")?;
            }
            Pattern::MatchMapping(p) => {
                self.p("{")?;
                let mut first = true;
                for (key, sub) in p.keys.iter().zip(&p.patterns) {
                    self.p_delim(&mut first, ", ")?;
                    self.unparse_expr(key, precedence::TEST)?;
                    self.p(": ")?;
                    self.unparse_pattern(sub)?;
                }
                if let Some(rest) = &p.rest {
                    self.p_delim(&mut first, ", ")?;
                    self.p("**")?;
                    self.p_id(rest.as_str())?;
                }
                self.p("}")?;
            }
            Pattern::MatchClass(p) => {
                self.unparse_expr(&p.cls, precedence::ATOM)?;
                self.p("(")?;
                let mut first = true;
                for sub in &p.patterns {
                    self.p_delim(&mut first, ", ")?;
                    self.unparse_pattern(sub)?;
                }
                for (attr, sub) in p.kwd_attrs.iter().zip(&p.kwd_patterns) {
                    self.p_delim(&mut first, ", ")?;
                    self.p_id(attr.as_str())?;
                    self.p("=")?;
                    self.unparse_pattern(sub)?;
                }
                self.p(")")?;
            }
            Pattern::MatchStar(p) => {
                self.p("*")?;
                self.p_id(p.name.as_deref().unwrap_or("_"))?;
            }
            Pattern::MatchAs(p) => {
                if let Some(sub) = &p.pattern {
                    self.unparse_pattern(sub)?;
                    self.p(" as ")?;
                }
                self.p_id(p.name.as_deref().unwrap_or("_"))?;
            }
            Pattern::MatchOr(p) => {
                let mut first = true;
                for sub in &p.patterns {
                    self.p_delim(&mut first, " | ")?;
                    self.unparse_pattern(sub)?;
                }
            }
        }
        Ok(())
    }
}

/// Renders a standalone expression as source text, using the default
/// four-space indent unit (irrelevant to a single expression, but kept for
/// symmetry with [`unparse_expr_with_options`]).
pub fn unparse_expr(expr: &Expr) -> String {
    unparse_expr_with_options(expr, &UnparseOptions::default())
}

/// Renders a standalone expression as source text per `options`.
pub fn unparse_expr_with_options(expr: &Expr, options: &UnparseOptions) -> String {
    let mut u = Unparser::new(options);
    let _ = u.unparse_expr(expr, precedence::TEST);
    u.out
}

/// Renders a whole module, interactive block, or bare expression back into
/// source text, one top-level statement per line, using the default
/// four-space indent unit.
pub fn unparse(module: &Mod) -> String {
    unparse_with_options(module, &UnparseOptions::default())
}

/// Renders a whole module, interactive block, or bare expression back into
/// source text per `options`.
pub fn unparse_with_options(module: &Mod, options: &UnparseOptions) -> String {
    let mut u = Unparser::new(options);
    let body: &[Stmt] = match module {
        Mod::Module(m) => &m.body,
        Mod::Interactive(m) => &m.body,
        Mod::Expression(e) => {
            let _ = u.unparse_expr(&e.body, precedence::TEST);
            return u.out;
        }
        Mod::FunctionType(_) => &[],
    };
    let mut first = true;
    for stmt in body {
        if !std::mem::take(&mut first) {
            u.out.push('\n');
        }
        let _ = u.unparse_stmt(stmt);
    }
    u.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::ExprContext;
    use pytree_parser_core::{Location, SourceSpan};

    fn span() -> SourceSpan {
        SourceSpan::new(Location::new(1, 0), Location::new(1, 1))
    }

    fn name(id: &str) -> Expr {
        Expr::Name(ExprName { span: span(), id: crate::builtin::Identifier::new(id, span()), ctx: ExprContext::Load })
    }

    #[test]
    fn binop_respects_precedence() {
        let expr = Expr::BinOp(ExprBinOp {
            span: span(),
            left: Box::new(name("a")),
            op: Operator::Mult,
            right: Box::new(Expr::BinOp(ExprBinOp {
                span: span(),
                left: Box::new(name("b")),
                op: Operator::Add,
                right: Box::new(name("c")),
            })),
        });
        assert_eq!(unparse_expr(&expr), "a * (b + c)");
    }

    #[test]
    fn tuple_of_one_keeps_trailing_comma() {
        let expr = Expr::Tuple(ExprTuple { span: span(), elts: vec![name("a")], ctx: ExprContext::Load });
        assert_eq!(unparse_expr(&expr), "(a,)");
    }

    #[test]
    fn pass_statement_round_trips() {
        let module = Mod::Module(ModModule {
            span: span(),
            body: vec![Stmt::Pass(StmtPass { span: span(), inline_comment: None })],
        });
        assert_eq!(unparse(&module), "pass");
    }

    #[test]
    fn custom_indent_unit_is_honored() {
        let inner = Stmt::Pass(StmtPass { span: span(), inline_comment: None });
        let module = Mod::Module(ModModule {
            span: span(),
            body: vec![Stmt::If(StmtIf {
                span: span(),
                test: Box::new(name("cond")),
                body: vec![inner],
                orelse: Vec::new(),
                inline_comment: None,
            })],
        });
        let tabbed = unparse_with_options(&module, &UnparseOptions::with_indent("\t"));
        assert_eq!(tabbed, "if cond:\n\tpass");
        let default = unparse(&module);
        assert_eq!(default, "if cond:\n    pass");
    }
}
