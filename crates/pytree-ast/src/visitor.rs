//! Read-only traversal helpers: `children`, `walk`, and docstring lookup.
//!
//! This is deliberately a thin, direct-dispatch layer rather than generic
//! `Fold`/`Visitor` trait machinery generated from an ASDL grammar:
//! mutating/transforming traversal is out of scope, so one exhaustive
//! `match` per node kind is simpler than a trait hierarchy nothing else
//! here would use.

use crate::nodes::*;

/// A borrowed reference to any AST node, for use as the yield type of
/// `children`/`walk`.
#[derive(Clone, Copy, Debug)]
pub enum AnyNode<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Pattern(&'a Pattern),
}

/// The immediate child statements/expressions/patterns of a single node,
/// in source order. Does not recurse.
pub fn children(node: AnyNode<'_>) -> Vec<AnyNode<'_>> {
    match node {
        AnyNode::Stmt(stmt) => stmt_children(stmt),
        AnyNode::Expr(expr) => expr_children(expr),
        AnyNode::Pattern(pattern) => pattern_children(pattern),
    }
}

fn stmt_children(stmt: &Stmt) -> Vec<AnyNode<'_>> {
    let mut out = Vec::new();
    let e = |v: &mut Vec<AnyNode<'_>>, x: &'_ Expr| v.push(AnyNode::Expr(x));
    let s = |v: &mut Vec<AnyNode<'_>>, body: &'_ [Stmt]| v.extend(body.iter().map(AnyNode::Stmt));
    match stmt {
        Stmt::FunctionDef(f) => {
            f.decorator_list.iter().for_each(|x| e(&mut out, x));
            arguments_children(&f.args).into_iter().for_each(|x| out.push(x));
            if let Some(r) = &f.returns {
                e(&mut out, r);
            }
            s(&mut out, &f.body);
        }
        Stmt::AsyncFunctionDef(f) => {
            f.decorator_list.iter().for_each(|x| e(&mut out, x));
            arguments_children(&f.args).into_iter().for_each(|x| out.push(x));
            if let Some(r) = &f.returns {
                e(&mut out, r);
            }
            s(&mut out, &f.body);
        }
        Stmt::ClassDef(c) => {
            c.decorator_list.iter().for_each(|x| e(&mut out, x));
            c.bases.iter().for_each(|x| e(&mut out, x));
            c.keywords.iter().for_each(|k| e(&mut out, &k.value));
            s(&mut out, &c.body);
        }
        Stmt::Return(r) => {
            if let Some(v) = &r.value {
                e(&mut out, v);
            }
        }
        Stmt::Delete(d) => d.targets.iter().for_each(|x| e(&mut out, x)),
        Stmt::Assign(a) => {
            a.targets.iter().for_each(|x| e(&mut out, x));
            e(&mut out, &a.value);
        }
        Stmt::AugAssign(a) => {
            e(&mut out, &a.target);
            e(&mut out, &a.value);
        }
        Stmt::AnnAssign(a) => {
            e(&mut out, &a.target);
            e(&mut out, &a.annotation);
            if let Some(v) = &a.value {
                e(&mut out, v);
            }
        }
        Stmt::TypeAlias(t) => {
            e(&mut out, &t.name);
            e(&mut out, &t.value);
        }
        Stmt::For(f) => {
            e(&mut out, &f.target);
            e(&mut out, &f.iter);
            s(&mut out, &f.body);
            s(&mut out, &f.orelse);
        }
        Stmt::AsyncFor(f) => {
            e(&mut out, &f.target);
            e(&mut out, &f.iter);
            s(&mut out, &f.body);
            s(&mut out, &f.orelse);
        }
        Stmt::While(w) => {
            e(&mut out, &w.test);
            s(&mut out, &w.body);
            s(&mut out, &w.orelse);
        }
        Stmt::If(i) => {
            e(&mut out, &i.test);
            s(&mut out, &i.body);
            s(&mut out, &i.orelse);
        }
        Stmt::With(w) => {
            for item in &w.items {
                e(&mut out, &item.context_expr);
                if let Some(v) = &item.optional_vars {
                    e(&mut out, v);
                }
            }
            s(&mut out, &w.body);
        }
        Stmt::AsyncWith(w) => {
            for item in &w.items {
                e(&mut out, &item.context_expr);
                if let Some(v) = &item.optional_vars {
                    e(&mut out, v);
                }
            }
            s(&mut out, &w.body);
        }
        Stmt::Match(m) => {
            e(&mut out, &m.subject);
            for case in &m.cases {
                out.push(AnyNode::Pattern(&case.pattern));
                if let Some(g) = &case.guard {
                    e(&mut out, g);
                }
                s(&mut out, &case.body);
            }
        }
        Stmt::Raise(r) => {
            if let Some(exc) = &r.exc {
                e(&mut out, exc);
            }
            if let Some(cause) = &r.cause {
                e(&mut out, cause);
            }
        }
        Stmt::Try(t) => {
            s(&mut out, &t.body);
            for h in &t.handlers {
                if let Some(ty) = &h.exc_type {
                    e(&mut out, ty);
                }
                s(&mut out, &h.body);
            }
            s(&mut out, &t.orelse);
            s(&mut out, &t.finalbody);
        }
        Stmt::TryStar(t) => {
            s(&mut out, &t.body);
            for h in &t.handlers {
                if let Some(ty) = &h.exc_type {
                    e(&mut out, ty);
                }
                s(&mut out, &h.body);
            }
            s(&mut out, &t.orelse);
            s(&mut out, &t.finalbody);
        }
        Stmt::Assert(a) => {
            e(&mut out, &a.test);
            if let Some(msg) = &a.msg {
                e(&mut out, msg);
            }
        }
        Stmt::Expr(x) => e(&mut out, &x.value),
        Stmt::Import(_)
        | Stmt::ImportFrom(_)
        | Stmt::Global(_)
        | Stmt::Nonlocal(_)
        | Stmt::Pass(_)
        | Stmt::Break(_)
        | Stmt::Continue(_)
        | Stmt::Comment(_) => {}
    }
    out
}

fn arguments_children(args: &Arguments) -> Vec<AnyNode<'_>> {
    let mut out = Vec::new();
    for arg in args.posonlyargs.iter().chain(&args.args).chain(&args.kwonlyargs) {
        if let Some(ann) = &arg.annotation {
            out.push(AnyNode::Expr(ann));
        }
    }
    if let Some(vararg) = &args.vararg {
        if let Some(ann) = &vararg.annotation {
            out.push(AnyNode::Expr(ann));
        }
    }
    if let Some(kwarg) = &args.kwarg {
        if let Some(ann) = &kwarg.annotation {
            out.push(AnyNode::Expr(ann));
        }
    }
    out.extend(args.defaults.iter().map(AnyNode::Expr));
    out.extend(args.kw_defaults.iter().flatten().map(AnyNode::Expr));
    out
}

fn expr_children(expr: &Expr) -> Vec<AnyNode<'_>> {
    let mut out = Vec::new();
    let e = |v: &mut Vec<AnyNode<'_>>, x: &'_ Expr| v.push(AnyNode::Expr(x));
    match expr {
        Expr::BoolOp(x) => x.values.iter().for_each(|v| e(&mut out, v)),
        Expr::NamedExpr(x) => {
            e(&mut out, &x.target);
            e(&mut out, &x.value);
        }
        Expr::BinOp(x) => {
            e(&mut out, &x.left);
            e(&mut out, &x.right);
        }
        Expr::UnaryOp(x) => e(&mut out, &x.operand),
        Expr::Lambda(x) => {
            out.extend(arguments_children(&x.args));
            e(&mut out, &x.body);
        }
        Expr::IfExp(x) => {
            e(&mut out, &x.test);
            e(&mut out, &x.body);
            e(&mut out, &x.orelse);
        }
        Expr::Dict(x) => {
            x.keys.iter().flatten().for_each(|k| e(&mut out, k));
            x.values.iter().for_each(|v| e(&mut out, v));
        }
        Expr::Set(x) => x.elts.iter().for_each(|v| e(&mut out, v)),
        Expr::ListComp(x) => {
            e(&mut out, &x.elt);
            comprehension_children(&x.generators, &mut out);
        }
        Expr::SetComp(x) => {
            e(&mut out, &x.elt);
            comprehension_children(&x.generators, &mut out);
        }
        Expr::DictComp(x) => {
            e(&mut out, &x.key);
            e(&mut out, &x.value);
            comprehension_children(&x.generators, &mut out);
        }
        Expr::GeneratorExp(x) => {
            e(&mut out, &x.elt);
            comprehension_children(&x.generators, &mut out);
        }
        Expr::Await(x) => e(&mut out, &x.value),
        Expr::Yield(x) => {
            if let Some(v) = &x.value {
                e(&mut out, v);
            }
        }
        Expr::YieldFrom(x) => e(&mut out, &x.value),
        Expr::Compare(x) => {
            e(&mut out, &x.left);
            x.comparators.iter().for_each(|v| e(&mut out, v));
        }
        Expr::Call(x) => {
            e(&mut out, &x.func);
            x.args.iter().for_each(|v| e(&mut out, v));
            x.keywords.iter().for_each(|k| e(&mut out, &k.value));
        }
        Expr::FormattedValue(x) => {
            e(&mut out, &x.value);
            if let Some(spec) = &x.format_spec {
                e(&mut out, spec);
            }
        }
        Expr::JoinedStr(x) => x.values.iter().for_each(|v| e(&mut out, v)),
        Expr::Constant(_) => {}
        Expr::Attribute(x) => e(&mut out, &x.value),
        Expr::Subscript(x) => {
            e(&mut out, &x.value);
            e(&mut out, &x.slice);
        }
        Expr::Starred(x) => e(&mut out, &x.value),
        Expr::Name(_) => {}
        Expr::List(x) => x.elts.iter().for_each(|v| e(&mut out, v)),
        Expr::Tuple(x) => x.elts.iter().for_each(|v| e(&mut out, v)),
        Expr::Slice(x) => {
            [&x.lower, &x.upper, &x.step].into_iter().flatten().for_each(|v| e(&mut out, v));
        }
    }
    out
}

fn comprehension_children<'a>(gens: &'a [Comprehension], out: &mut Vec<AnyNode<'a>>) {
    for comp in gens {
        out.push(AnyNode::Expr(&comp.target));
        out.push(AnyNode::Expr(&comp.iter));
        out.extend(comp.ifs.iter().map(AnyNode::Expr));
    }
}

fn pattern_children(pattern: &Pattern) -> Vec<AnyNode<'_>> {
    match pattern {
        Pattern::MatchValue(p) => vec![AnyNode::Expr(&p.value)],
        Pattern::MatchSingleton(_) => Vec::new(),
        Pattern::MatchSequence(p) => p.patterns.iter().map(AnyNode::Pattern).collect(),
        Pattern::MatchMapping(p) => {
            let mut out: Vec<AnyNode<'_>> = p.keys.iter().map(AnyNode::Expr).collect();
            out.extend(p.patterns.iter().map(AnyNode::Pattern));
            out
        }
        Pattern::MatchClass(p) => {
            let mut out = vec![AnyNode::Expr(&p.cls)];
            out.extend(p.patterns.iter().map(AnyNode::Pattern));
            out.extend(p.kwd_patterns.iter().map(AnyNode::Pattern));
            out
        }
        Pattern::MatchStar(_) => Vec::new(),
        Pattern::MatchAs(p) => p.pattern.as_deref().map(AnyNode::Pattern).into_iter().collect(),
        Pattern::MatchOr(p) => p.patterns.iter().map(AnyNode::Pattern).collect(),
    }
}

/// Depth-first, pre-order walk over every statement, expression, and
/// pattern reachable from `root`, including `root` itself.
pub fn walk<'a>(root: AnyNode<'a>) -> Vec<AnyNode<'a>> {
    let mut out = vec![root];
    let mut stack = children(root);
    while let Some(node) = stack.pop() {
        out.push(node);
        let mut kids = children(node);
        kids.reverse();
        stack.extend(kids);
    }
    out
}

/// Walks every statement in a module body, in source order.
pub fn walk_module(body: &[Stmt]) -> Vec<AnyNode<'_>> {
    let mut out = Vec::new();
    for stmt in body {
        out.extend(walk(AnyNode::Stmt(stmt)));
    }
    out
}

/// The docstring of a module/function/class body: the string literal
/// value of a leading bare `Expr` statement, if present.
pub fn docstring(body: &[Stmt]) -> Option<&str> {
    match body.first() {
        Some(Stmt::Expr(StmtExpr {
            value,
            ..
        })) => match value.as_ref() {
            Expr::Constant(ExprConstant { value: crate::builtin::Constant::Str(s), .. }) => Some(s.as_str()),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::ExprContext;
    use pytree_parser_core::{Location, SourceSpan};

    fn span() -> SourceSpan {
        SourceSpan::new(Location::new(1, 0), Location::new(1, 1))
    }

    #[test]
    fn docstring_recognizes_leading_string_literal() {
        let body = vec![Stmt::Expr(StmtExpr {
            span: span(),
            value: Box::new(Expr::Constant(ExprConstant {
                span: span(),
                value: crate::builtin::Constant::Str("hello".into()),
                kind: None,
            })),
            inline_comment: None,
        })];
        assert_eq!(docstring(&body), Some("hello"));
    }

    #[test]
    fn docstring_absent_when_body_empty() {
        assert_eq!(docstring(&[]), None);
    }

    #[test]
    fn walk_visits_nested_expr() {
        let name = Expr::Name(ExprName {
            span: span(),
            id: crate::builtin::Identifier::new("x", span()),
            ctx: ExprContext::Load,
        });
        let stmt = Stmt::Expr(StmtExpr { span: span(), value: Box::new(name), inline_comment: None });
        let visited = walk(AnyNode::Stmt(&stmt));
        assert_eq!(visited.len(), 2);
    }
}
