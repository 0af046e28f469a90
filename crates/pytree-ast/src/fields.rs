//! `fields(node)`: the named-field view of a single node, one level deep,
//! in declaration order. Where `children` flattens every contained node
//! into one list, `fields` keeps the field names attached -- the shape
//! `ast.iter_fields` exposes in CPython, minus `lineno`/`col_offset`/the
//! kind tag itself.

use crate::builtin::Constant;
use crate::nodes::*;
use crate::operators::{BoolOp, CmpOp, ConversionFlag, ExprContext, Operator, UnaryOp};
use crate::visitor::AnyNode;

/// One field's value. Node-shaped fields carry an [`AnyNode`] (or a list/
/// optional thereof) so a caller can recurse without downcasting; leaf
/// fields carry their scalar directly.
#[derive(Clone, Debug)]
pub enum FieldValue<'a> {
    Node(AnyNode<'a>),
    OptNode(Option<AnyNode<'a>>),
    Nodes(Vec<AnyNode<'a>>),
    /// A node list with null holes, e.g. `Dict.keys` (`None` = `**mapping`)
    /// or `Arguments.kw_defaults` (`None` = no default).
    OptNodes(Vec<Option<AnyNode<'a>>>),
    Identifier(&'a str),
    OptIdentifier(Option<&'a str>),
    Identifiers(Vec<&'a str>),
    Str(&'a str),
    OptStr(Option<&'a str>),
    Constant(&'a Constant),
    Int(i64),
    Bool(bool),
    Operator(Operator),
    UnaryOp(UnaryOp),
    BoolOp(BoolOp),
    CmpOps(&'a [CmpOp]),
    Context(ExprContext),
    Conversion(ConversionFlag),
}

type Field<'a> = (&'static str, FieldValue<'a>);

fn node(n: &Expr) -> FieldValue<'_> {
    FieldValue::Node(AnyNode::Expr(n))
}

fn opt_node(n: &Option<Box<Expr>>) -> FieldValue<'_> {
    FieldValue::OptNode(n.as_deref().map(AnyNode::Expr))
}

fn nodes(xs: &[Expr]) -> FieldValue<'_> {
    FieldValue::Nodes(xs.iter().map(AnyNode::Expr).collect())
}

fn stmts(xs: &[Stmt]) -> FieldValue<'_> {
    FieldValue::Nodes(xs.iter().map(AnyNode::Stmt).collect())
}

fn ident(id: &Identifier) -> FieldValue<'_> {
    FieldValue::Identifier(id.as_str())
}

fn opt_ident(id: &Option<Identifier>) -> FieldValue<'_> {
    FieldValue::OptIdentifier(id.as_ref().map(Identifier::as_str))
}

fn idents(xs: &[Identifier]) -> FieldValue<'_> {
    FieldValue::Identifiers(xs.iter().map(Identifier::as_str).collect())
}

/// The fields of `node`, in declaration order, excluding `span` and the
/// kind tag (both are available separately via [`crate::Ranged::span`] and
/// `kind_name`). Helper product types with no span of their own
/// (`WithItem`, `MatchCase`, `Comprehension`, `Arg`, `Keyword`, `Alias`,
/// `ExceptHandler`) are flattened into their owning statement's fields,
/// the same way `children` flattens them.
pub fn fields<'a>(node: AnyNode<'a>) -> Vec<Field<'a>> {
    match node {
        AnyNode::Stmt(stmt) => stmt_fields(stmt),
        AnyNode::Expr(expr) => expr_fields(expr),
        AnyNode::Pattern(pattern) => pattern_fields(pattern),
    }
}

fn stmt_fields(stmt: &Stmt) -> Vec<Field<'_>> {
    match stmt {
        Stmt::FunctionDef(f) => vec![
            ("name", ident(&f.name)),
            ("args", arguments_field(&f.args)),
            ("body", stmts(&f.body)),
            ("decorator_list", nodes(&f.decorator_list)),
            ("returns", opt_node(&f.returns)),
            ("type_comment", FieldValue::OptStr(f.type_comment.as_deref())),
        ],
        Stmt::AsyncFunctionDef(f) => vec![
            ("name", ident(&f.name)),
            ("args", arguments_field(&f.args)),
            ("body", stmts(&f.body)),
            ("decorator_list", nodes(&f.decorator_list)),
            ("returns", opt_node(&f.returns)),
            ("type_comment", FieldValue::OptStr(f.type_comment.as_deref())),
        ],
        Stmt::ClassDef(c) => vec![
            ("name", ident(&c.name)),
            ("bases", nodes(&c.bases)),
            ("keywords", FieldValue::Nodes(c.keywords.iter().map(|k| AnyNode::Expr(&k.value)).collect())),
            ("body", stmts(&c.body)),
            ("decorator_list", nodes(&c.decorator_list)),
        ],
        Stmt::Return(r) => vec![("value", opt_node(&r.value))],
        Stmt::Delete(d) => vec![("targets", nodes(&d.targets))],
        Stmt::Assign(a) => vec![
            ("targets", nodes(&a.targets)),
            ("value", node(&a.value)),
            ("type_comment", FieldValue::OptStr(a.type_comment.as_deref())),
        ],
        Stmt::AugAssign(a) => {
            vec![("target", node(&a.target)), ("op", FieldValue::Operator(a.op)), ("value", node(&a.value))]
        }
        Stmt::AnnAssign(a) => vec![
            ("target", node(&a.target)),
            ("annotation", node(&a.annotation)),
            ("value", opt_node(&a.value)),
            ("simple", FieldValue::Bool(a.simple)),
        ],
        Stmt::TypeAlias(t) => vec![("name", node(&t.name)), ("value", node(&t.value))],
        Stmt::For(f) => vec![
            ("target", node(&f.target)),
            ("iter", node(&f.iter)),
            ("body", stmts(&f.body)),
            ("orelse", stmts(&f.orelse)),
            ("type_comment", FieldValue::OptStr(f.type_comment.as_deref())),
        ],
        Stmt::AsyncFor(f) => vec![
            ("target", node(&f.target)),
            ("iter", node(&f.iter)),
            ("body", stmts(&f.body)),
            ("orelse", stmts(&f.orelse)),
            ("type_comment", FieldValue::OptStr(f.type_comment.as_deref())),
        ],
        Stmt::While(w) => vec![("test", node(&w.test)), ("body", stmts(&w.body)), ("orelse", stmts(&w.orelse))],
        Stmt::If(i) => vec![("test", node(&i.test)), ("body", stmts(&i.body)), ("orelse", stmts(&i.orelse))],
        Stmt::With(w) => vec![("items", with_items_field(&w.items)), ("body", stmts(&w.body))],
        Stmt::AsyncWith(w) => vec![("items", with_items_field(&w.items)), ("body", stmts(&w.body))],
        Stmt::Match(m) => vec![
            ("subject", node(&m.subject)),
            (
                "cases",
                FieldValue::Nodes(m.cases.iter().map(|c| AnyNode::Pattern(&c.pattern)).collect()),
            ),
        ],
        Stmt::Raise(r) => vec![("exc", opt_node(&r.exc)), ("cause", opt_node(&r.cause))],
        Stmt::Try(t) => vec![
            ("body", stmts(&t.body)),
            ("handlers", except_handlers_field(&t.handlers)),
            ("orelse", stmts(&t.orelse)),
            ("finalbody", stmts(&t.finalbody)),
        ],
        Stmt::TryStar(t) => vec![
            ("body", stmts(&t.body)),
            ("handlers", except_handlers_field(&t.handlers)),
            ("orelse", stmts(&t.orelse)),
            ("finalbody", stmts(&t.finalbody)),
        ],
        Stmt::Assert(a) => vec![("test", node(&a.test)), ("msg", opt_node(&a.msg))],
        Stmt::Import(i) => vec![("names", aliases_field(&i.names))],
        Stmt::ImportFrom(i) => vec![
            ("module", opt_ident(&i.module)),
            ("names", aliases_field(&i.names)),
            ("level", FieldValue::Int(i.level as i64)),
        ],
        Stmt::Global(g) => vec![("names", idents(&g.names))],
        Stmt::Nonlocal(n) => vec![("names", idents(&n.names))],
        Stmt::Expr(x) => vec![("value", node(&x.value))],
        Stmt::Pass(_) | Stmt::Break(_) | Stmt::Continue(_) => Vec::new(),
        Stmt::Comment(c) => vec![("text", FieldValue::Str(c.comment.text.as_str()))],
    }
}

/// `Arguments` has no `kind` of its own and isn't part of `AnyNode`, so its
/// fields are exposed as a single nested list rather than flattened --
/// callers that want individual `Arg`s walk this the same way they'd walk
/// any other `Nodes` field, via each `Arg`'s `annotation`.
fn arguments_field(args: &Arguments) -> FieldValue<'_> {
    let mut out = Vec::new();
    for arg in args.posonlyargs.iter().chain(&args.args).chain(&args.kwonlyargs) {
        out.push(arg.annotation.as_deref().map(AnyNode::Expr));
    }
    if let Some(vararg) = &args.vararg {
        out.push(vararg.annotation.as_deref().map(AnyNode::Expr));
    }
    if let Some(kwarg) = &args.kwarg {
        out.push(kwarg.annotation.as_deref().map(AnyNode::Expr));
    }
    out.extend(args.defaults.iter().map(|e| Some(AnyNode::Expr(e))));
    out.extend(args.kw_defaults.iter().map(|e| e.as_ref().map(AnyNode::Expr)));
    FieldValue::OptNodes(out)
}

fn with_items_field(items: &[WithItem]) -> FieldValue<'_> {
    let mut out = Vec::with_capacity(items.len() * 2);
    for item in items {
        out.push(AnyNode::Expr(&item.context_expr));
        if let Some(v) = &item.optional_vars {
            out.push(AnyNode::Expr(v));
        }
    }
    FieldValue::Nodes(out)
}

fn except_handlers_field(handlers: &[ExceptHandler]) -> FieldValue<'_> {
    let mut out = Vec::new();
    for h in handlers {
        if let Some(ty) = &h.exc_type {
            out.push(AnyNode::Expr(ty));
        }
        out.extend(h.body.iter().map(AnyNode::Stmt));
    }
    FieldValue::Nodes(out)
}

fn aliases_field(aliases: &[Alias]) -> FieldValue<'_> {
    FieldValue::Identifiers(aliases.iter().map(|a| a.name.as_str()).collect())
}

fn expr_fields(expr: &Expr) -> Vec<Field<'_>> {
    match expr {
        Expr::BoolOp(x) => vec![("op", FieldValue::BoolOp(x.op)), ("values", nodes(&x.values))],
        Expr::NamedExpr(x) => vec![("target", node(&x.target)), ("value", node(&x.value))],
        Expr::BinOp(x) => vec![
            ("left", node(&x.left)),
            ("op", FieldValue::Operator(x.op)),
            ("right", node(&x.right)),
        ],
        Expr::UnaryOp(x) => vec![("op", FieldValue::UnaryOp(x.op)), ("operand", node(&x.operand))],
        Expr::Lambda(x) => vec![("args", arguments_field(&x.args)), ("body", node(&x.body))],
        Expr::IfExp(x) => vec![("test", node(&x.test)), ("body", node(&x.body)), ("orelse", node(&x.orelse))],
        Expr::Dict(x) => vec![
            (
                "keys",
                FieldValue::OptNodes(x.keys.iter().map(|k| k.as_ref().map(AnyNode::Expr)).collect()),
            ),
            ("values", nodes(&x.values)),
        ],
        Expr::Set(x) => vec![("elts", nodes(&x.elts))],
        Expr::ListComp(x) => vec![("elt", node(&x.elt)), ("generators", comprehensions_field(&x.generators))],
        Expr::SetComp(x) => vec![("elt", node(&x.elt)), ("generators", comprehensions_field(&x.generators))],
        Expr::DictComp(x) => vec![
            ("key", node(&x.key)),
            ("value", node(&x.value)),
            ("generators", comprehensions_field(&x.generators)),
        ],
        Expr::GeneratorExp(x) => {
            vec![("elt", node(&x.elt)), ("generators", comprehensions_field(&x.generators))]
        }
        Expr::Await(x) => vec![("value", node(&x.value))],
        Expr::Yield(x) => vec![("value", opt_node(&x.value))],
        Expr::YieldFrom(x) => vec![("value", node(&x.value))],
        Expr::Compare(x) => vec![
            ("left", node(&x.left)),
            ("ops", FieldValue::CmpOps(&x.ops)),
            ("comparators", nodes(&x.comparators)),
        ],
        Expr::Call(x) => vec![
            ("func", node(&x.func)),
            ("args", nodes(&x.args)),
            (
                "keywords",
                FieldValue::Nodes(x.keywords.iter().map(|k| AnyNode::Expr(&k.value)).collect()),
            ),
        ],
        Expr::FormattedValue(x) => vec![
            ("value", node(&x.value)),
            ("conversion", FieldValue::Conversion(x.conversion)),
            ("format_spec", opt_node(&x.format_spec)),
        ],
        Expr::JoinedStr(x) => vec![("values", nodes(&x.values))],
        Expr::Constant(x) => vec![("value", FieldValue::Constant(&x.value))],
        Expr::Attribute(x) => {
            vec![("value", node(&x.value)), ("attr", ident(&x.attr)), ("ctx", FieldValue::Context(x.ctx))]
        }
        Expr::Subscript(x) => {
            vec![("value", node(&x.value)), ("slice", node(&x.slice)), ("ctx", FieldValue::Context(x.ctx))]
        }
        Expr::Starred(x) => vec![("value", node(&x.value)), ("ctx", FieldValue::Context(x.ctx))],
        Expr::Name(x) => vec![("id", ident(&x.id)), ("ctx", FieldValue::Context(x.ctx))],
        Expr::List(x) => vec![("elts", nodes(&x.elts)), ("ctx", FieldValue::Context(x.ctx))],
        Expr::Tuple(x) => vec![("elts", nodes(&x.elts)), ("ctx", FieldValue::Context(x.ctx))],
        Expr::Slice(x) => vec![
            ("lower", opt_node(&x.lower)),
            ("upper", opt_node(&x.upper)),
            ("step", opt_node(&x.step)),
        ],
    }
}

fn comprehensions_field(gens: &[Comprehension]) -> FieldValue<'_> {
    let mut out = Vec::with_capacity(gens.len() * 2);
    for comp in gens {
        out.push(AnyNode::Expr(&comp.target));
        out.push(AnyNode::Expr(&comp.iter));
        out.extend(comp.ifs.iter().map(AnyNode::Expr));
    }
    FieldValue::Nodes(out)
}

fn pattern_fields(pattern: &Pattern) -> Vec<Field<'_>> {
    match pattern {
        Pattern::MatchValue(p) => vec![("value", node(&p.value))],
        Pattern::MatchSingleton(p) => vec![("value", FieldValue::Constant(&p.value))],
        Pattern::MatchSequence(p) => {
            vec![("patterns", FieldValue::Nodes(p.patterns.iter().map(AnyNode::Pattern).collect()))]
        }
        Pattern::MatchMapping(p) => vec![
            ("keys", nodes(&p.keys)),
            ("patterns", FieldValue::Nodes(p.patterns.iter().map(AnyNode::Pattern).collect())),
            ("rest", FieldValue::OptIdentifier(p.rest.as_ref().map(Identifier::as_str))),
        ],
        Pattern::MatchClass(p) => vec![
            ("cls", node(&p.cls)),
            ("patterns", FieldValue::Nodes(p.patterns.iter().map(AnyNode::Pattern).collect())),
            ("kwd_attrs", idents(&p.kwd_attrs)),
            (
                "kwd_patterns",
                FieldValue::Nodes(p.kwd_patterns.iter().map(AnyNode::Pattern).collect()),
            ),
        ],
        Pattern::MatchStar(p) => vec![("name", FieldValue::OptIdentifier(p.name.as_ref().map(Identifier::as_str)))],
        Pattern::MatchAs(p) => vec![
            (
                "pattern",
                FieldValue::OptNode(p.pattern.as_deref().map(AnyNode::Pattern)),
            ),
            ("name", FieldValue::OptIdentifier(p.name.as_ref().map(Identifier::as_str))),
        ],
        Pattern::MatchOr(p) => {
            vec![("patterns", FieldValue::Nodes(p.patterns.iter().map(AnyNode::Pattern).collect()))]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pytree_parser_core::{Location, SourceSpan};

    fn span() -> SourceSpan {
        SourceSpan::new(Location::new(1, 0), Location::new(1, 1))
    }

    #[test]
    fn name_exposes_id_and_ctx_in_declaration_order() {
        let name = Expr::Name(ExprName {
            span: span(),
            id: crate::builtin::Identifier::new("x", span()),
            ctx: ExprContext::Load,
        });
        let fs = fields(AnyNode::Expr(&name));
        assert_eq!(fs.len(), 2);
        assert_eq!(fs[0].0, "id");
        assert!(matches!(fs[0].1, FieldValue::Identifier("x")));
        assert_eq!(fs[1].0, "ctx");
        assert!(matches!(fs[1].1, FieldValue::Context(ExprContext::Load)));
    }

    #[test]
    fn pass_statement_has_no_fields() {
        let stmt = Stmt::Pass(StmtPass { span: span(), inline_comment: None });
        assert!(fields(AnyNode::Stmt(&stmt)).is_empty());
    }

    #[test]
    fn binop_exposes_left_op_right() {
        let one = Expr::Constant(ExprConstant { span: span(), value: Constant::Int(1), kind: None });
        let two = Expr::Constant(ExprConstant { span: span(), value: Constant::Int(2), kind: None });
        let binop = Expr::BinOp(ExprBinOp {
            span: span(),
            left: Box::new(one),
            op: Operator::Add,
            right: Box::new(two),
        });
        let fs = fields(AnyNode::Expr(&binop));
        let names: Vec<_> = fs.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["left", "op", "right"]);
    }

    #[test]
    fn dict_keys_preserve_null_holes_for_splat() {
        let value = Expr::Constant(ExprConstant { span: span(), value: Constant::Int(1), kind: None });
        let dict = Expr::Dict(ExprDict { span: span(), keys: vec![None], values: vec![value] });
        let fs = fields(AnyNode::Expr(&dict));
        match &fs[0].1 {
            FieldValue::OptNodes(keys) => assert_eq!(keys.len(), 1, "null key preserved as a hole"),
            other => panic!("expected OptNodes, got {other:?}"),
        }
    }
}
