//! Every located node type implements `Ranged`, one
//! `impl Ranged for ... { fn range(&self) -> TextRange }` block per struct,
//! except keyed on `SourceSpan` rather than a `TextSize`-based `TextRange`.

use crate::nodes::*;
use pytree_parser_core::SourceSpan;

pub trait Ranged {
    fn span(&self) -> SourceSpan;
}

/// Implements `Ranged` for a list of struct types that each carry a plain
/// `span: SourceSpan` field, avoiding one hand-written impl per node kind.
macro_rules! ranged_span_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Ranged for $ty {
                fn span(&self) -> SourceSpan {
                    self.span
                }
            }
        )*
    };
}

ranged_span_field!(
    ModModule,
    ModInteractive,
    ModExpression,
    ModFunctionType,
    StmtFunctionDef,
    StmtAsyncFunctionDef,
    StmtClassDef,
    StmtReturn,
    StmtDelete,
    StmtAssign,
    StmtAugAssign,
    StmtAnnAssign,
    StmtTypeAlias,
    StmtFor,
    StmtAsyncFor,
    StmtWhile,
    StmtIf,
    StmtWith,
    StmtAsyncWith,
    StmtMatch,
    StmtRaise,
    StmtTry,
    StmtTryStar,
    StmtAssert,
    StmtImport,
    StmtImportFrom,
    StmtGlobal,
    StmtNonlocal,
    StmtExpr,
    StmtPass,
    StmtBreak,
    StmtContinue,
    StmtComment,
    Comment,
    ExprBoolOp,
    ExprNamedExpr,
    ExprBinOp,
    ExprUnaryOp,
    ExprLambda,
    ExprIfExp,
    ExprDict,
    ExprSet,
    ExprListComp,
    ExprSetComp,
    ExprDictComp,
    ExprGeneratorExp,
    ExprAwait,
    ExprYield,
    ExprYieldFrom,
    ExprCompare,
    ExprCall,
    ExprFormattedValue,
    ExprJoinedStr,
    ExprConstant,
    ExprAttribute,
    ExprSubscript,
    ExprStarred,
    ExprName,
    ExprList,
    ExprTuple,
    ExprSlice,
    PatternMatchValue,
    PatternMatchSingleton,
    PatternMatchSequence,
    PatternMatchMapping,
    PatternMatchClass,
    PatternMatchStar,
    PatternMatchAs,
    PatternMatchOr,
    TypeParamTypeVar,
    TypeParamParamSpec,
    TypeParamTypeVarTuple,
    Arguments,
    Arg,
    Keyword,
    Alias,
    ExceptHandler,
);

/// Dispatches to whichever variant is active. `withitem`, `match_case` and
/// `comprehension` have no span of their own in CPython's ASDL and so get
/// no `Ranged` impl; callers locate one via their `context_expr`/`pattern`/
/// `iter` field instead.
macro_rules! ranged_enum_dispatch {
    ($enum_ty:ty { $($variant:ident),* $(,)? }) => {
        impl Ranged for $enum_ty {
            fn span(&self) -> SourceSpan {
                match self {
                    $(<$enum_ty>::$variant(node) => node.span(),)*
                }
            }
        }
    };
}

ranged_enum_dispatch!(Mod { Module, Interactive, Expression, FunctionType });

ranged_enum_dispatch!(Stmt {
    FunctionDef,
    AsyncFunctionDef,
    ClassDef,
    Return,
    Delete,
    Assign,
    AugAssign,
    AnnAssign,
    TypeAlias,
    For,
    AsyncFor,
    While,
    If,
    With,
    AsyncWith,
    Match,
    Raise,
    Try,
    TryStar,
    Assert,
    Import,
    ImportFrom,
    Global,
    Nonlocal,
    Expr,
    Pass,
    Break,
    Continue,
    Comment,
});

ranged_enum_dispatch!(Expr {
    BoolOp,
    NamedExpr,
    BinOp,
    UnaryOp,
    Lambda,
    IfExp,
    Dict,
    Set,
    ListComp,
    SetComp,
    DictComp,
    GeneratorExp,
    Await,
    Yield,
    YieldFrom,
    Compare,
    Call,
    FormattedValue,
    JoinedStr,
    Constant,
    Attribute,
    Subscript,
    Starred,
    Name,
    List,
    Tuple,
    Slice,
});

ranged_enum_dispatch!(Pattern {
    MatchValue,
    MatchSingleton,
    MatchSequence,
    MatchMapping,
    MatchClass,
    MatchStar,
    MatchAs,
    MatchOr,
});

ranged_enum_dispatch!(TypeParam { TypeVar, ParamSpec, TypeVarTuple });

#[cfg(test)]
mod tests {
    use super::*;
    use pytree_parser_core::Location;

    #[test]
    fn enum_dispatch_matches_inner_span() {
        let span = SourceSpan::new(Location::new(1, 0), Location::new(1, 4));
        let stmt = Stmt::Pass(StmtPass { span, inline_comment: None });
        assert_eq!(stmt.span(), span);
    }
}
