// Node shapes mirror CPython's `Python.asdl` field-for-field; this file
// plays the role that `ast/src/gen/generic.rs` plays upstream, except it is
// hand-written instead of generated from an ASDL grammar by `build.rs` --
// there is no codegen step here, only the types a codegen step would have
// produced.

use crate::builtin::{Constant, Identifier};
use crate::operators::{BoolOp, CmpOp, ConversionFlag, ExprContext, Operator, UnaryOp};
use crate::string_kind::StringKind;
use pytree_parser_core::SourceSpan;

pub type Suite = Vec<Stmt>;

// These trees are plain owned data with no interior mutability, so they
// cross thread boundaries freely; callers building a parse-in-one-thread,
// consume-in-another pipeline can rely on that without re-checking it here.
static_assertions::assert_impl_all!(Mod: Send, Sync);
static_assertions::assert_impl_all!(Stmt: Send, Sync);
static_assertions::assert_impl_all!(Expr: Send, Sync);
static_assertions::assert_impl_all!(Pattern: Send, Sync);

// ---------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------

/// Only `Module` is ever produced by the parser; the other three variants
/// exist so the unparser can accept trees built by other tools (see the
/// module-variants note in the data model).
#[derive(Clone, Debug, PartialEq)]
pub enum Mod {
    Module(ModModule),
    Interactive(ModInteractive),
    Expression(ModExpression),
    FunctionType(ModFunctionType),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModModule {
    pub span: SourceSpan,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModInteractive {
    pub span: SourceSpan,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModExpression {
    pub span: SourceSpan,
    pub body: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModFunctionType {
    pub span: SourceSpan,
    pub argtypes: Vec<Expr>,
    pub returns: Box<Expr>,
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, is_macro::Is)]
pub enum Stmt {
    FunctionDef(StmtFunctionDef),
    AsyncFunctionDef(StmtAsyncFunctionDef),
    ClassDef(StmtClassDef),
    Return(StmtReturn),
    Delete(StmtDelete),
    Assign(StmtAssign),
    AugAssign(StmtAugAssign),
    AnnAssign(StmtAnnAssign),
    TypeAlias(StmtTypeAlias),
    For(StmtFor),
    AsyncFor(StmtAsyncFor),
    While(StmtWhile),
    If(StmtIf),
    With(StmtWith),
    AsyncWith(StmtAsyncWith),
    Match(StmtMatch),
    Raise(StmtRaise),
    Try(StmtTry),
    TryStar(StmtTryStar),
    Assert(StmtAssert),
    Import(StmtImport),
    ImportFrom(StmtImportFrom),
    Global(StmtGlobal),
    Nonlocal(StmtNonlocal),
    Expr(StmtExpr),
    Pass(StmtPass),
    Break(StmtBreak),
    Continue(StmtContinue),
    Comment(StmtComment),
}

impl Stmt {
    /// A short name for this statement kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::FunctionDef(_) => "function definition",
            Stmt::AsyncFunctionDef(_) => "async function definition",
            Stmt::ClassDef(_) => "class definition",
            Stmt::Return(_) => "return statement",
            Stmt::Delete(_) => "delete statement",
            Stmt::Assign(_) => "assignment",
            Stmt::AugAssign(_) => "augmented assignment",
            Stmt::AnnAssign(_) => "annotated assignment",
            Stmt::TypeAlias(_) => "type alias",
            Stmt::For(_) => "for loop",
            Stmt::AsyncFor(_) => "async for loop",
            Stmt::While(_) => "while loop",
            Stmt::If(_) => "if statement",
            Stmt::With(_) => "with statement",
            Stmt::AsyncWith(_) => "async with statement",
            Stmt::Match(_) => "match statement",
            Stmt::Raise(_) => "raise statement",
            Stmt::Try(_) => "try statement",
            Stmt::TryStar(_) => "try statement",
            Stmt::Assert(_) => "assert statement",
            Stmt::Import(_) => "import statement",
            Stmt::ImportFrom(_) => "import statement",
            Stmt::Global(_) => "global statement",
            Stmt::Nonlocal(_) => "nonlocal statement",
            Stmt::Expr(_) => "expression statement",
            Stmt::Pass(_) => "pass statement",
            Stmt::Break(_) => "break statement",
            Stmt::Continue(_) => "continue statement",
            Stmt::Comment(_) => "comment",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtFunctionDef {
    pub span: SourceSpan,
    pub name: Identifier,
    pub type_params: Vec<TypeParam>,
    pub args: Box<Arguments>,
    pub body: Vec<Stmt>,
    pub decorator_list: Vec<Expr>,
    pub returns: Option<Box<Expr>>,
    pub type_comment: Option<String>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtAsyncFunctionDef {
    pub span: SourceSpan,
    pub name: Identifier,
    pub type_params: Vec<TypeParam>,
    pub args: Box<Arguments>,
    pub body: Vec<Stmt>,
    pub decorator_list: Vec<Expr>,
    pub returns: Option<Box<Expr>>,
    pub type_comment: Option<String>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtClassDef {
    pub span: SourceSpan,
    pub name: Identifier,
    pub type_params: Vec<TypeParam>,
    pub bases: Vec<Expr>,
    pub keywords: Vec<Keyword>,
    pub body: Vec<Stmt>,
    pub decorator_list: Vec<Expr>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtReturn {
    pub span: SourceSpan,
    pub value: Option<Box<Expr>>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtDelete {
    pub span: SourceSpan,
    pub targets: Vec<Expr>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtAssign {
    pub span: SourceSpan,
    pub targets: Vec<Expr>,
    pub value: Box<Expr>,
    pub type_comment: Option<String>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtAugAssign {
    pub span: SourceSpan,
    pub target: Box<Expr>,
    pub op: Operator,
    pub value: Box<Expr>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtAnnAssign {
    pub span: SourceSpan,
    pub target: Box<Expr>,
    pub annotation: Box<Expr>,
    pub value: Option<Box<Expr>>,
    /// True iff `target` is a bare `Name` not itself parenthesized.
    pub simple: bool,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtTypeAlias {
    pub span: SourceSpan,
    /// Always a `Name` in `Store` context.
    pub name: Box<Expr>,
    pub type_params: Vec<TypeParam>,
    pub value: Box<Expr>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtFor {
    pub span: SourceSpan,
    pub target: Box<Expr>,
    pub iter: Box<Expr>,
    pub body: Vec<Stmt>,
    pub orelse: Vec<Stmt>,
    pub type_comment: Option<String>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtAsyncFor {
    pub span: SourceSpan,
    pub target: Box<Expr>,
    pub iter: Box<Expr>,
    pub body: Vec<Stmt>,
    pub orelse: Vec<Stmt>,
    pub type_comment: Option<String>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtWhile {
    pub span: SourceSpan,
    pub test: Box<Expr>,
    pub body: Vec<Stmt>,
    pub orelse: Vec<Stmt>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtIf {
    pub span: SourceSpan,
    pub test: Box<Expr>,
    pub body: Vec<Stmt>,
    pub orelse: Vec<Stmt>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtWith {
    pub span: SourceSpan,
    pub items: Vec<WithItem>,
    pub body: Vec<Stmt>,
    pub type_comment: Option<String>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtAsyncWith {
    pub span: SourceSpan,
    pub items: Vec<WithItem>,
    pub body: Vec<Stmt>,
    pub type_comment: Option<String>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtMatch {
    pub span: SourceSpan,
    pub subject: Box<Expr>,
    pub cases: Vec<MatchCase>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtRaise {
    pub span: SourceSpan,
    pub exc: Option<Box<Expr>>,
    pub cause: Option<Box<Expr>>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtTry {
    pub span: SourceSpan,
    pub body: Vec<Stmt>,
    pub handlers: Vec<ExceptHandler>,
    pub orelse: Vec<Stmt>,
    pub finalbody: Vec<Stmt>,
    pub inline_comment: Option<Comment>,
}

/// A `try`/`except*` block. Structurally identical to `StmtTry`; kept as a
/// distinct variant (rather than a flag on `StmtTry`) because CPython's AST
/// does the same and downstream tools match on it directly.
#[derive(Clone, Debug, PartialEq)]
pub struct StmtTryStar {
    pub span: SourceSpan,
    pub body: Vec<Stmt>,
    pub handlers: Vec<ExceptHandler>,
    pub orelse: Vec<Stmt>,
    pub finalbody: Vec<Stmt>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtAssert {
    pub span: SourceSpan,
    pub test: Box<Expr>,
    pub msg: Option<Box<Expr>>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtImport {
    pub span: SourceSpan,
    pub names: Vec<Alias>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtImportFrom {
    pub span: SourceSpan,
    pub module: Option<Identifier>,
    pub names: Vec<Alias>,
    /// Number of leading dots in `from ...pkg import x` (0 for an absolute import).
    pub level: u32,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtGlobal {
    pub span: SourceSpan,
    pub names: Vec<Identifier>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtNonlocal {
    pub span: SourceSpan,
    pub names: Vec<Identifier>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtExpr {
    pub span: SourceSpan,
    pub value: Box<Expr>,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtPass {
    pub span: SourceSpan,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtBreak {
    pub span: SourceSpan,
    pub inline_comment: Option<Comment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StmtContinue {
    pub span: SourceSpan,
    pub inline_comment: Option<Comment>,
}

/// A standalone comment, promoted to a statement when comment collection is
/// enabled and the comment does not attach to a preceding statement.
#[derive(Clone, Debug, PartialEq)]
pub struct StmtComment {
    pub span: SourceSpan,
    pub comment: Comment,
}

/// The text of a single `#...` comment token.
#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    pub span: SourceSpan,
    pub text: String,
    pub inline: bool,
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, is_macro::Is)]
pub enum Expr {
    BoolOp(ExprBoolOp),
    NamedExpr(ExprNamedExpr),
    BinOp(ExprBinOp),
    UnaryOp(ExprUnaryOp),
    Lambda(ExprLambda),
    IfExp(ExprIfExp),
    Dict(ExprDict),
    Set(ExprSet),
    ListComp(ExprListComp),
    SetComp(ExprSetComp),
    DictComp(ExprDictComp),
    GeneratorExp(ExprGeneratorExp),
    Await(ExprAwait),
    Yield(ExprYield),
    YieldFrom(ExprYieldFrom),
    Compare(ExprCompare),
    Call(ExprCall),
    FormattedValue(ExprFormattedValue),
    JoinedStr(ExprJoinedStr),
    Constant(ExprConstant),
    Attribute(ExprAttribute),
    Subscript(ExprSubscript),
    Starred(ExprStarred),
    Name(ExprName),
    List(ExprList),
    Tuple(ExprTuple),
    Slice(ExprSlice),
}

impl Expr {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::BoolOp(_) | Expr::BinOp(_) | Expr::UnaryOp(_) => "operator",
            Expr::NamedExpr(_) => "named expression",
            Expr::Lambda(_) => "lambda",
            Expr::IfExp(_) => "conditional expression",
            Expr::Dict(_) => "dict display",
            Expr::Set(_) => "set display",
            Expr::ListComp(_) => "list comprehension",
            Expr::SetComp(_) => "set comprehension",
            Expr::DictComp(_) => "dict comprehension",
            Expr::GeneratorExp(_) => "generator expression",
            Expr::Await(_) => "await expression",
            Expr::Yield(_) | Expr::YieldFrom(_) => "yield expression",
            Expr::Compare(_) => "comparison",
            Expr::Call(_) => "function call",
            Expr::FormattedValue(_) | Expr::JoinedStr(_) => "f-string expression",
            Expr::Constant(c) => c.value.kind_name(),
            Expr::Attribute(_) => "attribute",
            Expr::Subscript(_) => "subscript",
            Expr::Starred(_) => "starred",
            Expr::Name(_) => "name",
            Expr::List(_) => "list",
            Expr::Tuple(_) => "tuple",
            Expr::Slice(_) => "slice",
        }
    }

    /// The `ctx` this expression carries, for the node kinds where
    /// `Load`/`Store`/`Del` is meaningful.
    pub fn context(&self) -> Option<ExprContext> {
        match self {
            Expr::Attribute(e) => Some(e.ctx),
            Expr::Subscript(e) => Some(e.ctx),
            Expr::Starred(e) => Some(e.ctx),
            Expr::Name(e) => Some(e.ctx),
            Expr::List(e) => Some(e.ctx),
            Expr::Tuple(e) => Some(e.ctx),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprBoolOp {
    pub span: SourceSpan,
    pub op: BoolOp,
    pub values: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprNamedExpr {
    pub span: SourceSpan,
    pub target: Box<Expr>,
    pub value: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprBinOp {
    pub span: SourceSpan,
    pub left: Box<Expr>,
    pub op: Operator,
    pub right: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprUnaryOp {
    pub span: SourceSpan,
    pub op: UnaryOp,
    pub operand: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprLambda {
    pub span: SourceSpan,
    pub args: Box<Arguments>,
    pub body: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprIfExp {
    pub span: SourceSpan,
    pub test: Box<Expr>,
    pub body: Box<Expr>,
    pub orelse: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprDict {
    pub span: SourceSpan,
    /// `None` at index `i` means `values[i]` is a `**mapping` unpacking.
    pub keys: Vec<Option<Expr>>,
    pub values: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprSet {
    pub span: SourceSpan,
    pub elts: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprListComp {
    pub span: SourceSpan,
    pub elt: Box<Expr>,
    pub generators: Vec<Comprehension>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprSetComp {
    pub span: SourceSpan,
    pub elt: Box<Expr>,
    pub generators: Vec<Comprehension>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprDictComp {
    pub span: SourceSpan,
    pub key: Box<Expr>,
    pub value: Box<Expr>,
    pub generators: Vec<Comprehension>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprGeneratorExp {
    pub span: SourceSpan,
    pub elt: Box<Expr>,
    pub generators: Vec<Comprehension>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprAwait {
    pub span: SourceSpan,
    pub value: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprYield {
    pub span: SourceSpan,
    pub value: Option<Box<Expr>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprYieldFrom {
    pub span: SourceSpan,
    pub value: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprCompare {
    pub span: SourceSpan,
    pub left: Box<Expr>,
    pub ops: Vec<CmpOp>,
    pub comparators: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprCall {
    pub span: SourceSpan,
    pub func: Box<Expr>,
    pub args: Vec<Expr>,
    pub keywords: Vec<Keyword>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprFormattedValue {
    pub span: SourceSpan,
    pub value: Box<Expr>,
    pub conversion: ConversionFlag,
    /// Itself a `JoinedStr` when present.
    pub format_spec: Option<Box<Expr>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprJoinedStr {
    pub span: SourceSpan,
    pub values: Vec<Expr>,
    pub kind: Option<StringKind>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprConstant {
    pub span: SourceSpan,
    pub value: Constant,
    pub kind: Option<StringKind>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprAttribute {
    pub span: SourceSpan,
    pub value: Box<Expr>,
    pub attr: Identifier,
    pub ctx: ExprContext,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprSubscript {
    pub span: SourceSpan,
    pub value: Box<Expr>,
    pub slice: Box<Expr>,
    pub ctx: ExprContext,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprStarred {
    pub span: SourceSpan,
    pub value: Box<Expr>,
    pub ctx: ExprContext,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprName {
    pub span: SourceSpan,
    pub id: Identifier,
    pub ctx: ExprContext,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprList {
    pub span: SourceSpan,
    pub elts: Vec<Expr>,
    pub ctx: ExprContext,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprTuple {
    pub span: SourceSpan,
    pub elts: Vec<Expr>,
    pub ctx: ExprContext,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprSlice {
    pub span: SourceSpan,
    pub lower: Option<Box<Expr>>,
    pub upper: Option<Box<Expr>>,
    pub step: Option<Box<Expr>>,
}

// ---------------------------------------------------------------------
// Pattern matching (`match`/`case`)
// ---------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, is_macro::Is)]
pub enum Pattern {
    MatchValue(PatternMatchValue),
    MatchSingleton(PatternMatchSingleton),
    MatchSequence(PatternMatchSequence),
    MatchMapping(PatternMatchMapping),
    MatchClass(PatternMatchClass),
    MatchStar(PatternMatchStar),
    MatchAs(PatternMatchAs),
    MatchOr(PatternMatchOr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatternMatchValue {
    pub span: SourceSpan,
    pub value: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatternMatchSingleton {
    pub span: SourceSpan,
    pub value: Constant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatternMatchSequence {
    pub span: SourceSpan,
    pub patterns: Vec<Pattern>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatternMatchMapping {
    pub span: SourceSpan,
    pub keys: Vec<Expr>,
    pub patterns: Vec<Pattern>,
    pub rest: Option<Identifier>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatternMatchClass {
    pub span: SourceSpan,
    pub cls: Box<Expr>,
    pub patterns: Vec<Pattern>,
    pub kwd_attrs: Vec<Identifier>,
    pub kwd_patterns: Vec<Pattern>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatternMatchStar {
    pub span: SourceSpan,
    pub name: Option<Identifier>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatternMatchAs {
    pub span: SourceSpan,
    pub pattern: Option<Box<Pattern>>,
    pub name: Option<Identifier>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatternMatchOr {
    pub span: SourceSpan,
    pub patterns: Vec<Pattern>,
}

// ---------------------------------------------------------------------
// Type parameters (PEP 695)
// ---------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, is_macro::Is)]
pub enum TypeParam {
    TypeVar(TypeParamTypeVar),
    ParamSpec(TypeParamParamSpec),
    TypeVarTuple(TypeParamTypeVarTuple),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeParamTypeVar {
    pub span: SourceSpan,
    pub name: Identifier,
    pub bound: Option<Box<Expr>>,
    pub default: Option<Box<Expr>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeParamParamSpec {
    pub span: SourceSpan,
    pub name: Identifier,
    pub default: Option<Box<Expr>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeParamTypeVarTuple {
    pub span: SourceSpan,
    pub name: Identifier,
    pub default: Option<Box<Expr>>,
}

// ---------------------------------------------------------------------
// Helper product types (no variant tag of their own)
// ---------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct Arguments {
    pub span: SourceSpan,
    pub posonlyargs: Vec<Arg>,
    pub args: Vec<Arg>,
    pub vararg: Option<Box<Arg>>,
    pub kwonlyargs: Vec<Arg>,
    /// Same length as `kwonlyargs`; `None` marks a keyword-only parameter
    /// with no default.
    pub kw_defaults: Vec<Option<Expr>>,
    pub kwarg: Option<Box<Arg>>,
    /// Applies to the rightmost `defaults.len()` of `posonlyargs ++ args`.
    pub defaults: Vec<Expr>,
}

impl Arguments {
    pub fn empty(span: SourceSpan) -> Self {
        Self {
            span,
            posonlyargs: Vec::new(),
            args: Vec::new(),
            vararg: None,
            kwonlyargs: Vec::new(),
            kw_defaults: Vec::new(),
            kwarg: None,
            defaults: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Arg {
    pub span: SourceSpan,
    pub arg: Identifier,
    pub annotation: Option<Box<Expr>>,
    pub type_comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Keyword {
    pub span: SourceSpan,
    /// `None` means this is a `**kwargs` splat.
    pub arg: Option<Identifier>,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alias {
    pub span: SourceSpan,
    pub name: Identifier,
    pub asname: Option<Identifier>,
}

/// A single `expr [as target]` clause of a `with` statement. CPython's
/// ASDL gives `withitem` no location fields of its own; callers locate one
/// via `context_expr`.
#[derive(Clone, Debug, PartialEq)]
pub struct WithItem {
    pub context_expr: Expr,
    pub optional_vars: Option<Box<Expr>>,
}

/// One `case pattern [if guard]: body` clause of a `match` statement.
/// Like `withitem`, CPython gives `match_case` no span of its own.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub guard: Option<Box<Expr>>,
    pub body: Vec<Stmt>,
}

/// One `for`/`async for` clause of a comprehension. No span of its own in
/// CPython's ASDL.
#[derive(Clone, Debug, PartialEq)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
    pub is_async: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExceptHandler {
    pub span: SourceSpan,
    /// Maps to CPython's `type` field; renamed because `type` is a Rust keyword.
    pub exc_type: Option<Box<Expr>>,
    pub name: Option<Identifier>,
    pub body: Vec<Stmt>,
}
