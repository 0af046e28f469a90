//! AST node definitions mirroring CPython's ASDL grammar (`Stmt`, `Expr`,
//! `Pattern`, `TypeParam` and their supporting product types), plus the
//! source-position trait, the unparser, and read-only traversal helpers.

mod builtin;
mod fields;
mod nodes;
mod operators;
mod ranged;
mod string_kind;
mod unparse;
mod visitor;

pub use builtin::{Constant, Identifier};
pub use fields::{fields, FieldValue};
pub use nodes::*;
pub use operators::{BoolOp, CmpOp, ConversionFlag, ExprContext, Operator, UnaryOp};
pub use ranged::Ranged;
pub use string_kind::{QuoteStyle, StringKind, StringPrefix};
pub use unparse::{unparse, unparse_expr, unparse_expr_with_options, unparse_with_options, UnparseOptions};
pub use visitor::{children, docstring, walk, walk_module, AnyNode};
