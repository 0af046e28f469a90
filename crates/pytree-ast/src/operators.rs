//! The small closed enumerations CPython's ASDL calls `operator`, `unaryop`,
//! `cmpop` and `boolop`, plus `expr_context` and the f-string conversion
//! flag. Parser and unparser both consult these tables (see `unparse.rs`),
//! so the two directions can never drift out of sync.

/// Binary operators, as used by `BinOp` and `AugAssign`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

impl Operator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mult => "*",
            Operator::MatMult => "@",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "**",
            Operator::LShift => "<<",
            Operator::RShift => ">>",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::BitAnd => "&",
            Operator::FloorDiv => "//",
        }
    }
}

/// Unary prefix operators, as used by `UnaryOp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Invert,
    Not,
    UAdd,
    USub,
}

impl UnaryOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Invert => "~",
            UnaryOp::Not => "not ",
            UnaryOp::UAdd => "+",
            UnaryOp::USub => "-",
        }
    }
}

/// Comparison operators, as used inside a single chained `Compare` node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}

/// `and`/`or`, as used by `BoolOp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

/// Whether a name-like expression occurrence is being read, written, or
/// deleted. Attached to every `Name`, `Attribute`, `Subscript`, `Starred`,
/// `List` and `Tuple` node; see the context-correctness invariant in the
/// data model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExprContext {
    Load,
    Store,
    Del,
}

/// The `!s`/`!r`/`!a` conversion marker on an f-string interpolation.
/// The numeric values match the ASCII byte codes CPython's AST stores
/// (`-1` for "no conversion").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionFlag {
    None,
    Str,
    Repr,
    Ascii,
}

impl ConversionFlag {
    pub const fn to_i8(self) -> i8 {
        match self {
            ConversionFlag::None => -1,
            ConversionFlag::Str => b's' as i8,
            ConversionFlag::Repr => b'r' as i8,
            ConversionFlag::Ascii => b'a' as i8,
        }
    }

    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            's' => Some(ConversionFlag::Str),
            'r' => Some(ConversionFlag::Repr),
            'a' => Some(ConversionFlag::Ascii),
            _ => None,
        }
    }

    pub const fn as_char(self) -> Option<char> {
        match self {
            ConversionFlag::None => None,
            ConversionFlag::Str => Some('s'),
            ConversionFlag::Repr => Some('r'),
            ConversionFlag::Ascii => Some('a'),
        }
    }
}
