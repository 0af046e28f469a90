//! The handful of leaf value types every AST node is built from:
//! identifiers and constant literals.

use pytree_parser_core::SourceSpan;

/// An interned-looking but plain-`String`-backed identifier, carrying the
/// span of the name token it came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    id: String,
    span: SourceSpan,
}

impl Identifier {
    #[inline]
    pub fn new(id: impl Into<String>, span: SourceSpan) -> Self {
        Self { id: id.into(), span }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.id.as_str()
    }

    #[inline]
    pub fn span(&self) -> SourceSpan {
        self.span
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.id == other
    }
}

impl std::ops::Deref for Identifier {
    type Target = str;
    fn deref(&self) -> &str {
        self.id.as_str()
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.id.as_str()
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.id.fmt(f)
    }
}

impl From<Identifier> for String {
    fn from(identifier: Identifier) -> String {
        identifier.id
    }
}

/// The value of a `Constant` expression.
///
/// Numeric literals are stored as platform `i64`/`f64` values rather than
/// arbitrary-precision integers: a source integer literal too large for
/// `i64` saturates rather than losing its sign (see `DESIGN.md`).
#[derive(Clone, Debug, PartialEq, is_macro::Is)]
pub enum Constant {
    None,
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
    Complex { real: f64, imag: f64 },
    Ellipsis,
}

impl Constant {
    pub fn is_truthy(&self) -> bool {
        match self {
            Constant::None => false,
            Constant::Bool(b) => *b,
            Constant::Str(s) => !s.is_empty(),
            Constant::Bytes(b) => !b.is_empty(),
            Constant::Int(i) => *i != 0,
            Constant::Float(f) => *f != 0.0,
            Constant::Complex { real, imag } => *real != 0.0 || *imag != 0.0,
            Constant::Ellipsis => true,
        }
    }

    /// A short, human name for use in error messages (e.g. "cannot assign to literal").
    pub fn kind_name(&self) -> &'static str {
        match self {
            Constant::None => "None",
            Constant::Bool(true) => "True",
            Constant::Bool(false) => "False",
            Constant::Str(_) | Constant::Bytes(_) | Constant::Int(_) | Constant::Float(_)
            | Constant::Complex { .. } => "literal",
            Constant::Ellipsis => "ellipsis",
        }
    }
}

impl From<String> for Constant {
    fn from(s: String) -> Constant {
        Constant::Str(s)
    }
}

impl From<Vec<u8>> for Constant {
    fn from(b: Vec<u8>) -> Constant {
        Constant::Bytes(b)
    }
}

impl From<bool> for Constant {
    fn from(b: bool) -> Constant {
        Constant::Bool(b)
    }
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::None => f.write_str("None"),
            Constant::Bool(b) => f.write_str(if *b { "True" } else { "False" }),
            Constant::Str(s) => pytree_literal::escape::UnicodeEscape::new_repr(s)
                .str_repr()
                .write(f),
            Constant::Bytes(b) => {
                let repr = pytree_literal::escape::AsciiEscape::new_repr(b)
                    .bytes_repr()
                    .to_string()
                    .unwrap();
                f.write_str(&repr)
            }
            Constant::Int(i) => write!(f, "{i}"),
            Constant::Float(v) => f.write_str(&pytree_literal::float::to_string(*v)),
            Constant::Complex { real, imag } => {
                if *real == 0.0 {
                    write!(f, "{imag}j")
                } else {
                    write!(f, "({real}{imag:+}j)")
                }
            }
            Constant::Ellipsis => f.write_str("..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_macro_generates_predicates() {
        let none = Constant::None;
        assert!(none.is_none());
        assert!(!none.is_bool());
    }

    #[test]
    fn truthiness_matches_python() {
        assert!(!Constant::Int(0).is_truthy());
        assert!(Constant::Int(1).is_truthy());
        assert!(!Constant::Str(String::new()).is_truthy());
    }
}
