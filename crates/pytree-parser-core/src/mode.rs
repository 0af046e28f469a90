/// Controls what shape of module the parser is willing to produce.
///
/// Mirrors the handful of entry points CPython's `compile()` builtin
/// exposes (`exec`, `eval`, `single`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Parse a whole file: the result is a `Module`.
    Module,
    /// Parse a single expression: the result is an `Expression`.
    Expression,
    /// Parse a single interactive statement: the result is an `Interactive`.
    Interactive,
}

impl std::str::FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exec" => Ok(Mode::Module),
            "eval" => Ok(Mode::Expression),
            "single" => Ok(Mode::Interactive),
            _ => Err(ModeParseError(())),
        }
    }
}

#[derive(Debug)]
pub struct ModeParseError(());

impl std::fmt::Display for ModeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, r#"mode must be "exec", "eval", or "single""#)
    }
}

impl std::error::Error for ModeParseError {}
