//! Quote-style and prefix bookkeeping so the unparser can round-trip a
//! string literal's original spelling (`'...'` vs `"..."` vs triple-quoted,
//! and the `f`/`r`/`b`/`u` prefix combination) instead of always emitting a
//! canonical form.

/// The fixed set of string prefixes the lexer recognizes, matching the
/// `{f, r, b, u, fr, rf, br, rb}` table in the language spec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringPrefix {
    /// No prefix at all.
    Regular,
    Raw,
    Bytes,
    RawBytes,
    FString,
    RawFString,
    /// The legacy, now-meaningless `u` prefix.
    Unicode,
}

impl StringPrefix {
    pub const fn as_str(self) -> &'static str {
        match self {
            StringPrefix::Regular => "",
            StringPrefix::Raw => "r",
            StringPrefix::Bytes => "b",
            StringPrefix::RawBytes => "rb",
            StringPrefix::FString => "f",
            StringPrefix::RawFString => "rf",
            StringPrefix::Unicode => "u",
        }
    }

    pub const fn is_raw(self) -> bool {
        matches!(self, StringPrefix::Raw | StringPrefix::RawBytes | StringPrefix::RawFString)
    }

    pub const fn is_bytes(self) -> bool {
        matches!(self, StringPrefix::Bytes | StringPrefix::RawBytes)
    }

    pub const fn is_fstring(self) -> bool {
        matches!(self, StringPrefix::FString | StringPrefix::RawFString)
    }

    /// Parses a lowercased prefix lexeme (the part of a string token before
    /// the opening quote). Case of the source prefix is not preserved.
    pub fn from_lexeme(lower: &str) -> Option<Self> {
        Some(match lower {
            "" => StringPrefix::Regular,
            "r" => StringPrefix::Raw,
            "b" => StringPrefix::Bytes,
            "fr" | "rf" => StringPrefix::RawFString,
            "br" | "rb" => StringPrefix::RawBytes,
            "f" => StringPrefix::FString,
            "u" => StringPrefix::Unicode,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub const fn as_char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }
}

/// The original spelling of a string/bytes/f-string literal token, enough
/// to reproduce it byte-for-byte on unparse: prefix, quote character, and
/// whether it was triple-quoted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StringKind {
    pub prefix: StringPrefix,
    pub quote: QuoteStyle,
    pub triple: bool,
}

impl StringKind {
    pub const fn new(prefix: StringPrefix, quote: QuoteStyle, triple: bool) -> Self {
        Self { prefix, quote, triple }
    }

    pub fn quote_str(self) -> &'static str {
        match (self.quote, self.triple) {
            (QuoteStyle::Single, false) => "'",
            (QuoteStyle::Double, false) => "\"",
            (QuoteStyle::Single, true) => "'''",
            (QuoteStyle::Double, true) => "\"\"\"",
        }
    }
}

impl std::fmt::Display for StringKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix.as_str())
    }
}
