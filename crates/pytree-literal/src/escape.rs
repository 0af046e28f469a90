//! `repr()`-style escaping for strings and bytes, matching the quote-style
//! rules CPython's tokenizer/`unparse` module uses: prefer a single quote,
//! fall back to a double quote only when the text contains a `'` but no
//! `"`, and otherwise escape the chosen quote character.

use std::fmt::{self, Write};

fn choose_quote(contains_single: bool, contains_double: bool) -> char {
    if contains_single && !contains_double {
        '"'
    } else {
        '\''
    }
}

pub struct UnicodeEscape<'a> {
    s: &'a str,
}

impl<'a> UnicodeEscape<'a> {
    pub fn new_repr(s: &'a str) -> Self {
        Self { s }
    }

    pub fn str_repr(&self) -> StrReprWriter<'a> {
        StrReprWriter { s: self.s }
    }
}

pub struct StrReprWriter<'a> {
    s: &'a str,
}

impl<'a> StrReprWriter<'a> {
    pub fn write(&self, f: &mut impl Write) -> fmt::Result {
        let quote = choose_quote(self.s.contains('\''), self.s.contains('"'));
        f.write_char(quote)?;
        for c in self.s.chars() {
            write_escaped_char(f, c, quote)?;
        }
        f.write_char(quote)
    }

    pub fn to_string_repr(&self) -> String {
        let mut out = String::with_capacity(self.s.len() + 2);
        // `Write` on `String` never fails.
        self.write(&mut out).unwrap();
        out
    }
}

fn write_escaped_char(f: &mut impl Write, c: char, quote: char) -> fmt::Result {
    match c {
        '\\' => f.write_str("\\\\"),
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        c if c == quote => {
            f.write_char('\\')?;
            f.write_char(c)
        }
        c if (c as u32) < 0x20 || c as u32 == 0x7f => write!(f, "\\x{:02x}", c as u32),
        c => f.write_char(c),
    }
}

/// `repr()` for `bytes` objects: the same escaping rules as strings, but
/// every byte outside the printable ASCII range becomes `\xHH` and the
/// result is prefixed with `b`.
pub struct AsciiEscape<'a> {
    bytes: &'a [u8],
}

impl<'a> AsciiEscape<'a> {
    pub fn new_repr(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn bytes_repr(&self) -> BytesReprWriter<'a> {
        BytesReprWriter { bytes: self.bytes }
    }
}

pub struct BytesReprWriter<'a> {
    bytes: &'a [u8],
}

impl<'a> BytesReprWriter<'a> {
    pub fn write(&self, f: &mut impl Write) -> fmt::Result {
        let contains_single = self.bytes.contains(&b'\'');
        let contains_double = self.bytes.contains(&b'"');
        let quote = choose_quote(contains_single, contains_double);
        f.write_char('b')?;
        f.write_char(quote)?;
        for &b in self.bytes {
            match b {
                b'\\' => f.write_str("\\\\")?,
                b'\n' => f.write_str("\\n")?,
                b'\r' => f.write_str("\\r")?,
                b'\t' => f.write_str("\\t")?,
                b if b as char == quote => {
                    f.write_char('\\')?;
                    f.write_char(quote)?;
                }
                0x20..=0x7e => f.write_char(b as char)?,
                _ => write!(f, "\\x{b:02x}")?,
            }
        }
        f.write_char(quote)
    }

    pub fn to_string(&self) -> Result<String, fmt::Error> {
        let mut out = String::with_capacity(self.bytes.len() + 3);
        self.write(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_single_quote() {
        assert_eq!(UnicodeEscape::new_repr("hi").str_repr().to_string_repr(), "'hi'");
    }

    #[test]
    fn falls_back_to_double_quote() {
        assert_eq!(
            UnicodeEscape::new_repr("it's").str_repr().to_string_repr(),
            "\"it's\""
        );
    }

    #[test]
    fn escapes_both_quotes_with_single() {
        assert_eq!(
            UnicodeEscape::new_repr("a'b\"c").str_repr().to_string_repr(),
            "'a\\'b\"c'"
        );
    }

    #[test]
    fn bytes_repr_escapes_non_printable() {
        let repr = AsciiEscape::new_repr(&[0x00, b'h', b'i']).bytes_repr().to_string().unwrap();
        assert_eq!(repr, "b'\\x00hi'");
    }
}
