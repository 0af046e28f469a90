//! Decodes the body of a non-f string or bytes literal: backslash escapes,
//! `\xHH`/`\uXXXX`/`\UXXXXXXXX` code points, octal escapes, and the `\N{...}`
//! named-character form. Raw strings (`r"..."`) skip all of this and are
//! passed through verbatim, matching CPython's own `r`-prefix semantics.
//!
//! The lexer already validated bracket/quote structure; this module only
//! ever sees the text strictly between the opening and closing quotes.

use crate::error::LexErrorKind;
use pytree_ast::StringPrefix;

pub fn decode_str_body(body: &str, prefix: StringPrefix) -> Result<String, LexErrorKind> {
    if prefix.is_raw() {
        return Ok(body.to_string());
    }
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => return Err(LexErrorKind::UnterminatedString),
            Some('\n') => {} // line continuation inside the literal
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('v') => out.push('\u{b}'),
            Some(first @ '0'..='7') => {
                let mut digits = String::new();
                digits.push(first);
                for _ in 0..2 {
                    match chars.peek() {
                        Some(d) if ('0'..='7').contains(d) => digits.push(chars.next().unwrap()),
                        _ => break,
                    }
                }
                let value = u32::from_str_radix(&digits, 8).unwrap_or(0) & 0xff;
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            Some('x') => {
                let hex = take_hex_digits(&mut chars, 2)?;
                let value = u32::from_str_radix(&hex, 16).map_err(|_| LexErrorKind::InvalidNumericLiteral)?;
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            Some('u') => {
                let hex = take_hex_digits(&mut chars, 4)?;
                let value = u32::from_str_radix(&hex, 16).map_err(|_| LexErrorKind::InvalidNumericLiteral)?;
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            Some('U') => {
                let hex = take_hex_digits(&mut chars, 8)?;
                let value = u32::from_str_radix(&hex, 16).map_err(|_| LexErrorKind::InvalidNumericLiteral)?;
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            Some('N') => {
                // `\N{LATIN SMALL LETTER A}` etc. Named Unicode lookup is out
                // of scope; preserve the escape verbatim so round-tripping
                // at least doesn't silently corrupt the literal.
                out.push_str("\\N");
                if chars.peek() == Some(&'{') {
                    out.push(chars.next().unwrap());
                    for d in chars.by_ref() {
                        out.push(d);
                        if d == '}' {
                            break;
                        }
                    }
                }
            }
            Some(other) => {
                // CPython keeps unrecognized escapes as a literal backslash
                // followed by the character (with a deprecation warning).
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

pub fn decode_bytes_body(body: &str, prefix: StringPrefix) -> Result<Vec<u8>, LexErrorKind> {
    if prefix.is_raw() {
        return Ok(body.bytes().collect());
    }
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            None => return Err(LexErrorKind::UnterminatedString),
            Some('\n') => {}
            Some('\\') => out.push(b'\\'),
            Some('\'') => out.push(b'\''),
            Some('"') => out.push(b'"'),
            Some('a') => out.push(0x7),
            Some('b') => out.push(0x8),
            Some('f') => out.push(0xc),
            Some('n') => out.push(b'\n'),
            Some('r') => out.push(b'\r'),
            Some('t') => out.push(b'\t'),
            Some('v') => out.push(0xb),
            Some('x') => {
                let hex = take_hex_digits(&mut chars, 2)?;
                let value = u8::from_str_radix(&hex, 16).map_err(|_| LexErrorKind::InvalidNumericLiteral)?;
                out.push(value);
            }
            Some(other) => {
                out.push(b'\\');
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    Ok(out)
}

fn take_hex_digits(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    n: usize,
) -> Result<String, LexErrorKind> {
    let mut s = String::with_capacity(n);
    for _ in 0..n {
        match chars.next() {
            Some(c) if c.is_ascii_hexdigit() => s.push(c),
            _ => return Err(LexErrorKind::InvalidNumericLiteral),
        }
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_common_escapes() {
        assert_eq!(decode_str_body(r"a\nb\tc", StringPrefix::Regular).unwrap(), "a\nb\tc");
    }

    #[test]
    fn raw_strings_skip_escaping() {
        assert_eq!(decode_str_body(r"a\nb", StringPrefix::Raw).unwrap(), r"a\nb");
    }

    #[test]
    fn hex_escape_decodes_code_point() {
        assert_eq!(decode_str_body(r"\x41", StringPrefix::Regular).unwrap(), "A");
    }

    #[test]
    fn unrecognized_escape_is_preserved() {
        assert_eq!(decode_str_body(r"\q", StringPrefix::Regular).unwrap(), r"\q");
    }

    #[test]
    fn bytes_hex_escape_decodes_byte() {
        assert_eq!(decode_bytes_body(r"\x00", StringPrefix::Bytes).unwrap(), vec![0]);
    }
}
