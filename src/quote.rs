use std::fmt::Write as _;
use std::str::Chars;

use thiserror::Error;

/// Why a double-quoted literal could not be unquoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnquoteError {
    #[error("literal is not enclosed in double quotes")]
    MissingQuotes,
    #[error("literal contains a raw newline")]
    Newline,
    #[error("literal contains an unescaped double quote")]
    BareQuote,
    #[error("escape sequence ends early")]
    TruncatedEscape,
    #[error("unknown escape sequence \\{0}")]
    UnknownEscape(char),
    #[error("malformed digits in escape sequence")]
    BadDigits,
    #[error("escape denotes invalid code point {0:#x}")]
    InvalidCodePoint(u32),
    #[error("escape denotes non-ASCII byte {0:#04x}")]
    NonAsciiByte(u32),
}

/// Interpret a double-quoted string literal, including its quotes.
///
/// Recognized escapes: `\a \b \f \n \r \t \v \\ \"`, `\xHH`, octal `\OOO`,
/// `\uHHHH` and `\UHHHHHHHH`. Byte escapes must stay within ASCII.
pub fn unquote(literal: &str) -> Result<String, UnquoteError> {
    let inner = literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or(UnquoteError::MissingQuotes)?;

    // Fast path: nothing to interpret.
    if !inner.contains(['\\', '"', '\n']) {
        return Ok(inner.to_string());
    }

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\n' => return Err(UnquoteError::Newline),
            '"' => return Err(UnquoteError::BareQuote),
            '\\' => result.push(unescape(&mut chars)?),
            _ => result.push(ch),
        }
    }
    Ok(result)
}

/// Decode one escape; `chars` is positioned just after the backslash.
fn unescape(chars: &mut Chars<'_>) -> Result<char, UnquoteError> {
    let ch = chars.next().ok_or(UnquoteError::TruncatedEscape)?;
    let decoded = match ch {
        'a' => '\u{07}',
        'b' => '\u{08}',
        'f' => '\u{0C}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{0B}',
        '\\' => '\\',
        '"' => '"',
        'x' => ascii_byte(digits(chars, 2, 16)?)?,
        'u' => code_point(digits(chars, 4, 16)?)?,
        'U' => code_point(digits(chars, 8, 16)?)?,
        '0'..='7' => {
            let high = ch as u32 - '0' as u32;
            let value = (high << 6) | digits(chars, 2, 8)?;
            if value > 0o377 {
                return Err(UnquoteError::BadDigits);
            }
            ascii_byte(value)?
        }
        other => return Err(UnquoteError::UnknownEscape(other)),
    };
    Ok(decoded)
}

fn digits(chars: &mut Chars<'_>, count: usize, radix: u32) -> Result<u32, UnquoteError> {
    let mut value = 0;
    for _ in 0..count {
        let ch = chars.next().ok_or(UnquoteError::TruncatedEscape)?;
        let digit = ch.to_digit(radix).ok_or(UnquoteError::BadDigits)?;
        value = value * radix + digit;
    }
    Ok(value)
}

fn ascii_byte(value: u32) -> Result<char, UnquoteError> {
    if value < 0x80 {
        Ok(char::from(value as u8))
    } else {
        Err(UnquoteError::NonAsciiByte(value))
    }
}

fn code_point(value: u32) -> Result<char, UnquoteError> {
    char::from_u32(value).ok_or(UnquoteError::InvalidCodePoint(value))
}

/// Render `value` as a double-quoted literal that [`unquote`] maps back to
/// `value` exactly.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0B}' => out.push_str("\\v"),
            c if c.is_ascii_control() => {
                // Writing to a String cannot fail.
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
