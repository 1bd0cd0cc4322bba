//! Escaping and unescaping of JSON string contents.
//!
//! [`escape_into`] produces the raw text stored between the quotes of a
//! rewritten string and reports whether any escape was emitted, which decides
//! between the [`JsonType::String`](crate::JsonType::String) and
//! [`JsonType::StringWithEscaping`](crate::JsonType::StringWithEscaping)
//! tags. [`unescape`] reverses the process when a string is materialized.

use alloc::{borrow::Cow, string::String, vec::Vec};

use bstr::ByteSlice;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Appends the escaped form of `text` to `out`.
///
/// Newline, carriage return, tab and backslash are replaced by their
/// two-byte escapes and a quote is prefixed with a backslash. Any other
/// control character becomes a `\u00XX` escape. Returns `true` if anything
/// was escaped.
pub fn escape_into(text: &str, out: &mut Vec<u8>) -> bool {
    let mut escaped = false;
    for &byte in text.as_bytes() {
        match byte {
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'"' => out.extend_from_slice(b"\\\""),
            0x00..=0x1f => out.extend_from_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX_DIGITS[usize::from(byte >> 4)],
                HEX_DIGITS[usize::from(byte & 0xf)],
            ]),
            _ => {
                out.push(byte);
                continue;
            }
        }
        escaped = true;
    }
    escaped
}

/// Decodes the raw contents of a JSON string.
///
/// Text without a backslash is borrowed. Unpaired surrogate escapes decode to
/// U+FFFD; the scanner guarantees every other escape is well formed.
#[must_use]
pub fn unescape(raw: &[u8]) -> Cow<'_, str> {
    if raw.find_byte(b'\\').is_none() {
        return String::from_utf8_lossy(raw);
    }

    let mut out = Vec::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find_byte(b'\\') {
        out.extend_from_slice(&rest[..pos]);
        let Some((&kind, tail)) = rest[pos + 1..].split_first() else {
            rest = &[];
            break;
        };
        rest = tail;
        match kind {
            b'"' => out.push(b'"'),
            b'\\' => out.push(b'\\'),
            b'/' => out.push(b'/'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => {
                let (ch, tail) = decode_unicode_escape(rest);
                rest = tail;
                let mut utf8 = [0; 4];
                out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
            other => out.extend_from_slice(&[b'\\', other]),
        }
    }
    out.extend_from_slice(rest);

    match String::from_utf8(out) {
        Ok(text) => Cow::Owned(text),
        Err(err) => Cow::Owned(String::from_utf8_lossy(err.as_bytes()).into_owned()),
    }
}

/// Decodes the four hex digits at the start of `digits`.
pub(crate) fn hex4(digits: &[u8]) -> Option<u32> {
    let digits = digits.get(..4)?;
    digits.iter().try_fold(0, |code, &digit| {
        let value = char::from(digit).to_digit(16)?;
        Some((code << 4) | value)
    })
}

/// Decodes the code point following a `\u`, combining a surrogate pair when
/// the high half is followed by a `\u` low half. Returns the remaining input.
fn decode_unicode_escape(rest: &[u8]) -> (char, &[u8]) {
    let Some(code) = hex4(rest) else {
        return (char::REPLACEMENT_CHARACTER, rest);
    };
    let rest = &rest[4..];
    match code {
        0xD800..=0xDBFF => {
            if let Some(low) = rest.strip_prefix(b"\\u").and_then(hex4) {
                if (0xDC00..=0xDFFF).contains(&low) {
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    let ch = char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER);
                    return (ch, &rest[6..]);
                }
            }
            (char::REPLACEMENT_CHARACTER, rest)
        }
        0xDC00..=0xDFFF => (char::REPLACEMENT_CHARACTER, rest),
        _ => (
            char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
            rest,
        ),
    }
}
