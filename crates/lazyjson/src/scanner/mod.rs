//! Scanner: single pass from JSON text to a [`Description`].
//!
//! The scanner validates the whole document (RFC 8259, no extensions) while
//! appending one record per value. Containers are tracked on an explicit
//! stack, so nesting depth is bounded by [`ParseOptions::max_depth`] rather
//! than by the call stack.
//!
//! Records are written in document order. A container header is written when
//! its opening bracket is seen and completed when the closing bracket is
//! seen; by then all of its children have been appended behind it, which is
//! what makes the header's index length a plain subtraction.


use alloc::vec::Vec;

use crate::{
    Bounds, Buffer, Description, JsonType, ParseOptions, Result, SyntaxError,
    description::fits_record_field, escape::hex4,
};

/// Scans `json` into a shared buffer and its description.
///
/// # Errors
///
/// Returns [`Error::Malformed`](crate::Error::Malformed) if `json` is not
/// exactly one valid JSON value surrounded by optional whitespace, or if it
/// nests deeper than `options.max_depth`.
pub fn scan(json: &[u8], options: &ParseOptions) -> Result<(Buffer, Description)> {
    let description = describe(json, options)?;
    Ok((Buffer::from(json), description))
}

/// Scans `json` into a description without copying the text.
pub(crate) fn describe(json: &[u8], options: &ParseOptions) -> Result<Description> {
    if !fits_record_field(json.len()) {
        return Err(SyntaxError::DocumentTooLarge(json.len()).at(0));
    }
    if let Err(err) = core::str::from_utf8(json) {
        return Err(SyntaxError::InvalidUtf8.at(err.valid_up_to()));
    }

    let mut scanner = Scanner {
        json,
        pos: 0,
        description: Description::with_capacity(json.len()),
        max_depth: options.max_depth,
    };
    scanner.scan_document()?;
    scanner.description.shrink_to_fit();

    crate::debug!(
        json_len = json.len(),
        index_len = scanner.description.len(),
        "described JSON document"
    );
    Ok(scanner.description)
}

/// An open container on the scanner's stack.
struct Frame {
    header: usize,
    ty: JsonType,
    count: usize,
}

impl Frame {
    fn closing_byte(&self) -> u8 {
        if self.ty == JsonType::Object { b'}' } else { b']' }
    }
}

struct Scanner<'a> {
    json: &'a [u8],
    pos: usize,
    description: Description,
    max_depth: usize,
}

impl Scanner<'_> {
    fn scan_document(&mut self) -> Result<()> {
        let mut stack: Vec<Frame> = Vec::new();

        'value: loop {
            self.skip_whitespace();
            match self.peek()? {
                open @ (b'{' | b'[') => {
                    if stack.len() >= self.max_depth {
                        return Err(SyntaxError::DepthLimitExceeded(self.max_depth).at(self.pos));
                    }
                    let ty = if open == b'{' {
                        JsonType::Object
                    } else {
                        JsonType::Array
                    };
                    let frame = Frame {
                        header: self.description.open_container(ty, self.pos),
                        ty,
                        count: 0,
                    };
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.peek()? == frame.closing_byte() {
                        self.pos += 1;
                        self.description.close_container(frame.header, self.pos, 0);
                    } else {
                        stack.push(frame);
                        if ty == JsonType::Object {
                            self.scan_key()?;
                        }
                        continue 'value;
                    }
                }
                b'"' => self.scan_string()?,
                b'-' | b'0'..=b'9' => self.scan_number()?,
                b't' => self.scan_literal(b"true", JsonType::BoolTrue)?,
                b'f' => self.scan_literal(b"false", JsonType::BoolFalse)?,
                b'n' => self.scan_literal(b"null", JsonType::Null)?,
                other => return Err(SyntaxError::UnexpectedByte(other).at(self.pos)),
            }

            // A value just ended; close every container it completes.
            loop {
                let Some(frame) = stack.last_mut() else {
                    break 'value;
                };
                frame.count += 1;
                let (ty, closing) = (frame.ty, frame.closing_byte());

                self.skip_whitespace();
                match self.peek()? {
                    b',' => {
                        self.pos += 1;
                        if ty == JsonType::Object {
                            self.scan_key()?;
                        }
                        continue 'value;
                    }
                    byte if byte == closing => {
                        self.pos += 1;
                        if let Some(frame) = stack.pop() {
                            self.description
                                .close_container(frame.header, self.pos, frame.count);
                        }
                    }
                    other => return Err(SyntaxError::UnexpectedByte(other).at(self.pos)),
                }
            }
        }

        self.skip_whitespace();
        if self.pos == self.json.len() {
            Ok(())
        } else {
            Err(SyntaxError::TrailingContent.at(self.pos))
        }
    }

    fn peek(&self) -> Result<u8> {
        self.json
            .get(self.pos)
            .copied()
            .ok_or(SyntaxError::UnexpectedEndOfInput.at(self.pos))
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.json.get(self.pos) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        match self.peek()? {
            found if found == byte => {
                self.pos += 1;
                Ok(())
            }
            found => Err(SyntaxError::UnexpectedByte(found).at(self.pos)),
        }
    }

    /// Scans `"key"` and the following `:` of an object member.
    fn scan_key(&mut self) -> Result<()> {
        self.skip_whitespace();
        match self.peek()? {
            b'"' => self.scan_string()?,
            other => return Err(SyntaxError::UnexpectedByte(other).at(self.pos)),
        }
        self.skip_whitespace();
        self.expect(b':')
    }

    fn scan_string(&mut self) -> Result<()> {
        let start = self.pos + 1;
        let mut at = start;
        let mut escaped = false;

        loop {
            let run = self.json[at..]
                .iter()
                .position(|&b| b == b'"' || b == b'\\' || b < 0x20)
                .ok_or(SyntaxError::UnexpectedEndOfInput.at(self.json.len()))?;
            at += run;
            match self.json[at] {
                b'"' => break,
                b'\\' => {
                    escaped = true;
                    match self.json.get(at + 1) {
                        Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => at += 2,
                        Some(b'u') => {
                            if hex4(&self.json[at + 2..]).is_none() {
                                return Err(SyntaxError::InvalidUnicodeEscape.at(at));
                            }
                            at += 6;
                        }
                        Some(_) => return Err(SyntaxError::InvalidEscape.at(at)),
                        None => return Err(SyntaxError::UnexpectedEndOfInput.at(at + 1)),
                    }
                }
                control => return Err(SyntaxError::ControlCharacter(control).at(at)),
            }
        }

        let ty = if escaped {
            JsonType::StringWithEscaping
        } else {
            JsonType::String
        };
        self.description
            .push_scalar(ty, Bounds::new(start, at - start));
        self.pos = at + 1;
        Ok(())
    }

    fn scan_number(&mut self) -> Result<()> {
        let start = self.pos;
        let mut integral = true;

        if self.json[self.pos] == b'-' {
            self.pos += 1;
        }
        match self.json.get(self.pos) {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            Some(_) => return Err(SyntaxError::InvalidNumber.at(self.pos)),
            None => return Err(SyntaxError::UnexpectedEndOfInput.at(self.pos)),
        }
        if self.json.get(self.pos) == Some(&b'.') {
            integral = false;
            self.pos += 1;
            self.require_digits()?;
        }
        if let Some(b'e' | b'E') = self.json.get(self.pos) {
            integral = false;
            self.pos += 1;
            if let Some(b'+' | b'-') = self.json.get(self.pos) {
                self.pos += 1;
            }
            self.require_digits()?;
        }

        let bounds = Bounds::new(start, self.pos - start);
        let ty = if integral && fits_i64(&self.json[bounds.range()]) {
            JsonType::Integer
        } else {
            JsonType::FloatingNumber
        };
        self.description.push_scalar(ty, bounds);
        Ok(())
    }

    fn skip_digits(&mut self) {
        while self.json.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
    }

    fn require_digits(&mut self) -> Result<()> {
        let start = self.pos;
        self.skip_digits();
        if self.pos == start {
            Err(match self.json.get(self.pos) {
                Some(_) => SyntaxError::InvalidNumber.at(self.pos),
                None => SyntaxError::UnexpectedEndOfInput.at(self.pos),
            })
        } else {
            Ok(())
        }
    }

    fn scan_literal(&mut self, literal: &'static [u8], ty: JsonType) -> Result<()> {
        let rest = &self.json[self.pos..];
        if rest.starts_with(literal) {
            self.description
                .push_scalar(ty, Bounds::new(self.pos, literal.len()));
            self.pos += literal.len();
            return Ok(());
        }

        let matched = rest
            .iter()
            .zip(literal)
            .take_while(|(found, expected)| found == expected)
            .count();
        let at = self.pos + matched;
        Err(match rest.get(matched) {
            Some(&found) => SyntaxError::UnexpectedByte(found).at(at),
            None => SyntaxError::UnexpectedEndOfInput.at(at),
        })
    }
}

fn fits_i64(digits: &[u8]) -> bool {
    core::str::from_utf8(digits).is_ok_and(|text| text.parse::<i64>().is_ok())
}
