//! Strict parser for the record array format.
//!
//! Accepts exactly an array of objects with the four record fields, in any
//! order, separated by optional JSON whitespace. Trailing commas, unknown or
//! duplicate fields and trailing content are rejected.

use super::original::JsonRecord;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unexpected end of input at byte {pos}")]
    UnexpectedEnd { pos: usize },

    #[error("Expected {expected} at byte {pos}")]
    Expected { expected: &'static str, pos: usize },

    #[error("Invalid number at byte {pos}: {reason}")]
    InvalidNumber { pos: usize, reason: &'static str },

    #[error("Invalid string at byte {pos}: {reason}")]
    InvalidString { pos: usize, reason: &'static str },

    #[error("Unknown field `{field}`")]
    UnknownField { field: String },

    #[error("Duplicate field `{field}`")]
    DuplicateField { field: &'static str },

    #[error("Missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("Trailing content at byte {pos}")]
    TrailingContent { pos: usize },
}

/// Parse a complete JSON array of records
pub fn parse_records(json: &str) -> Result<Vec<JsonRecord>, ParseError> {
    let mut cursor = Cursor {
        bytes: json.as_bytes(),
        pos: 0,
    };
    let records = cursor.array()?;
    cursor.skip_whitespace();
    if cursor.pos < cursor.bytes.len() {
        return Err(ParseError::TrailingContent { pos: cursor.pos });
    }
    Ok(records)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.bytes.get(self.pos) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Result<u8, ParseError> {
        self.skip_whitespace();
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(ParseError::UnexpectedEnd { pos: self.pos })
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), ParseError> {
        if self.peek()? != byte {
            return Err(ParseError::Expected { expected, pos: self.pos });
        }
        self.pos += 1;
        Ok(())
    }

    fn array(&mut self) -> Result<Vec<JsonRecord>, ParseError> {
        self.expect(b'[', "'['")?;
        let mut records = Vec::new();
        if self.peek()? == b']' {
            self.pos += 1;
            return Ok(records);
        }
        loop {
            records.push(self.object()?);
            match self.peek()? {
                b',' => self.pos += 1,
                b']' => {
                    self.pos += 1;
                    return Ok(records);
                }
                _ => return Err(ParseError::Expected { expected: "',' or ']'", pos: self.pos }),
            }
        }
    }

    fn object(&mut self) -> Result<JsonRecord, ParseError> {
        self.expect(b'{', "'{'")?;

        let mut id = None;
        let mut value = None;
        let mut flag = None;
        let mut name = None;

        loop {
            let key = self.string()?;
            self.expect(b':', "':'")?;
            match key.as_str() {
                "id" => set_once(&mut id, self.integer()?, "id")?,
                "value" => set_once(&mut value, self.integer()?, "value")?,
                "flag" => set_once(&mut flag, self.boolean()?, "flag")?,
                "name" => set_once(&mut name, self.string()?, "name")?,
                _ => return Err(ParseError::UnknownField { field: key }),
            }
            match self.peek()? {
                b',' => self.pos += 1,
                b'}' => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(ParseError::Expected { expected: "',' or '}'", pos: self.pos }),
            }
        }

        let id = id.ok_or(ParseError::MissingField { field: "id" })?;
        Ok(JsonRecord {
            id: u32::try_from(id).map_err(|_| ParseError::InvalidNumber {
                pos: self.pos,
                reason: "id out of range",
            })?,
            value: i32::try_from(value.ok_or(ParseError::MissingField { field: "value" })?)
                .map_err(|_| ParseError::InvalidNumber {
                    pos: self.pos,
                    reason: "value out of range",
                })?,
            flag: flag.ok_or(ParseError::MissingField { field: "flag" })?,
            name: name.ok_or(ParseError::MissingField { field: "name" })?,
        })
    }

    fn string(&mut self) -> Result<String, ParseError> {
        self.expect(b'"', "'\"'")?;
        let mut out = Vec::new();
        loop {
            let Some(&byte) = self.bytes.get(self.pos) else {
                return Err(ParseError::InvalidString { pos: self.pos, reason: "unterminated string" });
            };
            self.pos += 1;
            match byte {
                b'"' => break,
                b'\\' => {
                    let escaped = match self.bytes.get(self.pos) {
                        Some(b'"') => b'"',
                        Some(b'\\') => b'\\',
                        Some(b'n') => b'\n',
                        Some(b'r') => b'\r',
                        Some(b't') => b'\t',
                        Some(_) => {
                            return Err(ParseError::InvalidString { pos: self.pos, reason: "unsupported escape" })
                        }
                        None => {
                            return Err(ParseError::InvalidString { pos: self.pos, reason: "incomplete escape" })
                        }
                    };
                    out.push(escaped);
                    self.pos += 1;
                }
                byte => out.push(byte),
            }
        }
        String::from_utf8(out).map_err(|_| ParseError::InvalidString {
            pos: self.pos,
            reason: "invalid UTF-8",
        })
    }

    /// Signed decimal integer without fraction or exponent, widened to i64
    fn integer(&mut self) -> Result<i64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let negative = self.bytes.get(self.pos) == Some(&b'-');
        if negative {
            self.pos += 1;
        }

        let mut magnitude: i64 = 0;
        let mut digits = 0;
        while let Some(&byte) = self.bytes.get(self.pos) {
            if !byte.is_ascii_digit() {
                break;
            }
            magnitude = magnitude
                .checked_mul(10)
                .and_then(|m| m.checked_add((byte - b'0') as i64))
                .ok_or(ParseError::InvalidNumber { pos: start, reason: "overflow" })?;
            digits += 1;
            self.pos += 1;
        }

        if digits == 0 {
            return Err(ParseError::InvalidNumber { pos: start, reason: "expected digit" });
        }
        if let Some(b'.' | b'e' | b'E') = self.bytes.get(self.pos) {
            return Err(ParseError::InvalidNumber { pos: self.pos, reason: "not an integer" });
        }
        Ok(if negative { -magnitude } else { magnitude })
    }

    fn boolean(&mut self) -> Result<bool, ParseError> {
        self.skip_whitespace();
        let rest = &self.bytes[self.pos..];
        if rest.starts_with(b"true") {
            self.pos += 4;
            Ok(true)
        } else if rest.starts_with(b"false") {
            self.pos += 5;
            Ok(false)
        } else {
            Err(ParseError::Expected { expected: "boolean", pos: self.pos })
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, field: &'static str) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::DuplicateField { field });
    }
    *slot = Some(value);
    Ok(())
}
