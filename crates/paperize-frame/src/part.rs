use std::fmt;

use crate::error::{FrameError, Result};
use crate::grammar::{
    char_len, render_checksum, render_header, DELIMITER, HEADER_OPEN, NAME_FIELD, PART_TRAILER,
};

/// One capacity-bounded text chunk of an encoded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// 1-based position in the part sequence.
    pub index: usize,
    /// Declared number of parts, identical on every part of one file.
    pub total: usize,
    /// Original file name. Only part 1 carries it.
    pub file_name: Option<String>,
    /// Base64 slice, including any soft line breaks that fell into it.
    pub payload: String,
    /// Hex SHA-256 digest of the original file, on the final part only.
    pub checksum: Option<String>,
}

impl Part {
    /// Create a part without a checksum.
    pub fn new(
        index: usize,
        total: usize,
        file_name: Option<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            index,
            total,
            file_name,
            payload: payload.into(),
            checksum: None,
        }
    }

    /// Rendered header line of this part.
    pub fn header(&self) -> String {
        render_header(self.index, self.total, self.file_name.as_deref())
    }

    /// Characters of framing around the payload, excluding the checksum.
    pub fn overhead(&self) -> usize {
        char_len(&self.header()) + char_len(PART_TRAILER)
    }

    /// The framed text handed to the optical renderer.
    pub fn text(&self) -> String {
        self.to_string()
    }

    /// Rendered length in characters.
    pub fn char_len(&self) -> usize {
        let checksum = self
            .checksum
            .as_deref()
            .map(|digest| char_len(&render_checksum(digest)))
            .unwrap_or(0);
        self.overhead() + char_len(&self.payload) + checksum
    }

    /// Payload with the cosmetic line breaks removed.
    pub fn data(&self) -> String {
        self.payload
            .chars()
            .filter(|c| !crate::grammar::is_line_break(*c))
            .collect()
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header())?;
        f.write_str(&self.payload)?;
        f.write_str(PART_TRAILER)?;
        if let Some(digest) = &self.checksum {
            f.write_str(&render_checksum(digest))?;
        }
        Ok(())
    }
}

/// Parsed fields of a part header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub index: usize,
    pub total: usize,
    pub file_name: Option<String>,
}

impl Header {
    /// Parse the text between `---pprzv1:` and the closing `---`.
    ///
    /// Accepts `{index}/{total}` optionally followed by `:n:{file_name}`;
    /// the file name may itself contain `:`.
    pub fn parse(raw: &str) -> Result<Self> {
        let (position, name_field) = match raw.split_once(':') {
            Some((position, rest)) => (position, Some(rest)),
            None => (raw, None),
        };

        let (index, total) = position
            .split_once('/')
            .ok_or_else(|| malformed(raw, "expected {index}/{total}"))?;
        let index = parse_number(raw, "index", index)?;
        let total = parse_number(raw, "total", total)?;

        if total == 0 {
            return Err(malformed(raw, "total must be at least 1"));
        }
        if index == 0 || index > total {
            return Err(malformed(
                raw,
                format!("index {index} outside 1..={total}"),
            ));
        }

        let file_name = match name_field {
            None => None,
            Some(field) => match field.split_once(':') {
                Some((NAME_FIELD, name)) if !name.is_empty() => Some(name.to_string()),
                _ => return Err(malformed(raw, "expected n:{file_name} after total")),
            },
        };

        Ok(Self {
            index,
            total,
            file_name,
        })
    }
}

fn parse_number(raw: &str, field: &str, value: &str) -> Result<usize> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(raw, format!("{field} {value:?} is not a number")));
    }
    value
        .parse()
        .map_err(|_| malformed(raw, format!("{field} {value:?} is out of range")))
}

fn malformed(raw: &str, reason: impl Into<String>) -> FrameError {
    FrameError::MalformedHeader {
        header: format!("{HEADER_OPEN}{raw}{DELIMITER}"),
        reason: reason.into(),
    }
}
