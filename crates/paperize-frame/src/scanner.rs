//! Tokenizer for captured part text.
//!
//! The scanner runs over text whose line breaks have already been removed
//! and splits it into typed tokens at the `---` openers of the grammar.
//! Parts may appear in any order and may be separated by capture noise;
//! grouping tokens into parts is left to the decoder.

use crate::error::{FrameError, Result};
use crate::grammar::{CHECKSUM_OPEN, DELIMITER, DIGEST_HEX_LEN, HEADER_OPEN, TRAILER_TOKEN};

const PREVIEW_CHARS: usize = 40;

/// One lexical element of a part stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Header fields between `---pprzv1:` and the closing `---`.
    Header(&'a str),
    /// Text between tokens.
    Payload(&'a str),
    /// `---pprz:end---`.
    Trailer,
    /// Hex digest of a `---sha256sum:{digest}---` marker.
    Checksum(&'a str),
}

/// Iterator over the tokens of line-break-free part text.
///
/// Yields at most one error, after which it is exhausted.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            failed: false,
        }
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn token(rest: &'a str) -> Result<(Token<'a>, usize)> {
        if rest.starts_with(TRAILER_TOKEN) {
            return Ok((Token::Trailer, TRAILER_TOKEN.len()));
        }

        if let Some(body) = rest.strip_prefix(CHECKSUM_OPEN) {
            let end = body.find(DELIMITER).ok_or_else(|| {
                FrameError::MalformedChecksum(format!(
                    "marker {:?} is not terminated",
                    preview(rest)
                ))
            })?;
            let digest = &body[..end];
            if digest.len() != DIGEST_HEX_LEN || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(FrameError::MalformedChecksum(format!(
                    "{:?} is not a SHA-256 hex digest",
                    preview(digest)
                )));
            }
            return Ok((
                Token::Checksum(digest),
                CHECKSUM_OPEN.len() + end + DELIMITER.len(),
            ));
        }

        if let Some(body) = rest.strip_prefix(HEADER_OPEN) {
            let end = body.find(DELIMITER).ok_or_else(|| {
                FrameError::TruncatedInput(format!("header {:?} is not terminated", preview(rest)))
            })?;
            return Ok((
                Token::Header(&body[..end]),
                HEADER_OPEN.len() + end + DELIMITER.len(),
            ));
        }

        // Anything up to the next known opener is ordinary text, including
        // runs of dashes that hide an opener inside them.
        let first = rest.chars().next().map_or(0, char::len_utf8);
        let end = next_opener(&rest[first..]).map_or(rest.len(), |found| first + found);
        Ok((Token::Payload(&rest[..end]), end))
    }
}

/// Byte offset of the earliest header, trailer or checksum opener.
fn next_opener(text: &str) -> Option<usize> {
    [HEADER_OPEN, TRAILER_TOKEN, CHECKSUM_OPEN]
        .iter()
        .filter_map(|opener| text.find(opener))
        .min()
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let rest = &self.input[self.pos..];
        if rest.is_empty() {
            return None;
        }

        match Self::token(rest) {
            Ok((token, len)) => {
                self.pos += len;
                Some(Ok(token))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
