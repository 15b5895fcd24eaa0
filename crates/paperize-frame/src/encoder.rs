//! Splitting a file into capacity-bounded parts.
//!
//! The file is base64-encoded and cut greedily: every part takes as many
//! characters of the 80-column wrapped rendering of the remaining data as
//! its framing leaves room for. Because the framing of every part embeds
//! the part total, the split is repeated until the declared total equals
//! the number of parts it produces.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::EncoderConfig;
use crate::error::{FrameError, Result};
use crate::grammar::{char_len, is_line_break, render_checksum, DELIMITER};
use crate::part::Part;

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Encode `data` into parts using an explicit capacity.
pub fn encode_with_capacity(data: &[u8], capacity: usize, file_name: &str) -> Result<Vec<Part>> {
    encode(data, &EncoderConfig::with_capacity(capacity), file_name)
}

/// Encode `data` into parts.
///
/// Identical inputs always produce identical parts.
///
/// # Errors
///
/// - [`FrameError::InvalidFileName`] if `file_name` cannot be carried in a header.
/// - [`FrameError::CapacityExceeded`] if a part's framing leaves no room.
/// - [`FrameError::NoConvergence`] if the part total does not settle within
///   `config.max_rounds` rounds.
pub fn encode(data: &[u8], config: &EncoderConfig, file_name: &str) -> Result<Vec<Part>> {
    validate_file_name(file_name)?;

    let b64 = STANDARD.encode(data);
    let digest = sha256_hex(data);
    let splitter = Splitter {
        data: &b64,
        digest: &digest,
        file_name,
        capacity: config.capacity,
        wrap_width: match config.wrap_width {
            0 => usize::MAX,
            width => width,
        },
    };

    let mut declared = b64.len().checked_div(config.capacity).unwrap_or(0);
    for round in 1..=config.max_rounds {
        let parts = splitter.split(declared)?;
        let produced = parts.len();
        if produced == declared {
            debug!(round, total = produced, "part total settled");
            return Ok(parts);
        }

        debug!(round, declared, produced, "part total changed, splitting again");
        if round == config.max_rounds {
            return Err(FrameError::NoConvergence {
                rounds: round,
                declared,
                produced,
            });
        }
        declared = produced;
    }

    Err(FrameError::NoConvergence {
        rounds: 0,
        declared,
        produced: 0,
    })
}

/// Reject names the scanner could not recover unambiguously from a header.
pub fn validate_file_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.chars().any(is_line_break) {
        "must not contain line breaks"
    } else if name.contains(DELIMITER) {
        "must not contain ---"
    } else if name.ends_with('-') {
        "must not end with -"
    } else {
        return Ok(());
    };

    Err(FrameError::InvalidFileName {
        name: name.to_string(),
        reason,
    })
}

struct Splitter<'a> {
    data: &'a str,
    digest: &'a str,
    file_name: &'a str,
    capacity: usize,
    wrap_width: usize,
}

impl Splitter<'_> {
    /// One greedy pass with every header declaring `declared` parts.
    fn split(&self, declared: usize) -> Result<Vec<Part>> {
        let mut parts = Vec::with_capacity(declared.max(1));
        let mut remaining = self.data;
        let mut index = 1;

        loop {
            let file_name = (index == 1).then(|| self.file_name.to_string());
            let mut part = Part::new(index, declared, file_name, String::new());
            let overhead = part.overhead();
            if overhead >= self.capacity {
                return Err(FrameError::CapacityExceeded {
                    index,
                    overhead,
                    capacity: self.capacity,
                });
            }

            let (payload, consumed) =
                wrapped_prefix(remaining, self.wrap_width, self.capacity - overhead);
            part.payload = payload;
            remaining = &remaining[consumed..];
            parts.push(part);
            index += 1;

            if remaining.is_empty() {
                break;
            }
        }

        let marker_len = char_len(&render_checksum(self.digest));
        match parts.last_mut() {
            Some(last) if last.char_len() + marker_len <= self.capacity => {
                last.checksum = Some(self.digest.to_string());
            }
            _ => {
                let mut spill = Part::new(index, declared, None, String::new());
                spill.checksum = Some(self.digest.to_string());
                let needed = spill.char_len();
                if needed > self.capacity {
                    return Err(FrameError::CapacityExceeded {
                        index,
                        overhead: needed,
                        capacity: self.capacity,
                    });
                }
                debug!(index, "checksum spills into its own part");
                parts.push(spill);
            }
        }

        Ok(parts)
    }
}

/// First `room` characters of `data` wrapped at `width` columns.
///
/// Returns the slice, line breaks included, and how many characters of
/// `data` it consumed. `data` must be ASCII, which base64 always is.
fn wrapped_prefix(data: &str, width: usize, room: usize) -> (String, usize) {
    let mut out = String::with_capacity(room);
    let mut consumed = 0;
    let mut budget = room;

    for (line_no, line) in data.as_bytes().chunks(width).enumerate() {
        if budget == 0 {
            break;
        }
        if line_no > 0 {
            out.push('\n');
            budget -= 1;
        }
        let take = line.len().min(budget);
        out.push_str(&data[consumed..consumed + take]);
        consumed += take;
        budget -= take;
    }

    (out, consumed)
}
