//! Collecting parsed parts into their slots.
//!
//! The first part inserted fixes the part total; every later part must
//! agree with it. Slots are filled by index, so parts may arrive in any
//! order.

use tracing::debug;

use crate::config::DecoderConfig;
use crate::error::{FrameError, Result};
use crate::grammar::render_header;
use crate::part::Header;

/// Slots for the payloads of one encoded file.
#[derive(Debug, Clone)]
pub struct Reassembler {
    max_parts: usize,
    total: Option<usize>,
    slots: Vec<Option<String>>,
    file_name: Option<String>,
}

/// Payloads of a complete transfer, in index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub total: usize,
    pub file_name: String,
    /// Concatenated base64 payload.
    pub data: String,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::with_config(&DecoderConfig::default())
    }

    pub fn with_config(config: &DecoderConfig) -> Self {
        Self {
            max_parts: config.max_parts,
            total: None,
            slots: Vec::new(),
            file_name: None,
        }
    }

    /// Store the payload of one part.
    ///
    /// A repeated index replaces the earlier payload.
    ///
    /// # Errors
    ///
    /// - [`FrameError::MalformedHeader`] if the first part declares more
    ///   parts than the configured limit.
    /// - [`FrameError::InconsistentTotal`] if the part disagrees with the
    ///   total fixed by the first part.
    pub fn insert(&mut self, header: Header, payload: String) -> Result<()> {
        let total = match self.total {
            Some(total) if total != header.total => {
                return Err(FrameError::InconsistentTotal {
                    expected: total,
                    found: header.total,
                    index: header.index,
                });
            }
            Some(total) => total,
            None => {
                if header.total > self.max_parts {
                    return Err(FrameError::MalformedHeader {
                        header: rendered(&header),
                        reason: format!("total exceeds the limit of {} parts", self.max_parts),
                    });
                }
                self.total = Some(header.total);
                self.slots = vec![None; header.total];
                header.total
            }
        };

        let Some(slot) = header
            .index
            .checked_sub(1)
            .and_then(|position| self.slots.get_mut(position))
        else {
            return Err(FrameError::MalformedHeader {
                header: rendered(&header),
                reason: format!("index {} outside 1..={total}", header.index),
            });
        };
        if slot.is_some() {
            debug!(index = header.index, "part received again, keeping the latest copy");
        }
        *slot = Some(payload);

        if let Some(name) = header.file_name {
            self.file_name = Some(name);
        }
        Ok(())
    }

    /// Total fixed by the first inserted part.
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// File name recorded from a part header, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// 1-based indices received so far, ascending.
    pub fn received(&self) -> Vec<usize> {
        self.indices(true)
    }

    /// 1-based indices still missing, ascending.
    pub fn missing(&self) -> Vec<usize> {
        self.indices(false)
    }

    pub fn is_complete(&self) -> bool {
        self.total.is_some() && self.slots.iter().all(Option::is_some)
    }

    /// Concatenate the payloads of a complete transfer.
    ///
    /// # Errors
    ///
    /// - [`FrameError::IncompleteTransfer`] listing every missing index.
    /// - [`FrameError::MalformedHeader`] if no part carried the file name.
    pub fn finish(self) -> Result<Assembled> {
        let Some(total) = self.total else {
            return Err(FrameError::TruncatedInput("no parts found".to_string()));
        };

        let missing = self.missing();
        if !missing.is_empty() {
            return Err(FrameError::IncompleteTransfer { missing, total });
        }

        let file_name = self.file_name.ok_or_else(|| FrameError::MalformedHeader {
            header: render_header(1, total, None).trim_end().to_string(),
            reason: "part 1 carries no file name".to_string(),
        })?;

        let data = self.slots.into_iter().flatten().collect();
        Ok(Assembled {
            total,
            file_name,
            data,
        })
    }

    fn indices(&self, present: bool) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some() == present)
            .map(|(i, _)| i + 1)
            .collect()
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

fn rendered(header: &Header) -> String {
    render_header(header.index, header.total, header.file_name.as_deref())
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(index: usize, total: usize) -> Header {
        Header {
            index,
            total,
            file_name: (index == 1).then(|| "out.bin".to_string()),
        }
    }

    #[test]
    fn assembles_out_of_order_parts() {
        let mut r = Reassembler::new();
        r.insert(header(3, 3), "CC".to_string()).unwrap();
        r.insert(header(1, 3), "AA".to_string()).unwrap();
        assert!(!r.is_complete());
        r.insert(header(2, 3), "BB".to_string()).unwrap();
        assert!(r.is_complete());

        let assembled = r.finish().unwrap();
        assert_eq!(assembled.data, "AABBCC");
        assert_eq!(assembled.total, 3);
        assert_eq!(assembled.file_name, "out.bin");
    }

    #[test]
    fn first_part_fixes_total() {
        let mut r = Reassembler::new();
        r.insert(header(2, 4), String::new()).unwrap();
        let err = r.insert(header(1, 5), String::new()).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InconsistentTotal {
                expected: 4,
                found: 5,
                index: 1
            }
        ));
    }

    #[test]
    fn missing_parts_are_all_listed() {
        let mut r = Reassembler::new();
        r.insert(header(1, 6), "A".to_string()).unwrap();
        r.insert(header(4, 6), "D".to_string()).unwrap();
        assert_eq!(r.received(), vec![1, 4]);
        assert_eq!(r.missing(), vec![2, 3, 5, 6]);

        match r.finish().unwrap_err() {
            FrameError::IncompleteTransfer { missing, total } => {
                assert_eq!(missing, vec![2, 3, 5, 6]);
                assert_eq!(total, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_part_keeps_latest_payload() {
        let mut r = Reassembler::new();
        r.insert(header(1, 1), "old".to_string()).unwrap();
        r.insert(header(1, 1), "new".to_string()).unwrap();
        assert_eq!(r.finish().unwrap().data, "new");
    }

    #[test]
    fn missing_file_name_is_malformed_header() {
        let mut r = Reassembler::new();
        r.insert(
            Header {
                index: 1,
                total: 1,
                file_name: None,
            },
            "QQ==".to_string(),
        )
        .unwrap();
        assert!(matches!(
            r.finish().unwrap_err(),
            FrameError::MalformedHeader { .. }
        ));
    }

    #[test]
    fn oversized_total_is_rejected_before_allocation() {
        let mut r = Reassembler::with_config(&DecoderConfig { max_parts: 10 });
        let err = r.insert(header(1, 11), String::new()).unwrap_err();
        assert!(err.to_string().contains("limit of 10 parts"));
        assert!(r.total().is_none());
    }

    #[test]
    fn index_outside_total_is_rejected() {
        let mut r = Reassembler::new();
        r.insert(header(1, 2), String::new()).unwrap();
        let err = r
            .insert(
                Header {
                    index: 3,
                    total: 2,
                    file_name: None,
                },
                String::new(),
            )
            .unwrap_err();
        assert!(matches!(err, FrameError::MalformedHeader { .. }));
    }

    #[test]
    fn empty_reassembler_reports_no_parts() {
        assert!(matches!(
            Reassembler::new().finish().unwrap_err(),
            FrameError::TruncatedInput(_)
        ));
    }
}
