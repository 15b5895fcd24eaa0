//! Reassembling a file from captured part text.
//!
//! Decoding never writes anything. The caller picks a destination from the
//! recovered file name, checks it with [`destination`] and writes the data.
//! A checksum mismatch is reported through [`Integrity::Mismatch`] rather
//! than as an error so the caller can still keep the reconstructed bytes.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::config::DecoderConfig;
use crate::encoder::sha256_hex;
use crate::error::{FrameError, Result};
use crate::grammar::{is_line_break, TRAILER_TOKEN};
use crate::part::Header;
use crate::reassembly::Reassembler;
use crate::scanner::{Scanner, Token};

/// Outcome of comparing the reconstructed bytes against the carried digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integrity {
    /// The content hashes to the carried digest.
    Verified { digest: String },
    /// The content was reconstructed but does not hash to the carried digest.
    Mismatch { expected: String, actual: String },
}

/// A file reconstructed from its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile {
    pub data: Vec<u8>,
    /// File name carried by part 1, as written by the encoder.
    pub file_name: String,
    /// Number of parts the file was split into.
    pub total: usize,
    pub integrity: Integrity,
}

impl DecodedFile {
    pub fn is_verified(&self) -> bool {
        matches!(self.integrity, Integrity::Verified { .. })
    }

    /// Turn a degraded result into [`FrameError::ChecksumMismatch`].
    pub fn verified(self) -> Result<Self> {
        match self.integrity {
            Integrity::Verified { .. } => Ok(self),
            Integrity::Mismatch { expected, actual } => {
                Err(FrameError::ChecksumMismatch { expected, actual })
            }
        }
    }
}

/// What a set of captured blobs contains, complete or not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Survey {
    /// Total declared by the parts, if any part was found.
    pub total: Option<usize>,
    pub received: Vec<usize>,
    pub missing: Vec<usize>,
    pub file_name: Option<String>,
    /// Digest of the first checksum marker found.
    pub checksum: Option<String>,
}

impl Survey {
    pub fn is_complete(&self) -> bool {
        self.total.is_some() && self.missing.is_empty() && self.checksum.is_some()
    }
}

/// Decode a file from captured text blobs, in any order.
pub fn decode<I, S>(blobs: I) -> Result<DecodedFile>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    decode_with_config(blobs, &DecoderConfig::default())
}

/// Decode a file from captured text blobs with explicit limits.
///
/// # Errors
///
/// - [`FrameError::MalformedChecksum`] if no usable checksum marker is present.
/// - [`FrameError::TruncatedInput`] if a part is cut off, or text after the
///   last part never reaches a trailer.
/// - [`FrameError::MalformedHeader`] if a header cannot be parsed.
/// - [`FrameError::InconsistentTotal`] if parts disagree on the total.
/// - [`FrameError::IncompleteTransfer`] if any part is missing.
/// - [`FrameError::InvalidEncoding`] if the payload is not base64.
pub fn decode_with_config<I, S>(blobs: I, config: &DecoderConfig) -> Result<DecodedFile>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let text = normalize(blobs);
    let tokens = Scanner::new(&text).collect::<Result<Vec<_>>>()?;
    let expected = single_checksum(&tokens)?;

    let grouped = group_parts(&tokens)?;
    if grouped.residual > 0 {
        return Err(FrameError::TruncatedInput(format!(
            "{} character(s) after the last part have no trailer",
            grouped.residual
        )));
    }

    let mut reassembler = Reassembler::with_config(config);
    for (header, payload) in grouped.parts {
        reassembler.insert(header, payload)?;
    }
    let assembled = reassembler.finish()?;

    let data = STANDARD.decode(assembled.data.as_bytes())?;
    let actual = sha256_hex(&data);
    let integrity = if actual.eq_ignore_ascii_case(expected) {
        debug!(total = assembled.total, bytes = data.len(), "file verified");
        Integrity::Verified { digest: actual }
    } else {
        warn!(
            expected,
            actual = %actual,
            file_name = %assembled.file_name,
            "reconstructed file does not match its checksum"
        );
        Integrity::Mismatch {
            expected: expected.to_ascii_lowercase(),
            actual,
        }
    };

    Ok(DecodedFile {
        data,
        file_name: assembled.file_name,
        total: assembled.total,
        integrity,
    })
}

/// Inventory the parts in captured text without requiring a complete set.
///
/// # Errors
///
/// Fails on unreadable framing: truncated or malformed tokens and headers,
/// and parts that disagree on the total.
pub fn survey<I, S>(blobs: I) -> Result<Survey>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let text = normalize(blobs);
    let tokens = Scanner::new(&text).collect::<Result<Vec<_>>>()?;
    let checksum = tokens.iter().find_map(|token| match token {
        Token::Checksum(digest) => Some(digest.to_ascii_lowercase()),
        _ => None,
    });

    let grouped = group_parts(&tokens)?;
    if grouped.residual > 0 {
        warn!(chars = grouped.residual, "text after the last part has no trailer");
    }

    let mut reassembler = Reassembler::new();
    for (header, payload) in grouped.parts {
        reassembler.insert(header, payload)?;
    }

    Ok(Survey {
        total: reassembler.total(),
        received: reassembler.received(),
        missing: reassembler.missing(),
        file_name: reassembler.file_name().map(str::to_string),
        checksum,
    })
}

/// Path a recovered file would be restored to inside `dir`.
///
/// Only the final component of `file_name` is used, so a crafted name
/// cannot escape `dir`.
///
/// # Errors
///
/// - [`FrameError::InvalidFileName`] if the name has no usable final component.
/// - [`FrameError::DestinationExists`] if the path is already taken.
pub fn destination(dir: &Path, file_name: &str) -> Result<PathBuf> {
    let base = Path::new(file_name)
        .file_name()
        .ok_or_else(|| FrameError::InvalidFileName {
            name: file_name.to_string(),
            reason: "has no final path component",
        })?;

    let path = dir.join(base);
    if path.try_exists()? || path.symlink_metadata().is_ok() {
        return Err(FrameError::DestinationExists(path));
    }
    Ok(path)
}

/// Concatenate blobs and drop every line break.
fn normalize<I, S>(blobs: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for blob in blobs {
        text.extend(blob.as_ref().chars().filter(|c| !is_line_break(*c)));
    }
    text
}

/// The one digest carried by the stream. Repeated identical markers are fine.
fn single_checksum<'a>(tokens: &[Token<'a>]) -> Result<&'a str> {
    let mut found: Option<&'a str> = None;
    for token in tokens {
        if let Token::Checksum(digest) = *token {
            match found {
                None => found = Some(digest),
                Some(first) if first.eq_ignore_ascii_case(digest) => {}
                Some(first) => {
                    return Err(FrameError::MalformedChecksum(format!(
                        "conflicting digests {first} and {digest}"
                    )));
                }
            }
        }
    }
    found.ok_or_else(|| FrameError::MalformedChecksum("no checksum marker found".to_string()))
}

/// Parts found in a token stream.
struct Grouped {
    parts: Vec<(Header, String)>,
    /// Non-blank characters left over after the last trailer.
    residual: usize,
}

/// Group `Header Payload* Trailer` runs into parsed parts.
///
/// Text in front of a header belongs to that header's segment and is
/// skipped. Text left over after the last trailer is counted in
/// `residual`; it never reached a trailer, so the capture was cut short.
fn group_parts(tokens: &[Token<'_>]) -> Result<Grouped> {
    let mut parts = Vec::new();
    let mut current: Option<(Header, String)> = None;
    let mut residual = String::new();

    for token in tokens {
        match *token {
            Token::Header(raw) => {
                if let Some((open, _)) = current.take() {
                    return Err(FrameError::TruncatedInput(format!(
                        "part {} has no trailer before the next header",
                        open.index
                    )));
                }
                if !residual.is_empty() {
                    warn!(chars = residual.len(), "skipping text in front of a part header");
                    residual.clear();
                }
                current = Some((Header::parse(raw)?, String::new()));
            }
            Token::Payload(text) => match current.as_mut() {
                Some((_, payload)) => payload.push_str(text),
                None => residual.push_str(text.trim()),
            },
            Token::Trailer => match current.take() {
                Some(part) => parts.push(part),
                None => {
                    return Err(FrameError::MalformedHeader {
                        header: TRAILER_TOKEN.to_string(),
                        reason: "part has no header".to_string(),
                    });
                }
            },
            Token::Checksum(_) => {}
        }
    }

    if let Some((open, _)) = current {
        return Err(FrameError::TruncatedInput(format!(
            "part {} ends without a trailer",
            open.index
        )));
    }
    Ok(Grouped {
        parts,
        residual: residual.chars().count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_with_capacity;
    use crate::part::Part;

    fn texts(parts: &[Part]) -> Vec<String> {
        parts.iter().map(Part::text).collect()
    }

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "paperize-frame-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn hello_world_round_trip() {
        let parts = encode_with_capacity(b"hello world", 627, "hello.txt").unwrap();
        let decoded = decode(texts(&parts)).unwrap();

        assert_eq!(decoded.data, b"hello world");
        assert_eq!(decoded.file_name, "hello.txt");
        assert_eq!(decoded.total, 1);
        assert!(decoded.is_verified());
    }

    #[test]
    fn shuffled_parts_round_trip() {
        let data = sample(2000);
        let parts = encode_with_capacity(&data, 369, "random.bin").unwrap();
        assert!(parts.len() > 1);

        let mut blobs = texts(&parts);
        blobs.reverse();
        let mid = blobs.len() / 2;
        blobs.swap(0, mid);
        let decoded = decode(&blobs).unwrap();
        assert_eq!(decoded.data, data);
        assert!(decoded.is_verified());
    }

    #[test]
    fn concatenated_blob_with_noise_round_trips() {
        let data = sample(900);
        let parts = encode_with_capacity(&data, 455, "notes.md").unwrap();
        let mut blob = String::from("scanned on tuesday\n");
        for text in texts(&parts).iter().rev() {
            blob.push_str(text);
            blob.push_str("\r\n\r\n");
        }

        let decoded = decode([blob]).unwrap();
        assert_eq!(decoded.data, data);
        assert_eq!(decoded.file_name, "notes.md");
    }

    #[test]
    fn text_after_the_last_trailer_is_truncated_input() {
        let parts = encode_with_capacity(b"hello world", 627, "hello.txt").unwrap();
        let blob = format!("{}\nQUJDRA==", parts[0].text());

        assert!(matches!(
            decode([blob]).unwrap_err(),
            FrameError::TruncatedInput(_)
        ));
    }

    #[test]
    fn trailing_whitespace_is_not_residual_text() {
        let parts = encode_with_capacity(b"hello world", 627, "hello.txt").unwrap();
        let blob = format!("{}\n  \n", parts[0].text());
        assert!(decode([blob]).unwrap().is_verified());
    }

    #[test]
    fn dash_separated_scans_round_trip() {
        let data = sample(2000);
        let parts = encode_with_capacity(&data, 369, "random.bin").unwrap();
        let blob = texts(&parts).join("\n----------\n");

        let decoded = decode([blob]).unwrap();
        assert_eq!(decoded.data, data);
        assert!(decoded.is_verified());
    }

    #[test]
    fn spilled_checksum_part_round_trips() {
        let data = vec![0x5a; 120];
        let parts = encode_with_capacity(&data, 200, "f").unwrap();
        assert_eq!(parts.len(), 2);
        let decoded = decode(texts(&parts)).unwrap();
        assert_eq!(decoded.data, data);
        assert_eq!(decoded.total, 2);
    }

    #[test]
    fn empty_file_round_trips() {
        let parts = encode_with_capacity(b"", 627, "empty").unwrap();
        let decoded = decode(texts(&parts)).unwrap();
        assert!(decoded.data.is_empty());
        assert!(decoded.is_verified());
    }

    #[test]
    fn missing_part_is_named() {
        let data = sample(2000);
        let parts = encode_with_capacity(&data, 369, "random.bin").unwrap();
        let mut blobs = texts(&parts);
        blobs.remove(2);

        match decode(&blobs).unwrap_err() {
            FrameError::IncompleteTransfer { missing, total } => {
                assert_eq!(missing, vec![3]);
                assert_eq!(total, parts.len());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_checksum_is_malformed() {
        let parts = encode_with_capacity(b"hello world", 627, "hello.txt").unwrap();
        let mut part = parts[0].clone();
        part.checksum = None;
        assert!(matches!(
            decode([part.text()]).unwrap_err(),
            FrameError::MalformedChecksum(_)
        ));
    }

    #[test]
    fn conflicting_checksums_are_malformed() {
        let a = encode_with_capacity(b"one", 627, "a").unwrap();
        let b = encode_with_capacity(b"two", 627, "a").unwrap();
        let err = decode([a[0].text(), b[0].text()]).unwrap_err();
        assert!(matches!(err, FrameError::MalformedChecksum(_)));
    }

    #[test]
    fn repeated_scan_of_a_part_is_tolerated() {
        let data = sample(1500);
        let parts = encode_with_capacity(&data, 369, "dup.bin").unwrap();
        let mut blobs = texts(&parts);
        blobs.push(blobs[blobs.len() - 1].clone());
        blobs.push(blobs[0].clone());
        assert_eq!(decode(&blobs).unwrap().data, data);
    }

    #[test]
    fn mixed_encodings_are_inconsistent() {
        let small = encode_with_capacity(&sample(1000), 369, "x").unwrap();
        let large = encode_with_capacity(&sample(3000), 369, "x").unwrap();
        assert_ne!(small.len(), large.len());

        let mut blobs = vec![small[0].text()];
        blobs.push(large[1].text());
        blobs.push(small[small.len() - 1].text());
        assert!(matches!(
            decode(&blobs).unwrap_err(),
            FrameError::InconsistentTotal { .. }
        ));
    }

    #[test]
    fn tampered_payload_is_a_degraded_success() {
        // "d29y" -> "d29z" turns "wor" into "wos" and stays valid base64.
        let parts = encode_with_capacity(b"hello world", 627, "hello.txt").unwrap();
        let tampered = parts[0].text().replacen("d29y", "d29z", 1);

        let decoded = decode([tampered]).unwrap();
        assert!(!decoded.is_verified());
        assert!(matches!(decoded.integrity, Integrity::Mismatch { .. }));
        assert!(matches!(
            decoded.verified().unwrap_err(),
            FrameError::ChecksumMismatch { .. }
        ));
    }

    #[test]
    fn invalid_base64_is_reported() {
        let parts = encode_with_capacity(b"hello world", 627, "hello.txt").unwrap();
        let broken = parts[0].text().replacen("aGVs", "a*Vs", 1);
        assert!(matches!(
            decode([broken]).unwrap_err(),
            FrameError::InvalidEncoding(_)
        ));
    }

    #[test]
    fn truncated_part_is_reported() {
        let parts = encode_with_capacity(b"hello world", 627, "hello.txt").unwrap();
        let text = parts[0].text();
        let cut = text.replacen("\n---pprz:end---", "", 1);
        assert!(matches!(
            decode([cut]).unwrap_err(),
            FrameError::TruncatedInput(_)
        ));
    }

    #[test]
    fn trailer_without_header_is_malformed() {
        let parts = encode_with_capacity(b"hello world", 627, "hello.txt").unwrap();
        let headless = parts[0].text().replacen("---pprzv1:1/1:n:hello.txt---", "", 1);
        assert!(matches!(
            decode([headless]).unwrap_err(),
            FrameError::MalformedHeader { .. }
        ));
    }

    #[test]
    fn non_numeric_header_is_malformed() {
        let parts = encode_with_capacity(b"hello world", 627, "hello.txt").unwrap();
        let bad = parts[0].text().replacen("1/1:n:", "1/x:n:", 1);
        let err = decode([bad]).unwrap_err();
        assert!(err.to_string().contains("total \"x\" is not a number"));
    }

    #[test]
    fn survey_reports_missing_parts() {
        let data = sample(2500);
        let parts = encode_with_capacity(&data, 369, "big.bin").unwrap();
        let blobs: Vec<String> = texts(&parts)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 0)
            .map(|(_, text)| text)
            .collect();

        let survey = survey(&blobs).unwrap();
        assert_eq!(survey.total, Some(parts.len()));
        assert_eq!(survey.file_name.as_deref(), Some("big.bin"));
        assert!(survey.missing.contains(&2));
        assert!(!survey.missing.contains(&1));
        assert!(!survey.is_complete());
    }

    #[test]
    fn survey_tolerates_text_after_the_last_part() {
        let parts = encode_with_capacity(b"hello world", 627, "hello.txt").unwrap();
        let blob = format!("{}\nQUJDRA==", parts[0].text());

        let survey = survey([blob]).unwrap();
        assert!(survey.is_complete());
        assert_eq!(survey.received, vec![1]);
    }

    #[test]
    fn survey_of_nothing_is_empty() {
        let survey = survey(["no parts here"]).unwrap();
        assert_eq!(survey, Survey::default());
    }

    #[test]
    fn destination_refuses_existing_file() {
        let dir = unique_temp_dir("dest");
        std::fs::write(dir.join("taken.bin"), b"x").unwrap();

        let err = destination(&dir, "taken.bin").unwrap_err();
        assert!(matches!(err, FrameError::DestinationExists(_)));

        let free = destination(&dir, "free.bin").unwrap();
        assert_eq!(free, dir.join("free.bin"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn destination_keeps_only_final_component() {
        let dir = unique_temp_dir("traversal");
        assert_eq!(
            destination(&dir, "../../etc/passwd-copy").unwrap(),
            dir.join("passwd-copy")
        );
        assert!(matches!(
            destination(&dir, "..").unwrap_err(),
            FrameError::InvalidFileName { .. }
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
