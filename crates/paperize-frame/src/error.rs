use std::path::PathBuf;

/// Errors that can occur while encoding or decoding parts.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The mandatory framing of a part does not fit the capacity.
    #[error("part {index} needs {overhead} characters of framing but capacity is {capacity}")]
    CapacityExceeded {
        index: usize,
        overhead: usize,
        capacity: usize,
    },

    /// The declared part total never matched the produced part count.
    #[error(
        "part count did not settle after {rounds} rounds (declared {declared}, produced {produced})"
    )]
    NoConvergence {
        rounds: usize,
        declared: usize,
        produced: usize,
    },

    /// The file name cannot be carried by (or restored from) a header.
    #[error("invalid file name {name:?}: {reason}")]
    InvalidFileName { name: String, reason: &'static str },

    /// The checksum marker is missing, unterminated or unparsable.
    #[error("malformed checksum marker: {0}")]
    MalformedChecksum(String),

    /// The input ends inside a part or marker.
    #[error("truncated input: {0}")]
    TruncatedInput(String),

    /// A part header is missing fields or carries invalid values.
    #[error("malformed header {header:?}: {reason}")]
    MalformedHeader { header: String, reason: String },

    /// Parts disagree on the total part count.
    #[error("inconsistent part total: expected {expected}, part {index} declares {found}")]
    InconsistentTotal {
        expected: usize,
        found: usize,
        index: usize,
    },

    /// Not every part of the file was supplied.
    #[error("incomplete transfer: missing part(s) {} of {total}", join_indices(.missing))]
    IncompleteTransfer { missing: Vec<usize>, total: usize },

    /// The reassembled payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// The reassembled content does not hash to the carried digest.
    #[error("checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// The restore destination already exists.
    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// Captured input is not UTF-8 text.
    #[error("input is not valid UTF-8 text: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),

    /// An I/O error occurred while reading blobs or writing parts.
    #[error("part I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, FrameError>;
