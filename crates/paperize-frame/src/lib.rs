//! Capacity-bounded text part framing for printing files as QR codes.
//!
//! A file is base64-encoded and split into parts small enough for one
//! optical code each. Every part is self-describing:
//! - A header with the part index and total (part 1 also names the file)
//! - A slice of the base64 text, soft-wrapped at 80 columns
//! - A fixed trailer, so concatenated captures can be split again
//!
//! A SHA-256 checksum of the original file follows the last data part.
//! Decoding accepts parts in any order, concatenated or not.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod grammar;
pub mod part;
pub mod reader;
pub mod reassembly;
pub mod scanner;
pub mod writer;

#[cfg(test)]
mod proptests;

pub use config::{CapacityTable, DecoderConfig, EncoderConfig, ErrorCorrection};
pub use decoder::{decode, decode_with_config, destination, survey, DecodedFile, Integrity, Survey};
pub use encoder::{encode, encode_with_capacity, sha256_hex};
pub use error::{FrameError, Result};
pub use part::{Header, Part};
pub use reader::{read_blobs, PartReader};
pub use reassembly::Reassembler;
pub use scanner::{Scanner, Token};
pub use writer::PartWriter;
