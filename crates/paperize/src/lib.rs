//! Convert a binary file to printable QR code text parts and back.
//!
//! paperize splits a file into capacity-bounded, self-describing text parts
//! that can each be rendered as one QR code, and restores the file from the
//! scanned text, detecting missing parts and corruption.
//!
//! # Crate Structure
//!
//! - [`frame`]: part framing: encoder, decoder, scanner and stream adapters
//!
//! The `paperize` binary (behind the `cli` feature) drives both directions.

/// Re-export frame types.
pub mod frame {
    pub use paperize_frame::*;
}

pub use paperize_frame::{decode, encode, DecodedFile, EncoderConfig, ErrorCorrection, Part};
