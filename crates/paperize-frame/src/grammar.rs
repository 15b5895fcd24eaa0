//! Literal tokens of the part format.
//!
//! ```text
//! ---pprzv1:1/{total}:n:{file_name}---\n   header of part 1
//! ---pprzv1:{index}/{total}---\n           header of every later part
//! \n---pprz:end---                         trailer of every part
//! \n---sha256sum:{hex_digest}---           checksum, once, after the last data part
//! ```
//!
//! Line breaks are cosmetic: the decoder strips them before scanning, so the
//! scanner matches the tokens below without their `\n`.

/// Delimiter that opens and closes every token.
pub const DELIMITER: &str = "---";

/// Format tag carried by every header.
pub const VERSION_TAG: &str = "pprzv1";

/// Opening of a header, line breaks removed.
pub const HEADER_OPEN: &str = "---pprzv1:";

/// Field tag introducing the file name on part 1.
pub const NAME_FIELD: &str = "n";

/// Trailer token, line breaks removed.
pub const TRAILER_TOKEN: &str = "---pprz:end---";

/// Trailer as rendered at the end of every part.
pub const PART_TRAILER: &str = "\n---pprz:end---";

/// Opening of the checksum marker, line breaks removed.
pub const CHECKSUM_OPEN: &str = "---sha256sum:";

/// Hex characters in a SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Column at which payload text is soft-wrapped.
pub const WRAP_WIDTH: usize = 80;

/// Render the header of a part. Only part 1 carries the file name.
pub fn render_header(index: usize, total: usize, file_name: Option<&str>) -> String {
    match file_name {
        Some(name) => format!("{HEADER_OPEN}{index}/{total}:{NAME_FIELD}:{name}{DELIMITER}\n"),
        None => format!("{HEADER_OPEN}{index}/{total}{DELIMITER}\n"),
    }
}

/// Render the checksum marker for a lowercase hex digest.
pub fn render_checksum(digest: &str) -> String {
    format!("\n{CHECKSUM_OPEN}{digest}{DELIMITER}")
}

/// Length in characters, which is what capacity is measured in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Returns true for the line-break characters the decoder discards.
pub fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}
