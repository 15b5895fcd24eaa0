//! Printable Markdown document listing every part of one file.

use std::fmt::{self, Write};

use paperize_frame::Part;

/// Name of the text file holding part `index`.
pub fn part_file_name(index: usize) -> String {
    format!("qr_part_{index}.txt")
}

/// Name of the document composed for `file_name`.
pub fn document_file_name(file_name: &str) -> String {
    format!("{file_name}_paperized.md")
}

/// Compose the document: title, restore instructions, then one section per
/// part with its text in a fenced block ready for a QR renderer.
pub fn render(file_name: &str, level: Option<char>, capacity: usize, parts: &[Part]) -> String {
    let mut doc = String::new();
    // Writing into a String cannot fail.
    let _ = compose(&mut doc, file_name, level, capacity, parts);
    doc
}

fn compose(
    doc: &mut String,
    file_name: &str,
    level: Option<char>,
    capacity: usize,
    parts: &[Part],
) -> fmt::Result {
    let total = parts.len();

    writeln!(doc, "# Paperized Backup")?;
    writeln!(doc, "_paperize {}_", env!("CARGO_PKG_VERSION"))?;
    writeln!(doc)?;
    writeln!(doc, "## Backup of file `{file_name}`")?;
    writeln!(
        doc,
        "Scan the QR codes and paste the text into one or more plain text files."
    )?;
    writeln!(doc)?;
    writeln!(doc, "Then run `paperize file FILE [FILE ...]` to restore the file.")?;
    writeln!(doc)?;
    writeln!(
        doc,
        "Without the tool: drop the pprz header and end lines, the sha256sum line \
         and all line breaks, then base64-decode the rest."
    )?;
    writeln!(doc)?;
    match level {
        Some(letter) => writeln!(
            doc,
            "Error correction level {letter}, {capacity} characters per code, {total} code(s)."
        )?,
        None => writeln!(doc, "{capacity} characters per code, {total} code(s).")?,
    }

    for part in parts {
        writeln!(doc)?;
        writeln!(doc, "### File `{file_name}` part {}/{}", part.index, part.total)?;
        writeln!(doc)?;
        writeln!(doc, "```text")?;
        writeln!(doc, "{part}")?;
        writeln!(doc, "```")?;
    }
    Ok(())
}
