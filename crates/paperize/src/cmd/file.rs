use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use paperize_frame::{decode, destination, FrameError, Integrity};
use serde::Serialize;
use tracing::{info, warn};

use crate::cmd::{read_inputs, FileArgs};
use crate::exit::{
    frame_error, io_error, CliError, CliResult, CHECKSUM_MISMATCH, DESTINATION_EXISTS, SUCCESS,
};
use crate::output::{print_fields, print_json, print_pretty, OutputFormat};

#[derive(Serialize)]
struct RestoreOutput {
    file_name: String,
    path: String,
    bytes: usize,
    parts: usize,
    checksum: &'static str,
    expected_digest: String,
    actual_digest: String,
}

pub fn run(args: FileArgs, format: OutputFormat) -> CliResult<i32> {
    let blobs = read_inputs(&args.files)?;
    let decoded = decode(&blobs).map_err(|err| frame_error("restore failed", err))?;

    let path = destination(&args.out_dir, &decoded.file_name)
        .map_err(|err| frame_error("restore refused", err))?;
    write_new(&path, &decoded.data)?;
    info!(path = %path.display(), bytes = decoded.data.len(), "file restored");

    let (checksum, expected, actual, code) = match &decoded.integrity {
        Integrity::Verified { digest } => ("ok", digest.clone(), digest.clone(), SUCCESS),
        Integrity::Mismatch { expected, actual } => {
            warn!(path = %path.display(), "restored file does not match its checksum");
            ("mismatch", expected.clone(), actual.clone(), CHECKSUM_MISMATCH)
        }
    };

    let out = RestoreOutput {
        file_name: decoded.file_name,
        path: path.display().to_string(),
        bytes: decoded.data.len(),
        parts: decoded.total,
        checksum,
        expected_digest: expected,
        actual_digest: actual,
    };
    print_summary(&out, format);

    if code == CHECKSUM_MISMATCH {
        eprintln!(
            "warning: {} was written, but {}",
            out.path,
            FrameError::ChecksumMismatch {
                expected: out.expected_digest.clone(),
                actual: out.actual_digest.clone(),
            }
        );
    }
    Ok(code)
}

/// Create `path` and write `data`, refusing to replace anything that
/// appeared since the destination check.
fn write_new(path: &Path, data: &[u8]) -> CliResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| match err.kind() {
            ErrorKind::AlreadyExists => CliError::new(
                DESTINATION_EXISTS,
                format!(
                    "restore refused: {}",
                    FrameError::DestinationExists(path.to_path_buf())
                ),
            ),
            _ => io_error(&format!("failed to create {}", path.display()), err),
        })?;

    file.write_all(data)
        .and_then(|()| file.flush())
        .map_err(|err| io_error(&format!("failed to write {}", path.display()), err))
}

fn print_summary(out: &RestoreOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => print_fields(&[
            ("file", out.file_name.clone()),
            ("path", out.path.clone()),
            ("bytes", out.bytes.to_string()),
            ("parts", out.parts.to_string()),
            ("checksum", out.checksum.to_string()),
            ("sha256", out.actual_digest.clone()),
        ]),
        OutputFormat::Pretty => print_pretty(&[
            ("file", out.file_name.clone()),
            ("path", out.path.clone()),
            ("bytes", out.bytes.to_string()),
            ("checksum", out.checksum.to_string()),
        ]),
        OutputFormat::Raw => println!("{}", out.path),
    }
}
