use std::fs;
use std::path::{Path, PathBuf};

use paperize_frame::{encode, EncoderConfig, ErrorCorrection, Part, PartWriter};
use serde::Serialize;
use tracing::info;

use crate::cmd::PaperArgs;
use crate::document;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_fields, print_json, print_pretty, OutputFormat};

#[derive(Serialize)]
struct PaperOutput {
    file_name: String,
    bytes: usize,
    parts: usize,
    capacity: usize,
    level: Option<char>,
    out_dir: String,
    document: String,
}

pub fn run(args: PaperArgs, format: OutputFormat) -> CliResult<i32> {
    let file_name = embedded_name(&args.file)?;
    let data = fs::read(&args.file)
        .map_err(|err| io_error(&format!("failed to read {}", args.file.display()), err))?;

    let level = ErrorCorrection::from(args.level);
    let (config, level) = match args.capacity {
        Some(capacity) => (EncoderConfig::with_capacity(capacity), None),
        None => (EncoderConfig::for_level(level), Some(level.letter())),
    };

    let parts = encode(&data, &config, &file_name).map_err(|err| frame_error("encode failed", err))?;
    info!(
        file = %file_name,
        bytes = data.len(),
        parts = parts.len(),
        capacity = config.capacity,
        "file split into parts"
    );

    if args.stdout {
        let mut writer = PartWriter::new(std::io::stdout().lock());
        writer
            .write_parts(&parts)
            .map_err(|err| frame_error("failed to write parts", err))?;
        return Ok(SUCCESS);
    }

    let out_dir = args
        .out_dir
        .unwrap_or_else(|| PathBuf::from(format!("{file_name}_paperized")));
    let document = write_outputs(&out_dir, &file_name, level, config.capacity, &parts)?;

    let out = PaperOutput {
        file_name,
        bytes: data.len(),
        parts: parts.len(),
        capacity: config.capacity,
        level,
        out_dir: out_dir.display().to_string(),
        document: document.display().to_string(),
    };
    print_summary(&out, &parts, format);
    Ok(SUCCESS)
}

/// Only the base name goes into part 1; directories stay on this machine.
fn embedded_name(path: &Path) -> CliResult<String> {
    let name = path
        .file_name()
        .ok_or_else(|| CliError::new(USAGE, format!("{} is not a file", path.display())))?;
    name.to_str().map(str::to_string).ok_or_else(|| {
        CliError::new(
            USAGE,
            format!("file name of {} is not valid UTF-8", path.display()),
        )
    })
}

fn write_outputs(
    out_dir: &Path,
    file_name: &str,
    level: Option<char>,
    capacity: usize,
    parts: &[Part],
) -> CliResult<PathBuf> {
    fs::create_dir_all(out_dir)
        .map_err(|err| io_error(&format!("failed to create {}", out_dir.display()), err))?;

    for part in parts {
        let path = out_dir.join(document::part_file_name(part.index));
        fs::write(&path, part.text())
            .map_err(|err| io_error(&format!("failed to write {}", path.display()), err))?;
    }

    let path = out_dir.join(document::document_file_name(file_name));
    let text = document::render(file_name, level, capacity, parts);
    fs::write(&path, text)
        .map_err(|err| io_error(&format!("failed to write {}", path.display()), err))?;
    info!(path = %path.display(), "document written");

    Ok(path)
}

fn print_summary(out: &PaperOutput, parts: &[Part], format: OutputFormat) {
    let level = out
        .level
        .map(|l| l.to_string())
        .unwrap_or_else(|| "custom".to_string());

    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => print_fields(&[
            ("file", out.file_name.clone()),
            ("bytes", out.bytes.to_string()),
            ("parts", out.parts.to_string()),
            ("level", level),
            ("capacity", out.capacity.to_string()),
            ("out_dir", out.out_dir.clone()),
            ("document", out.document.clone()),
        ]),
        OutputFormat::Pretty => print_pretty(&[
            ("file", out.file_name.clone()),
            ("bytes", out.bytes.to_string()),
            ("parts", out.parts.to_string()),
            ("level", level),
            ("document", out.document.clone()),
        ]),
        OutputFormat::Raw => {
            for part in parts {
                println!("{part}\n");
            }
        }
    }
}
