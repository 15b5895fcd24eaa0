use clap::{Args, Subcommand, ValueEnum};
use std::fs::File;
use std::path::PathBuf;

use paperize_frame::{ErrorCorrection, PartReader};
use tracing::debug;

use crate::exit::{frame_error, io_error, CliResult};
use crate::output::OutputFormat;

pub mod file;
pub mod inspect;
pub mod paper;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a file into QR code text parts.
    Paper(PaperArgs),
    /// Restore a file from scanned part text.
    File(FileArgs),
    /// Report which parts a set of scans contains.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Paper(args) => paper::run(args, format),
        Command::File(args) => file::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// QR error-correction level as typed on the command line.
#[derive(Copy, Clone, Debug, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum LevelArg {
    L,
    M,
    Q,
    H,
}

impl From<LevelArg> for ErrorCorrection {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::L => ErrorCorrection::Low,
            LevelArg::M => ErrorCorrection::Medium,
            LevelArg::Q => ErrorCorrection::Quartile,
            LevelArg::H => ErrorCorrection::High,
        }
    }
}

#[derive(Args, Debug)]
pub struct PaperArgs {
    /// File to split.
    pub file: PathBuf,
    /// QR error-correction level; picks the characters per part.
    #[arg(
        long,
        short = 'l',
        value_enum,
        default_value = "M",
        env = "PAPERIZE_LEVEL",
        ignore_case = true
    )]
    pub level: LevelArg,
    /// Characters per part, overriding the level's capacity.
    #[arg(long, value_name = "CHARS")]
    pub capacity: Option<usize>,
    /// Directory for part files and the document.
    /// Default: `{file name}_paperized` in the working directory.
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
    /// Write the parts to stdout instead of files.
    #[arg(long, conflicts_with = "out_dir")]
    pub stdout: bool,
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Text files holding scanned parts, in any order (`-` reads stdin).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Directory the restored file is written to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Text files holding scanned parts (`-` reads stdin).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read every input as one text blob, in the order given.
pub(crate) fn read_inputs(files: &[PathBuf]) -> CliResult<Vec<String>> {
    let mut blobs = Vec::with_capacity(files.len());
    for path in files {
        let read = if path.as_os_str() == "-" {
            PartReader::new(std::io::stdin().lock()).read_blob()
        } else {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed to open {}", path.display()), err))?;
            PartReader::new(file).read_blob()
        };
        let blob = read.map_err(|err| frame_error(&format!("failed to read {}", path.display()), err))?;

        debug!(path = %path.display(), bytes = blob.len(), "read scan input");
        blobs.push(blob);
    }
    Ok(blobs)
}
