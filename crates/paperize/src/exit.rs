use std::fmt;
use std::io;

use paperize_frame::FrameError;

// Process exit codes; the 6x range follows sysexits.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const CHECKSUM_MISMATCH: i32 = 61;
pub const USAGE: i32 = 64;
pub const DESTINATION_EXISTS: i32 = 73;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::AlreadyExists => DESTINATION_EXISTS,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::CapacityExceeded { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        FrameError::DestinationExists(_) => {
            CliError::new(DESTINATION_EXISTS, format!("{context}: {err}"))
        }
        FrameError::ChecksumMismatch { .. } => {
            CliError::new(CHECKSUM_MISMATCH, format!("{context}: {err}"))
        }
        FrameError::NoConvergence { .. } => CliError::new(INTERNAL, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}
