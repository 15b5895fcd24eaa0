use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Crates whose events follow `--log-level`; everything else logs errors only.
const OWN_TARGETS: [&str; 2] = ["paperize", "paperize_frame"];

pub fn targets(level: LogLevel) -> Targets {
    OWN_TARGETS.iter().fold(
        Targets::new().with_default(LevelFilter::ERROR),
        |targets, target| targets.with_target(*target, level.as_filter()),
    )
}

/// Install the stderr subscriber. JSON events keep their target so codec
/// and command events can be told apart.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let (text, json) = match format {
        LogFormat::Text => (
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(false),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().with_writer(std::io::stderr).with_ansi(false)),
        ),
    };

    let _ = tracing_subscriber::registry()
        .with(targets(level))
        .with(text)
        .with(json)
        .try_init();
}
