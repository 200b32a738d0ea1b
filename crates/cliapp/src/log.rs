//! Verbosity flags and `tracing` subscriber setup.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::Result;
use crate::param::{Action, ParamSpec};
use crate::values::ParsedValues;

pub const VERBOSE: &str = "verbose";
pub const QUIET: &str = "quiet";
pub const SILENT: &str = "silent";
pub const LOGFILE: &str = "logfile";

/// Level used when neither `-v` nor `-q` is given.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::WARN;

const LEVELS: [LevelFilter; 5] = [
    LevelFilter::TRACE,
    LevelFilter::DEBUG,
    LevelFilter::INFO,
    LevelFilter::WARN,
    LevelFilter::ERROR,
];

/// `-v/--verbose`, `-q/--quiet`, `-s/--silent` and `-l/--logfile`.
pub fn verbosity_params() -> [ParamSpec; 4] {
    [
        ParamSpec::from_flags(["-v", "--verbose"])
            .action(Action::Count)
            .help("raise the verbosity"),
        ParamSpec::from_flags(["-q", "--quiet"])
            .action(Action::Count)
            .help("decrease the verbosity"),
        ParamSpec::from_flags(["-s", "--silent"])
            .action(Action::StoreTrue)
            .help("only log errors"),
        ParamSpec::from_flags(["-l", "--logfile"])
            .value_name("FILE")
            .help("write log messages to FILE instead of stderr"),
    ]
}

/// Resolve the log level from the verbosity flags.
///
/// Each `-q` moves one step towards ERROR, each `-v` one step towards TRACE,
/// clamped at both ends. `--silent` always yields ERROR.
pub fn level_from(values: &ParsedValues) -> LevelFilter {
    if values.get_flag(SILENT) {
        return LevelFilter::ERROR;
    }
    let base = LEVELS
        .iter()
        .position(|l| *l == DEFAULT_LEVEL)
        .unwrap_or(LEVELS.len() - 1) as i64;
    let shift = i64::from(values.get_count(QUIET)) - i64::from(values.get_count(VERBOSE));
    let idx = (base + shift).clamp(0, LEVELS.len() as i64 - 1) as usize;
    LEVELS[idx]
}

/// Open `path` for appending log lines, creating it if needed.
pub fn open_logfile(path: &Path) -> Result<File> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}

/// Install a subscriber at `level`, writing to `logfile` or stderr.
///
/// `RUST_LOG` takes precedence over `level` when set. Only the first call in
/// a process installs a subscriber; the log file is opened either way.
pub fn init(level: LevelFilter, logfile: Option<&Path>) -> Result<()> {
    let writer = match logfile {
        Some(path) => BoxMakeWriter::new(Mutex::new(open_logfile(path)?)),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    let installed = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(logfile.is_none())
        .with_writer(writer)
        .compact()
        .try_init();
    if let Err(err) = installed {
        tracing::debug!("subscriber already installed: {err}");
    }
    Ok(())
}
