use thiserror::Error;

/// Exit status used for command-line usage errors (argparse convention).
pub const USAGE_EXIT_CODE: i32 = 2;

#[derive(Error, Debug)]
pub enum Error {
    /// Duplicate or invalid parameter declaration, raised before `run`.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("missing required argument: {0}")]
    MissingArgument(String),

    #[error("unrecognized flag: {0}")]
    UnrecognizedFlag(String),

    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("flag does not take a value: {0}")]
    UnexpectedValue(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    /// An argv token that is not valid UTF-8, shown lossily.
    #[error("invalid UTF-8 in argument: {0}")]
    InvalidUtf8(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl Error {
    /// Whether the error stems from how the program was invoked.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument(_)
                | Self::UnrecognizedFlag(_)
                | Self::MissingValue(_)
                | Self::UnexpectedValue(_)
                | Self::UnexpectedArgument(_)
                | Self::InvalidUtf8(_)
        )
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_usage() { USAGE_EXIT_CODE } else { 1 }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
