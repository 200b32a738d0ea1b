//! Small command-line application helper.
//!
//! Declare parameters on an [`Application`], then hand it argv and a handler:
//! - positional parameters are matched by declaration order
//! - flags (`-b`, `--bar`) are matched by alias regardless of order
//! - the handler runs once with an [`AppContext`] exposing the output stream
//!   and the [`ParsedValues`]
//!
//! Help rendering, subcommands and configuration files are not provided.

pub mod app;
pub mod error;
pub mod log;
pub mod param;
pub mod parse;
pub mod values;

pub use app::{AppContext, Application, IntoExitCode};
pub use error::{Error, Result};
pub use param::{Action, ParamSpec};
pub use parse::{ParseOutcome, parse};
pub use values::{ParsedValues, Value};
