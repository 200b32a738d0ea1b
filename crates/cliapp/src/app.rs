use std::io::{self, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::log;
use crate::param::{Action, ParamSpec};
use crate::parse::{ParseOutcome, parse};
use crate::values::ParsedValues;

/// Conversion from a handler's return value to a process exit status.
pub trait IntoExitCode {
    fn into_exit_code(self) -> i32;
}

impl IntoExitCode for () {
    fn into_exit_code(self) -> i32 {
        0
    }
}

impl IntoExitCode for i32 {
    fn into_exit_code(self) -> i32 {
        self
    }
}

impl IntoExitCode for bool {
    fn into_exit_code(self) -> i32 {
        if self { 0 } else { 1 }
    }
}

/// What a handler gets to see: the output stream and the parsed values.
pub struct AppContext<'a> {
    name: &'a str,
    out: &'a mut dyn Write,
    params: &'a ParsedValues,
}

impl<'a> AppContext<'a> {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn params(&self) -> &ParsedValues {
        self.params
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }
}

/// A command-line application: parameter specs plus a name and version.
///
/// `run` consumes the application, so it executes at most once.
///
/// ```rust,ignore
/// use std::io::Write;
/// use cliapp::{Action, Application, ParamSpec};
///
/// let mut app = Application::new("greet");
/// app.add_param(ParamSpec::positional("who"))?;
/// app.add_param(ParamSpec::from_flags(["-l", "--loud"]).action(Action::StoreTrue))?;
/// let code = app.run(std::env::args().skip(1), |ctx| {
///     let who = ctx.params().get_str("who").unwrap_or_default().to_string();
///     writeln!(ctx.out(), "hello {who}")?;
///     Ok(())
/// })?;
/// ```
#[derive(Debug, Clone)]
pub struct Application {
    name: String,
    version: Option<String>,
    params: Vec<ParamSpec>,
    env: Vec<(String, String)>,
    logging: bool,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            params: Vec::new(),
            env: Vec::new(),
            logging: false,
        }
    }

    /// Set the version and accept `-V/--version` unless those flags are taken.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Accept `-v/-q/-s/-l` and install a `tracing` subscriber before the handler runs.
    pub fn with_logging(mut self) -> Self {
        self.logging = true;
        self
    }

    /// Environment snapshot used for parameters declared with `ParamSpec::env`.
    pub fn env_vars<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env = vars.into_iter().collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Register a parameter.
    pub fn add_param(&mut self, spec: ParamSpec) -> Result<()> {
        spec.validate()?;
        if let Some(msg) = conflict(&self.params, &spec) {
            return Err(Error::Configuration(msg));
        }
        tracing::trace!(name = spec.name(), "registered parameter");
        self.params.push(spec);
        Ok(())
    }

    /// Parse `argv` and invoke `handler`, writing to stdout.
    pub fn run<I, S, F, R>(self, argv: I, handler: F) -> Result<i32>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce(&mut AppContext<'_>) -> anyhow::Result<R>,
        R: IntoExitCode,
    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(argv, &mut out, handler)
    }

    /// Same as [`run`](Self::run), writing to `out`.
    pub fn run_with_output<I, S, W, F, R>(self, argv: I, out: &mut W, handler: F) -> Result<i32>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        W: Write,
        F: FnOnce(&mut AppContext<'_>) -> anyhow::Result<R>,
        R: IntoExitCode,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let specs = self.effective_params();

        let values = match parse(&specs, argv.as_slice(), &self.env)? {
            ParseOutcome::Values(values) => values,
            ParseOutcome::Version => {
                match &self.version {
                    Some(v) => writeln!(out, "{} {}", self.name, v.trim())?,
                    None => writeln!(out, "{}", self.name)?,
                }
                out.flush()?;
                return Ok(0);
            }
        };

        if self.logging {
            let logfile = values.get_str(log::LOGFILE).map(Path::new);
            log::init(log::level_from(&values), logfile)?;
        }

        tracing::debug!(app = %self.name, "invoking handler");
        let mut ctx = AppContext {
            name: &self.name,
            out: &mut *out,
            params: &values,
        };
        let code = handler(&mut ctx)?.into_exit_code();
        out.flush()?;
        tracing::debug!(app = %self.name, code, "handler finished");
        Ok(code)
    }

    /// User parameters followed by the built-in ones that do not clash with them.
    fn effective_params(&self) -> Vec<ParamSpec> {
        let mut builtins: Vec<ParamSpec> = Vec::new();
        if self.version.is_some() {
            builtins.push(
                ParamSpec::from_flags(["-V", "--version"])
                    .action(Action::Version)
                    .help("show program's version number and exit"),
            );
        }
        if self.logging {
            builtins.extend(log::verbosity_params());
        }

        let mut out = self.params.clone();
        for builtin in builtins {
            if conflict(&out, &builtin).is_none() {
                out.push(builtin);
            }
        }
        out
    }
}

/// Describe why `spec` cannot join `existing`, if it can't.
fn conflict(existing: &[ParamSpec], spec: &ParamSpec) -> Option<String> {
    for other in existing {
        if other.name() == spec.name() {
            return Some(format!("parameter '{}' is already registered", spec.name()));
        }
        let same_short = spec.short_flag().is_some() && spec.short_flag() == other.short_flag();
        let same_long = spec.long_flag().is_some() && spec.long_flag() == other.long_flag();
        if same_short || same_long {
            let flag = if same_short { spec.short_flag() } else { spec.long_flag() };
            return Some(format!(
                "flag {} maps to both '{}' and '{}'",
                flag.unwrap_or_default(),
                other.name(),
                spec.name()
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Value;

    fn app() -> Application {
        let mut app = Application::new("demo").version("1.2.3");
        app.add_param(ParamSpec::positional("foo")).unwrap();
        app.add_param(ParamSpec::from_flags(["-b", "--bar"]).action(Action::StoreTrue))
            .unwrap();
        app
    }

    #[test]
    fn duplicate_name_is_a_configuration_error() {
        let mut app = app();
        let err = app.add_param(ParamSpec::positional("foo")).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("already registered")));
        assert_eq!(app.params().len(), 2);
    }

    #[test]
    fn duplicate_alias_is_a_configuration_error() {
        let mut app = app();
        let err = app
            .add_param(ParamSpec::option("baz").short("b"))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("-b")));
    }

    #[test]
    fn handler_sees_values_and_writes_output() {
        let mut out = Vec::new();
        let code = app()
            .run_with_output(["hi", "-b"], &mut out, |ctx| {
                assert_eq!(ctx.name(), "demo");
                assert_eq!(ctx.params().get("bar"), Some(&Value::Bool(true)));
                let foo = ctx.params().get_str("foo").unwrap_or_default().to_string();
                writeln!(ctx.out(), "foo={foo}")?;
                Ok(())
            })
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "foo=hi\n");
    }

    #[test]
    fn handler_status_is_returned() {
        let mut out = Vec::new();
        let code = app()
            .run_with_output(["hi"], &mut out, |_| Ok(3))
            .unwrap();
        assert_eq!(code, 3);

        let code = app()
            .run_with_output(["hi"], &mut out, |_| Ok(false))
            .unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn handler_error_is_propagated() {
        let mut out = Vec::new();
        let err = app()
            .run_with_output(["hi"], &mut out, |_| -> anyhow::Result<()> {
                anyhow::bail!("handler failed")
            })
            .unwrap_err();
        assert!(matches!(err, Error::Handler(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn parse_errors_skip_the_handler() {
        let mut out = Vec::new();
        let mut called = false;
        let err = app()
            .run_with_output(Vec::<String>::new(), &mut out, |_| {
                called = true;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, Error::MissingArgument(_)));
        assert!(!called);
        assert!(out.is_empty());
    }

    #[test]
    fn version_flag_prints_and_skips_handler() {
        let mut out = Vec::new();
        let code = app()
            .run_with_output(["--version"], &mut out, |_| -> anyhow::Result<()> {
                panic!("handler must not run")
            })
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "demo 1.2.3\n");
    }

    #[test]
    fn builtins_yield_to_user_flags() {
        let mut app = Application::new("demo").version("1.0").with_logging();
        app.add_param(ParamSpec::from_flags(["-v", "--value"])).unwrap();
        let specs = app.effective_params();
        let names: Vec<&str> = specs.iter().map(ParamSpec::name).collect();
        assert_eq!(names, ["value", "version", "quiet", "silent", "logfile"]);
    }

    #[test]
    fn unopenable_logfile_fails_before_handler() {
        let path = std::env::temp_dir()
            .join("cliapp-no-such-dir")
            .join(format!("{}", std::process::id()))
            .join("app.log");
        let mut app = Application::new("demo").with_logging();
        app.add_param(ParamSpec::positional("foo")).unwrap();

        let mut out = Vec::new();
        let mut called = false;
        let err = app
            .run_with_output(
                ["-l".to_string(), path.display().to_string(), "hi".to_string()],
                &mut out,
                |_| {
                    called = true;
                    Ok(())
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)), "got: {err:?}");
        assert_eq!(err.exit_code(), 1);
        assert!(!called);
    }

    #[test]
    fn env_snapshot_feeds_parameters() {
        let mut app = Application::new("demo")
            .env_vars([("DEMO_NAME".to_string(), "from-env".to_string())]);
        app.add_param(ParamSpec::option("name").env("DEMO_NAME"))
            .unwrap();
        let mut out = Vec::new();
        app.run_with_output(Vec::<String>::new(), &mut out, |ctx| {
            assert_eq!(ctx.params().get_str("name"), Some("from-env"));
            assert!(!ctx.params().is_explicit("name"));
            Ok(())
        })
        .unwrap();
    }
}
