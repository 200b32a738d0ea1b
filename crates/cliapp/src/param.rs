//! Declarative parameter specifications.

use crate::error::{Error, Result};
use crate::values::Value;

/// What to do with a parameter when it shows up on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Store the string value (positional token, `--name value` or `--name=value`).
    #[default]
    StoreValue,
    /// `true` when the flag is present.
    StoreTrue,
    /// `false` when the flag is present.
    StoreFalse,
    /// Number of occurrences of the flag.
    Count,
    /// Print `<name> <version>` and exit without invoking the handler.
    Version,
}

impl Action {
    pub fn takes_value(self) -> bool {
        matches!(self, Self::StoreValue)
    }

    /// Value used when the parameter is absent and no default was configured.
    pub fn implicit_default(self) -> Value {
        match self {
            Self::StoreValue | Self::Version => Value::Absent,
            Self::StoreTrue => Value::Bool(false),
            Self::StoreFalse => Value::Bool(true),
            Self::Count => Value::Count(0),
        }
    }
}

/// One accepted input of an [`Application`](crate::Application).
///
/// A spec without short or long alias is positional.
///
/// ```rust,ignore
/// use cliapp::{Action, ParamSpec};
///
/// let foo = ParamSpec::positional("foo").help("Anything you like");
/// let bar = ParamSpec::from_flags(["-b", "--bar"])
///     .action(Action::StoreTrue)
///     .default_value(false)
///     .help("Turn on bar");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParamSpec {
    name: String,
    short: Option<String>,
    long: Option<String>,
    help: String,
    default: Option<Value>,
    action: Action,
    env: Option<String>,
    value_name: Option<String>,
}

impl ParamSpec {
    /// A positional parameter storing its token under `name`.
    pub fn positional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// An optional parameter with long alias `--<name>` (underscores become dashes).
    pub fn option(name: impl Into<String>) -> Self {
        let name = name.into();
        let long = normalize_long(&name.replace('_', "-"));
        Self {
            name,
            long: Some(long),
            ..Default::default()
        }
    }

    /// An optional parameter declared by its aliases, e.g. `["-b", "--bar"]`.
    ///
    /// The canonical name is the first long alias without dashes (inner `-`
    /// replaced by `_`), falling back to the first short alias.
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut spec = Self::default();
        for flag in flags {
            let flag = flag.as_ref().trim();
            if flag.starts_with("--") {
                if spec.long.is_none() {
                    spec.long = Some(normalize_long(flag));
                }
            } else if spec.short.is_none() {
                spec.short = Some(normalize_short(flag));
            }
        }
        spec.name = match (&spec.long, &spec.short) {
            (Some(long), _) => long.trim_start_matches('-').replace('-', "_"),
            (None, Some(short)) => short.trim_start_matches('-').to_string(),
            (None, None) => String::new(),
        };
        spec
    }

    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(normalize_short(&short.into()));
        self
    }

    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(normalize_long(&long.into()));
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Read the value from this environment key when argv does not provide it.
    pub fn env(mut self, key: impl Into<String>) -> Self {
        self.env = Some(key.into());
        self
    }

    pub fn value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_flag(&self) -> Option<&str> {
        self.short.as_deref()
    }

    pub fn long_flag(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn get_action(&self) -> Action {
        self.action
    }

    pub fn env_key(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn is_positional(&self) -> bool {
        self.short.is_none() && self.long.is_none()
    }

    /// A positional without a default must be supplied on argv.
    pub fn is_required(&self) -> bool {
        self.is_positional() && self.default.is_none()
    }

    pub fn resolved_default(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| self.action.implicit_default())
    }

    /// Name used in messages: `--long`, `-s`, or `<VALUE>` for positionals.
    pub fn display_name(&self) -> String {
        if self.is_positional() {
            return format!("<{}>", self.value_display());
        }
        self.long
            .clone()
            .or_else(|| self.short.clone())
            .unwrap_or_else(|| self.name.clone())
    }

    fn value_display(&self) -> String {
        self.value_name
            .clone()
            .unwrap_or_else(|| self.name.to_ascii_uppercase())
    }

    /// Checks that depend only on this declaration.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Configuration(
                "parameter name must not be empty".to_string(),
            ));
        }
        if self.is_positional() && self.action != Action::StoreValue {
            return Err(Error::Configuration(format!(
                "positional parameter '{}' must use the store-value action",
                self.name
            )));
        }
        if let Some(short) = &self.short {
            let mut chars = short.chars().skip(1);
            let valid = matches!((chars.next(), chars.next()), (Some(c), None) if c != '-');
            if !valid {
                return Err(Error::Configuration(format!(
                    "invalid short flag '{short}' for '{}'",
                    self.name
                )));
            }
        }
        if let Some(long) = &self.long {
            if long.len() <= 2 || long.contains('=') {
                return Err(Error::Configuration(format!(
                    "invalid long flag '{long}' for '{}'",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn normalize_short(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        trimmed.to_string()
    } else {
        format!("-{trimmed}")
    }
}

pub(crate) fn normalize_long(raw: &str) -> String {
    format!("--{}", raw.trim().trim_start_matches('-'))
}
