//! Turning argv into [`ParsedValues`].

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::param::{Action, ParamSpec};
use crate::values::{ParsedValues, Value};

#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Values(ParsedValues),
    /// A `Version` flag was present.
    Version,
}

struct State {
    values: ParsedValues,
    version: bool,
    error: Option<Error>,
}

impl State {
    fn fail(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn record_flag(&mut self, spec: &ParamSpec) {
        let name = spec.name();
        match spec.get_action() {
            Action::StoreTrue => self.values.insert(name, Value::Bool(true)),
            Action::StoreFalse => self.values.insert(name, Value::Bool(false)),
            Action::Count => {
                let n = self.values.get_count(name);
                self.values.insert(name, Value::Count(n.saturating_add(1)));
            }
            Action::Version => self.version = true,
            // value-taking flags go through `record_value`
            Action::StoreValue => return,
        }
        self.values.mark_explicit(name);
    }

    fn record_value(&mut self, spec: &ParamSpec, value: &str) {
        self.values.insert(spec.name(), Value::from(value));
        self.values.mark_explicit(spec.name());
    }
}

/// Whether a token would be read as a flag rather than a value.
fn looks_like_flag(token: &str) -> bool {
    token != "-" && token.starts_with('-')
}

fn env_lookup<'e>(env: &'e [(String, String)], key: &str) -> Option<&'e str> {
    env.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Parse `argv` against `specs`.
///
/// - `--long`, `--long=value`, `--long value`
/// - `-s`, `-s value`, `-svalue`, combined `-abc`
/// - `-` is a positional value, `--` ends flag parsing
/// - a value-taking flag never swallows a following flag token
///
/// Value precedence for value-taking parameters is argv, then `env`, then the
/// declared default. The first parse error wins, except that a version flag
/// anywhere on argv yields [`ParseOutcome::Version`].
pub fn parse<S: AsRef<str>>(
    specs: &[ParamSpec],
    argv: &[S],
    env: &[(String, String)],
) -> Result<ParseOutcome> {
    tracing::debug!(tokens = argv.len(), params = specs.len(), "parsing arguments");

    let mut long_map: HashMap<&str, usize> = HashMap::new();
    let mut short_map: HashMap<&str, usize> = HashMap::new();
    let mut positional_defs: Vec<usize> = Vec::new();
    for (idx, spec) in specs.iter().enumerate() {
        if spec.is_positional() {
            positional_defs.push(idx);
            continue;
        }
        if let Some(short) = spec.short_flag() {
            short_map.insert(short, idx);
        }
        if let Some(long) = spec.long_flag() {
            long_map.insert(long, idx);
        }
    }

    let mut st = State {
        values: ParsedValues::default(),
        version: false,
        error: None,
    };
    let mut positionals: Vec<&str> = Vec::new();

    let mut i = 0usize;
    let mut after_separator = false;
    while i < argv.len() {
        let arg = argv[i].as_ref();

        if after_separator || arg == "-" || !arg.starts_with('-') {
            positionals.push(arg);
            i += 1;
            continue;
        }

        if arg == "--" {
            after_separator = true;
            i += 1;
            continue;
        }

        if arg.starts_with("--") {
            // --key=value
            if let Some((flag, value)) = arg.split_once('=') {
                match long_map.get(flag).map(|&idx| &specs[idx]) {
                    Some(spec) if spec.get_action().takes_value() => st.record_value(spec, value),
                    Some(_) => st.fail(Error::UnexpectedValue(flag.to_string())),
                    None => st.fail(Error::UnrecognizedFlag(flag.to_string())),
                }
                i += 1;
                continue;
            }

            let Some(spec) = long_map.get(arg).map(|&idx| &specs[idx]) else {
                st.fail(Error::UnrecognizedFlag(arg.to_string()));
                i += 1;
                continue;
            };
            if spec.get_action().takes_value() {
                let Some(value) = argv.get(i + 1).filter(|v| !looks_like_flag(v.as_ref())) else {
                    st.fail(Error::MissingValue(arg.to_string()));
                    i += 1;
                    continue;
                };
                st.record_value(spec, value.as_ref());
                i += 2;
            } else {
                st.record_flag(spec);
                i += 1;
            }
            continue;
        }

        // Short flags, possibly combined; a value-taking flag ends the group.
        let mut consumed_next = false;
        let group = &arg[1..];
        for (pos, c) in group.char_indices() {
            let flag = format!("-{c}");
            let Some(spec) = short_map.get(flag.as_str()).map(|&idx| &specs[idx]) else {
                st.fail(Error::UnrecognizedFlag(flag));
                continue;
            };
            if !spec.get_action().takes_value() {
                st.record_flag(spec);
                continue;
            }
            let attached = &group[pos + c.len_utf8()..];
            if !attached.is_empty() {
                st.record_value(spec, attached);
            } else if let Some(value) = argv.get(i + 1).filter(|v| !looks_like_flag(v.as_ref())) {
                st.record_value(spec, value.as_ref());
                consumed_next = true;
            } else {
                st.fail(Error::MissingValue(flag));
            }
            break;
        }
        i += if consumed_next { 2 } else { 1 };
    }

    // Assign positional args by declaration order.
    let mut pos_iter = positionals.into_iter();
    for &idx in &positional_defs {
        match pos_iter.next() {
            Some(v) => st.record_value(&specs[idx], v),
            None => break,
        }
    }
    if let Some(extra) = pos_iter.next() {
        st.fail(Error::UnexpectedArgument(extra.to_string()));
    }

    if st.version {
        tracing::debug!("version requested");
        return Ok(ParseOutcome::Version);
    }
    if let Some(err) = st.error {
        return Err(err);
    }

    let missing: Vec<String> = specs
        .iter()
        .filter(|s| s.is_required() && !st.values.is_explicit(s.name()))
        .map(ParamSpec::display_name)
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingArgument(missing.join(", ")));
    }

    // Apply env/defaults for everything argv left unset.
    for spec in specs {
        if st.values.contains(spec.name()) {
            continue;
        }
        let from_env = spec
            .env_key()
            .filter(|_| spec.get_action().takes_value())
            .and_then(|key| env_lookup(env, key));
        let value = match from_env {
            Some(v) => Value::from(v),
            None => spec.resolved_default(),
        };
        st.values.insert(spec.name(), value);
    }

    tracing::debug!(values = ?st.values, "arguments resolved");
    Ok(ParseOutcome::Values(st.values))
}
