use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use cliapp::{Action, AppContext, Application, ParamSpec};

const APP_NAME: &str = "helloworld";

fn build_app() -> cliapp::Result<Application> {
    let mut app = Application::new(APP_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .with_logging()
        .env_vars(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }));

    app.add_param(ParamSpec::positional("foo").help("Anything you like"))?;
    app.add_param(
        ParamSpec::from_flags(["-b", "--bar"])
            .action(Action::StoreTrue)
            .default_value(false)
            .help("Turn on bar"),
    )?;

    Ok(app)
}

fn hello(ctx: &mut AppContext<'_>) -> Result<()> {
    let foo = ctx.params().get_str("foo").unwrap_or_default().to_string();
    let bar = ctx.params().get_flag("bar");
    tracing::debug!(%foo, bar, "running");

    let out = ctx.out();
    writeln!(out, "This is a command line application")?;
    writeln!(out, "It has some parameters")?;
    writeln!(out, "Here's foo: {foo}")?;
    if bar {
        writeln!(out, "We got bar")?;
    }
    Ok(())
}

/// Process arguments after the program name; non-UTF-8 tokens are usage errors.
fn argv() -> cliapp::Result<Vec<String>> {
    std::env::args_os()
        .skip(1)
        .map(|arg| {
            arg.into_string()
                .map_err(|raw| cliapp::Error::InvalidUtf8(raw.to_string_lossy().into_owned()))
        })
        .collect()
}

fn main() -> ExitCode {
    let result = argv().and_then(|argv| build_app()?.run(argv, hello));
    match result {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            eprintln!("{APP_NAME}: error: {err}");
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}
