use std::io::Write;

use cliapp::{Action, Application, Error, ParamSpec};

fn app() -> Application {
    let mut app = Application::new("example");
    app.add_param(ParamSpec::positional("foo").help("Anything you like"))
        .expect("foo registers");
    app.add_param(
        ParamSpec::from_flags(["-b", "--bar"])
            .action(Action::StoreTrue)
            .default_value(false)
            .help("Turn on bar"),
    )
    .expect("bar registers");
    app
}

fn run(argv: &[&str]) -> (Result<i32, Error>, String) {
    let mut out = Vec::new();
    let result = app().run_with_output(argv.iter().copied(), &mut out, |ctx| {
        let foo = ctx.params().get_str("foo").unwrap_or_default().to_string();
        let bar = ctx.params().get_flag("bar");
        let out = ctx.out();
        writeln!(out, "foo={foo}")?;
        if bar {
            writeln!(out, "bar")?;
        }
        Ok(())
    });
    (result, String::from_utf8(out).expect("utf-8 output"))
}

#[test]
fn positional_only() {
    let (result, out) = run(&["hello"]);
    assert_eq!(result.unwrap(), 0);
    assert_eq!(out, "foo=hello\n");
}

#[test]
fn short_and_long_flag() {
    for flag in ["-b", "--bar"] {
        let (result, out) = run(&["hello", flag]);
        assert_eq!(result.unwrap(), 0);
        assert_eq!(out, "foo=hello\nbar\n");
    }
}

#[test]
fn empty_argv_is_missing_argument() {
    let (result, out) = run(&[]);
    let err = result.unwrap_err();
    assert!(matches!(err, Error::MissingArgument(_)), "got: {err:?}");
    assert_ne!(err.exit_code(), 0);
    assert!(out.is_empty());
}

#[test]
fn unknown_flag_is_rejected() {
    let (result, out) = run(&["hello", "--unknown"]);
    let err = result.unwrap_err();
    assert!(matches!(err, Error::UnrecognizedFlag(ref f) if f == "--unknown"));
    assert_ne!(err.exit_code(), 0);
    assert!(out.is_empty());
}

#[test]
fn fresh_applications_give_identical_output() {
    let first = run(&["hello", "-b"]);
    let second = run(&["hello", "-b"]);
    assert_eq!(first.0.unwrap(), second.0.unwrap());
    assert_eq!(first.1, second.1);
}

#[test]
fn registering_twice_fails_before_run() {
    let mut app = app();
    let err = app
        .add_param(ParamSpec::from_flags(["--bar"]).action(Action::StoreTrue))
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}
