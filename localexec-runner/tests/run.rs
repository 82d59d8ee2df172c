#![cfg(unix)]

use localexec_runner::{
    DenyList, DenyListProbe, Exec, ExecError, ExecOptions, FailureKind, LocalExec, Primitive,
};
use pretty_assertions::assert_eq;

fn only(primitive: Primitive) -> LocalExec {
    LocalExec::new().with_probe(DenyListProbe::only(primitive))
}

fn expect_failure(result: Result<String, ExecError>) -> ExecError {
    match result {
        Err(error) => error,
        Ok(output) => panic!("expected failure, got output {output:?}"),
    }
}

#[test]
fn echo_hello_world_through_direct_capture() -> Result<(), ExecError> {
    let output = only(Primitive::Exec).run_args("echo", ["hello world"], ExecOptions::default())?;
    assert_eq!(output, "hello world");
    Ok(())
}

#[test]
fn every_strategy_returns_echo_output() -> Result<(), ExecError> {
    let expectations = [
        (Primitive::Exec, "hello world"),
        (Primitive::Passthru, "hello world\n"),
        (Primitive::Popen, "hello world\n"),
        (Primitive::ProcOpen, "hello world\n"),
        (Primitive::ShellExec, "hello world\n"),
    ];
    for (primitive, expected) in expectations {
        let output = only(primitive).run_args("echo", ["hello world"], ExecOptions::default())?;
        assert_eq!(output, expected, "strategy {primitive}");
    }
    Ok(())
}

#[test]
fn false_fails_with_status_one() {
    for primitive in [
        Primitive::Exec,
        Primitive::Passthru,
        Primitive::Popen,
        Primitive::ProcOpen,
    ] {
        let error = expect_failure(only(primitive).run_args(
            "false",
            Vec::<String>::new(),
            ExecOptions::default(),
        ));
        assert_eq!(error.kind(), FailureKind::Execution, "strategy {primitive}");
        assert_eq!(error.code(), 1, "strategy {primitive}");
        assert_eq!(error.command(), "false");
        assert!(!error.message().is_empty());
    }
}

#[test]
fn non_zero_exit_carries_status_and_output() {
    let script = "printf captured; exit 42";
    for primitive in [
        Primitive::Exec,
        Primitive::Passthru,
        Primitive::Popen,
        Primitive::ProcOpen,
    ] {
        let error = expect_failure(only(primitive).run_args(
            "sh",
            ["-c", script],
            ExecOptions::default(),
        ));
        assert_eq!(error.code(), 42, "strategy {primitive}");
        assert_eq!(error.message(), "captured", "strategy {primitive}");
    }
}

#[test]
fn shell_text_ignores_exit_status() -> Result<(), ExecError> {
    let output = only(Primitive::ShellExec).run_args(
        "sh",
        ["-c", "printf kept; exit 42"],
        ExecOptions::default(),
    )?;
    assert_eq!(output, "kept");
    Ok(())
}

#[test]
fn escaped_arguments_reach_the_program_intact() -> Result<(), ExecError> {
    let args = [
        "[%s]",
        "with space",
        "it's",
        "semi;colon",
        "$HOME",
        "a & b",
        "`uname`",
        "*",
        "",
    ];
    let output = only(Primitive::Exec).run_args("printf", args, ExecOptions::default())?;
    assert_eq!(
        output,
        "[with space][it's][semi;colon][$HOME][a & b][`uname`][*][]"
    );
    Ok(())
}

#[test]
fn unescaped_arguments_are_interpreted_by_the_shell() -> Result<(), ExecError> {
    let output = only(Primitive::Exec).run(
        "echo",
        [Some("one"), None, Some("two;"), Some("echo three")],
        ExecOptions::verbatim(),
    )?;
    assert_eq!(output, "one twothree");
    Ok(())
}

#[test]
fn null_arguments_are_not_passed() -> Result<(), ExecError> {
    let output = only(Primitive::Exec).run(
        "printf",
        [Some("[%s]"), None, Some("x"), None],
        ExecOptions::default(),
    )?;
    assert_eq!(output, "[x]");
    Ok(())
}

#[test]
fn all_primitives_denied_fails_without_spawning() {
    let deny_everything = DenyListProbe::new(DenyList::parse(
        "exec, passthru popen,proc_open\tshell_exec",
    ));
    let exec = LocalExec::new().with_probe(deny_everything);

    let error = expect_failure(exec.run_args(
        "touch",
        ["/this/should/never/exist"],
        ExecOptions::default(),
    ));
    assert_eq!(error.kind(), FailureKind::AllDisabled);
    assert_eq!(error.command(), "touch /this/should/never/exist");
    assert!(exec.available_primitives().is_empty());
}

#[test]
fn highest_ranked_available_strategy_wins() {
    // Only passthru and shell_exec remain; passthru reports the exit status.
    let exec = LocalExec::new().with_probe(DenyListProbe::new(DenyList::parse(
        "exec popen proc_open",
    )));
    assert_eq!(
        exec.available_primitives(),
        [Primitive::Passthru, Primitive::ShellExec]
    );

    let error = expect_failure(exec.run_args("false", Vec::<String>::new(), ExecOptions::default()));
    assert_eq!(error.code(), 1);
}

#[test]
fn missing_program_reports_shell_status() {
    let error = expect_failure(only(Primitive::ProcOpen).run_args(
        "definitely-not-a-real-program-1f6e",
        Vec::<String>::new(),
        ExecOptions::default(),
    ));
    assert_eq!(error.code(), 127);
    assert!(error.message().contains("not found"));
}
