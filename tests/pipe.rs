//! Piped execution against real shell commands.

#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::rc::Rc;

use cmdtree::{
    Actions, ArgDefs, CliDef, CommandError, Console, ConsoleOptions, Context, compile,
};

fn fixture() -> Console<String> {
    let mut actions: Actions<String> = Actions::default();
    actions.insert(
        "show_all".to_string(),
        Rc::new(|ctx: &mut Context<String>| {
            writeln!(ctx.out(), "kitchen on")?;
            writeln!(ctx.out(), "porch off")?;
            Ok(())
        }),
    );
    actions.insert(
        "fail".to_string(),
        Rc::new(|_ctx: &mut Context<String>| {
            Err(CommandError::Failed("backend unavailable".to_string()))
        }),
    );

    let def = CliDef::map([
        (
            "show|:Show system state",
            CliDef::map([("<none>:Show all lights", CliDef::action("show_all"))]),
        ),
        ("broken|:Always fails", CliDef::action("fail")),
    ]);

    let arg_defs: ArgDefs<String> = ArgDefs::default();
    Console::new(&def, &arg_defs, &actions, ConsoleOptions::default()).unwrap()
}

#[test]
fn captured_output_reaches_the_shell_command() {
    let console = fixture();
    let dir = tempfile::tempdir().unwrap();
    let sink = dir.path().join("captured.txt");

    let mut ctx = Context::buffered();
    console
        .run_line(&mut ctx, &format!("show | cat > {}", sink.display()))
        .unwrap();

    assert_eq!(
        fs::read_to_string(&sink).unwrap(),
        "kitchen on\nporch off\n"
    );
    // Everything went to the child; nothing leaked into the console sink.
    assert_eq!(ctx.take_output(), b"");
}

#[test]
fn shell_command_line_is_bound_in_the_context() {
    let console = fixture();
    let mut ctx = Context::buffered();
    console
        .run_line(&mut ctx, "show | cat > /dev/null")
        .unwrap();
    assert_eq!(ctx.text_arg("shell-cmd"), Some("cat > /dev/null"));
}

#[test]
fn unknown_shell_command_is_reported_before_running_anything() {
    let console = fixture();
    let mut ctx = Context::buffered();
    let err = console
        .run_line(&mut ctx, "show | definitely-not-a-real-command-p9q")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Shell command 'definitely-not-a-real-command-p9q' not found"
    );
}

#[test]
fn nonzero_exit_status_is_not_an_error() {
    let console = fixture();
    let mut ctx = Context::buffered();
    console
        .run_line(&mut ctx, "show | cat > /dev/null && exit 3")
        .unwrap();
}

#[test]
fn inner_command_failure_skips_the_shell_command() {
    let console = fixture();
    let dir = tempfile::tempdir().unwrap();
    let sink = dir.path().join("untouched.txt");

    let mut ctx = Context::buffered();
    let err = console
        .run_line(&mut ctx, &format!("broken | cat > {}", sink.display()))
        .unwrap_err();
    assert_eq!(err.to_string(), "backend unavailable");
    assert!(!sink.exists());
}

#[test]
fn compiled_tree_can_pipe_without_a_console() {
    let mut actions: Actions<String> = Actions::default();
    actions.insert(
        "go".to_string(),
        Rc::new(|ctx: &mut Context<String>| {
            writeln!(ctx.out(), "payload")?;
            Ok(())
        }),
    );
    let arg_defs: ArgDefs<String> = ArgDefs::default();
    let def = CliDef::map([("run|:Run it", CliDef::action("go"))]);
    let root = compile(&def, &arg_defs, &actions).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let sink = dir.path().join("out.txt");
    let mut ctx = Context::buffered();
    root.execute(&mut ctx, Some(&format!("run | cat > {}", sink.display())))
        .unwrap();
    assert_eq!(fs::read_to_string(&sink).unwrap(), "payload\n");
}
