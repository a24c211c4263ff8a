//! End-to-end tests of the `prose` binary against scripts on disk.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;

fn prose(args: &[&str], cwd: &Path, stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_prose"))
        .args(args)
        .current_dir(cwd)
        .env_remove("PROSE_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|err| panic!("failed to start prose: {err}"));
    if let Some(mut input) = child.stdin.take() {
        input
            .write_all(stdin.as_bytes())
            .unwrap_or_else(|err| panic!("failed to write stdin: {err}"));
    }
    child
        .wait_with_output()
        .unwrap_or_else(|err| panic!("prose did not finish: {err}"))
}

fn write(dir: &Path, name: &str, source: &str) {
    fs::write(dir.join(name), source).unwrap_or_else(|err| panic!("cannot write {name}: {err}"));
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap_or_else(|err| panic!("cannot create temp dir: {err}"))
}

#[test]
fn runs_a_script() {
    let dir = temp_dir();
    write(
        dir.path(),
        "main.prose",
        "function greet(string who) -> string return \"hello, \" + who; end
         writeln greet(\"world\");",
    );
    let output = prose(&["main.prose"], dir.path(), "");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "hello, world\n");
}

#[test]
fn script_reads_from_stdin() {
    let dir = temp_dir();
    write(
        dir.path(),
        "echo.prose",
        "create integer variable n; read n \"n? \"; writeln n * 2;",
    );
    let output = prose(&["echo.prose"], dir.path(), "21\n");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "n? 42\n");
}

#[test]
fn imports_resolve_against_the_script_directory() {
    let dir = temp_dir();
    let project = dir.path().join("project");
    fs::create_dir_all(&project).unwrap_or_else(|err| panic!("cannot create dirs: {err}"));
    write(&project, "main.prose", "import util; writeln util.twice(4);");
    write(
        &project,
        "util.prose",
        "import constants; function twice(integer n) -> integer return constants.scale * n; end",
    );
    write(&project, "constants.prose", "create integer constant scale to 2;");

    // Run from the temp root so the base directory must come from the path.
    let output = prose(&["project/main.prose"], dir.path(), "");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "8\n");
}

#[test]
fn runtime_errors_render_a_diagnostic() {
    let dir = temp_dir();
    write(dir.path(), "boom.prose", "writeln \"before\";\nwriteln 1 / 0;\n");
    let output = prose(&["boom.prose"], dir.path(), "");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "before\n");
    let err = stderr(&output);
    assert!(err.contains("error[E3005]: division by zero"), "{err}");
    assert!(err.contains("boom.prose:2:11"), "{err}");
}

#[test]
fn module_errors_point_into_the_module() {
    let dir = temp_dir();
    write(dir.path(), "main.prose", "import broken;");
    write(dir.path(), "broken.prose", "create integer variable x;\nset x to x / 0;\n");
    let output = prose(&["main.prose"], dir.path(), "");
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("broken.prose:2:12"), "{err}");
    assert!(err.contains("raised in module `broken`"), "{err}");
}

#[test]
fn parse_errors_stop_before_running() {
    let dir = temp_dir();
    write(dir.path(), "bad.prose", "writeln \"ran\";\ncreate integer;\n");
    let output = prose(&["bad.prose"], dir.path(), "");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
    assert!(stderr(&output).contains("bad.prose:2:"), "{}", stderr(&output));
}

#[test]
fn check_flag_reports_static_errors() {
    let dir = temp_dir();
    write(
        dir.path(),
        "typed.prose",
        "writeln \"ran\";\ncreate integer variable x to \"text\";\n",
    );
    let unchecked = prose(&["typed.prose"], dir.path(), "");
    assert_eq!(stdout(&unchecked), "ran\n");
    assert_eq!(unchecked.status.code(), Some(1));

    let checked = prose(&["--check", "typed.prose"], dir.path(), "");
    assert_eq!(checked.status.code(), Some(1));
    assert_eq!(stdout(&checked), "");
    assert!(stderr(&checked).contains("error[E2"), "{}", stderr(&checked));
}

#[test]
fn rejects_other_extensions() {
    let dir = temp_dir();
    write(dir.path(), "script.txt", "writeln 1;");
    let output = prose(&["script.txt"], dir.path(), "");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("not a .prose file"));
}

#[test]
fn missing_file_is_reported() {
    let dir = temp_dir();
    let output = prose(&["absent.prose"], dir.path(), "");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("cannot read"));
}

#[test]
fn repl_keeps_state_across_lines() {
    let dir = temp_dir();
    let session = "create integer variable x to 2;\nwriteln x * 3;\nexit\nwriteln 99;\n";
    let output = prose(&[], dir.path(), session);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains('6'), "{out}");
    assert!(!out.contains("99"), "{out}");
}
