use assert_cmd::Command;
use predicates::prelude::*;

fn relman() -> Command {
    Command::cargo_bin("relman").unwrap()
}

#[test]
fn help_lists_all_targets() {
    relman()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("server"))
        .stdout(predicate::str::contains("cli"))
        .stdout(predicate::str::contains("installer"));
}

#[test]
fn version_flag_works() {
    relman().arg("--version").assert().success();
}

#[test]
fn subcommand_is_required() {
    relman().assert().failure();
}

// The workflow is prompt-driven end to end; without a terminal on stdin it
// must refuse to start rather than hang on the first question.
#[test]
fn refuses_to_run_without_a_terminal() {
    relman()
        .arg("server")
        .assert()
        .failure()
        .stderr(predicate::str::contains("interactive terminal"));
}

#[test]
fn unknown_subcommand_is_rejected() {
    relman().arg("deploy").assert().failure();
}
