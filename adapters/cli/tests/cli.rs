use std::{
    io::Write,
    process::{Command, Output, Stdio},
};

fn block_escape(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_block-escape"))
        .args(args)
        .output()
        .expect("failed to invoke block-escape")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout is utf-8")
}

#[test]
fn lists_builtin_levels_as_solvable() {
    let output = block_escape(&["list"]);
    assert!(output.status.success());
    let listing = stdout(&output);
    assert!(listing.contains("First Steps"));
    assert!(listing.contains("Key Master"));
    assert!(!listing.contains("unsolvable"));
}

#[test]
fn solve_prints_removal_order() {
    let output = block_escape(&["solve", "--level", "4"]);
    assert!(output.status.success());
    assert!(stdout(&output).trim_start().starts_with('#'));
}

#[test]
fn generated_share_code_can_be_solved() {
    let output = block_escape(&["generate", "--seed", "11", "--lock-pair", "--format", "code"]);
    assert!(output.status.success());
    let code = stdout(&output);
    assert!(code.starts_with("blocks:v1:"));

    let solved = block_escape(&["solve", "--code", code.trim()]);
    assert!(solved.status.success());
}

#[test]
fn malformed_share_code_fails() {
    let output = block_escape(&["solve", "--code", "blocks:v1:2:???"]);
    assert!(!output.status.success());
}

#[test]
fn play_reads_commands_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_block-escape"))
        .args(["play", "--level", "2"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to start block-escape play");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"blocks\nhint\nfly away\nquit\n")
        .expect("failed to write commands");

    let output = child.wait_with_output().expect("play exits");
    assert!(output.status.success());
    let transcript = stdout(&output);
    assert!(transcript.contains("== level 2 =="));
    assert!(transcript.contains("try #"));
    assert!(transcript.contains("unknown command"));
    assert!(transcript.contains("final score 0"));
}
