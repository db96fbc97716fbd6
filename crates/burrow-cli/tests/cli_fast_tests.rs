//! Fast CLI tests using assert_cmd.
//! These run the binary without a container engine; everything they
//! touch finishes before the engine connection would happen.

#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but works fine

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A burrow command with config paths pointed into a scratch home.
fn burrow_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("burrow").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .current_dir(home.path());
    cmd
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    burrow_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Container environment manager"));
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    burrow_cmd(&home).arg("--version").assert().success();
}

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    burrow_cmd(&home).assert().failure().code(2);
}

#[test]
fn test_subcommand_help() {
    for subcmd in &["create", "start", "stop", "delete", "list", "config", "alias"] {
        let home = tempfile::tempdir().unwrap();
        burrow_cmd(&home)
            .args([subcmd, "--help"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty().not());
    }
}

#[test]
fn test_unknown_command_fails() {
    let home = tempfile::tempdir().unwrap();
    burrow_cmd(&home)
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown command"));
}

#[test]
fn test_prefix_shorthand_reaches_subcommand() {
    let home = tempfile::tempdir().unwrap();
    burrow_cmd(&home)
        .args(["cr", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Create an environment"));
}

#[test]
fn test_ambiguous_prefix_fails() {
    let home = tempfile::tempdir().unwrap();
    burrow_cmd(&home)
        .arg("st")
        .assert()
        .failure()
        .stderr(predicate::str::contains("start, stop"));
}

#[test]
fn test_config_set_get_rm_roundtrip() {
    let home = tempfile::tempdir().unwrap();
    burrow_cmd(&home)
        .args(["config", "set", "--user", "image.default", "alpine:3"])
        .assert()
        .success();
    burrow_cmd(&home)
        .args(["config", "get", "image.default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alpine:3"));
    burrow_cmd(&home)
        .args(["config", "rm", "--user", "image.default"])
        .assert()
        .success();
    burrow_cmd(&home)
        .args(["config", "get", "image.default"])
        .assert()
        .failure();
}

#[test]
fn test_config_show_succeeds() {
    let home = tempfile::tempdir().unwrap();
    burrow_cmd(&home).arg("config").assert().success();
}

#[test]
fn test_alias_shadows_ambiguous_prefix() {
    let home = tempfile::tempdir().unwrap();
    burrow_cmd(&home)
        .args(["alias", "--user", "st", "start"])
        .assert()
        .success()
        .stdout(predicate::str::contains("st = start"));

    // "st" alone would be ambiguous; the alias settles it.
    burrow_cmd(&home)
        .args(["st", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start an environment"));
}

#[test]
fn test_alias_rejects_builtin_name() {
    let home = tempfile::tempdir().unwrap();
    burrow_cmd(&home)
        .args(["alias", "--user", "list", "start"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("builtin"));
}

#[test]
fn test_alias_cycle_fails() {
    let home = tempfile::tempdir().unwrap();
    burrow_cmd(&home)
        .args(["alias", "--user", "a", "b"])
        .assert()
        .success();
    burrow_cmd(&home)
        .args(["alias", "--user", "b", "a"])
        .assert()
        .success();
    burrow_cmd(&home)
        .arg("a")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Alias cycle"));
}
