//! Integration tests for the `consola` CLI binary.
//!
//! Argument parsing, help output, shell completions and the error paths
//! that resolve before any request reaches a backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `consola` binary with env isolation.
///
/// Clears all `CONSOLA_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn consola_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("consola");
    cmd.env("HOME", "/tmp/consola-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/consola-cli-test-nonexistent")
        .env_remove("CONSOLA_PROFILE")
        .env_remove("CONSOLA_BASE_URL")
        .env_remove("CONSOLA_TENANT")
        .env_remove("CONSOLA_LOCALE")
        .env_remove("CONSOLA_API_KEY")
        .env_remove("CONSOLA_OUTPUT")
        .env_remove("CONSOLA_TIMEOUT");
    cmd
}

/// Flags that resolve a backend without a config file. Nothing listens
/// on port 9, and no command below gets far enough to call it.
const OFFLINE: [&str; 4] = ["--base-url", "http://127.0.0.1:9", "--tenant", "acme"];

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = consola_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    consola_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("areas")
            .and(predicate::str::contains("licencas"))
            .and(predicate::str::contains("utilizadores"))
            .and(predicate::str::contains("summary")),
    );
}

#[test]
fn test_version_flag() {
    consola_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("consola"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    consola_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    consola_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = consola_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_list_without_config() {
    consola_cmd()
        .args(["areas", "list"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("config")
                .or(predicate::str::contains("Configuration")),
        );
}

#[test]
fn test_unknown_profile_is_reported() {
    consola_cmd()
        .args(["--profile", "staging", "areas", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_list_without_session_needs_login() {
    consola_cmd()
        .args(OFFLINE)
        .args(["clientes", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("consola login"));
}

#[test]
fn test_login_without_api_key() {
    consola_cmd()
        .args(OFFLINE)
        .args(["login", "--email", "ana@acme.pt", "--password-stdin"])
        .write_stdin("secret\n")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn test_page_zero_is_a_usage_error() {
    consola_cmd()
        .args(OFFLINE)
        .args(["areas", "list", "--page", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_create_needs_a_body() {
    consola_cmd()
        .args(OFFLINE)
        .args(["areas", "create"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_output_format() {
    let output = consola_cmd()
        .args(["--output", "invalid", "areas", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_config_show_no_config() {
    consola_cmd().args(["config", "show"]).assert().success();
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_entity_subcommands_exist() {
    consola_cmd()
        .args(["areas", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("browse"))
                .and(predicate::str::contains("delete-many"))
                .and(predicate::str::contains("count"))
                .and(predicate::str::contains("options")),
        );
}

#[test]
fn test_licencas_subcommands_exist() {
    consola_cmd()
        .args(["licencas", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("block"))
                .and(predicate::str::contains("unblock"))
                .and(predicate::str::contains("add-user")),
        );
}

#[test]
fn test_clientes_subcommands_exist() {
    consola_cmd()
        .args(["clientes", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("issue-key").and(predicate::str::contains("rotate-key")),
        );
}

#[test]
fn test_config_subcommands_exist() {
    consola_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("set-api-key")),
        );
}
