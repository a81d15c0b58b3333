//! End-to-end tests for the `packrig` binary.

use std::fs;
use std::net::TcpListener;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const SWCRC: &str = r#"{ "jsc": { "parser": { "syntax": "typescript", "tsx": true }, "target": "es2020" } }"#;

/// Variables the binary reads; cleared so the host environment cannot leak in.
const ENV_INPUTS: [&str; 8] = [
    "PORT",
    "STAGE",
    "COUNTRY",
    "SENTRY_ORG",
    "SENTRY_DSN",
    "PACKRIG_ONLY_EMIT_CLIENT",
    "PACKRIG_ON_LAMBDA",
    "RUST_LOG",
];

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".swcrc"), SWCRC).unwrap();
    dir
}

fn packrig(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("packrig").unwrap();
    cmd.current_dir(root).arg("--no-color");
    for key in ENV_INPUTS {
        cmd.env_remove(key);
    }
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn development_build_prints_one_config() {
    let dir = project();
    let output = packrig(dir.path()).arg("build").output().unwrap();

    assert!(output.status.success());
    let config = stdout_json(&output);
    assert_eq!(config["name"], "client");
    assert_eq!(config["mode"], "development");
    assert_eq!(config["devServer"]["hot"], true);
}

#[test]
fn production_build_prints_client_and_server() {
    let dir = project();
    let output = packrig(dir.path())
        .args(["build", "--mode", "production"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let configs = stdout_json(&output);
    let configs = configs.as_array().unwrap();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[1]["target"], "node");
    assert_eq!(configs[1]["output"]["filename"], "[name].mjs");
}

#[test]
fn only_client_flag_and_project_file_combine() {
    let dir = project();
    fs::write(dir.path().join("packrig.toml"), "on_lambda = true\n").unwrap();

    let output = packrig(dir.path())
        .args(["build", "--mode", "production", "--only-client"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let config = stdout_json(&output);
    assert_eq!(config["target"], "node");
    assert!(config.get("devServer").is_none());
}

#[test]
fn missing_settings_file_fails() {
    let dir = TempDir::new().unwrap();
    packrig(dir.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains(".swcrc"));
}

#[test]
fn missing_explicit_project_file_fails() {
    let dir = project();
    packrig(dir.path())
        .args(["build", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn out_flag_writes_a_file() {
    let dir = project();
    packrig(dir.path())
        .args(["build", "--out", "build/rspack.json"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("build/rspack.json")).unwrap())
            .unwrap();
    assert_eq!(written["name"], "client");
}

#[test]
fn env_file_values_are_defined() {
    let dir = project();
    fs::write(dir.path().join(".env"), "API_URL=https://api.local\n").unwrap();

    let output = packrig(dir.path())
        .args(["build", "--mode", "production", "--only-client"])
        .output()
        .unwrap();

    let config = stdout_json(&output);
    let define = config["plugins"]
        .as_array()
        .unwrap()
        .iter()
        .find(|plugin| plugin["plugin"] == "DefinePlugin")
        .unwrap();
    assert_eq!(define["options"]["process.env.API_URL"], "\"https://api.local\"");
}

#[test]
fn library_command_emits_mjs_output() {
    let dir = project();
    let output = packrig(dir.path())
        .args(["library", "src/handler.ts"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let config = stdout_json(&output);
    assert_eq!(config["output"]["filename"], "handler.mjs");
    assert_eq!(config["target"], "node");
}

#[test]
fn busy_port_declined_exits_with_one() {
    let listener = match TcpListener::bind(("0.0.0.0", 0)) {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("Skipping busy_port_declined_exits_with_one: unable to bind socket ({err})");
            return;
        }
    };
    let port = listener.local_addr().unwrap().port();
    let dir = project();

    packrig(dir.path())
        .env("PORT", port.to_string())
        .arg("build")
        .write_stdin("n\n")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(format!("Port {port} is in use")));
}

#[test]
fn busy_port_accepted_with_yes() {
    let listener = match TcpListener::bind(("0.0.0.0", 0)) {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("Skipping busy_port_accepted_with_yes: unable to bind socket ({err})");
            return;
        }
    };
    let port = listener.local_addr().unwrap().port();
    let dir = project();

    let output = packrig(dir.path())
        .env("PORT", port.to_string())
        .args(["build", "--yes"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let config = stdout_json(&output);
    let chosen = config["devServer"]["port"].as_u64().unwrap();
    assert!(chosen > u64::from(port));
}

#[test]
fn env_file_port_starts_negotiation() {
    let listener = match TcpListener::bind(("0.0.0.0", 0)) {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("Skipping env_file_port_starts_negotiation: unable to bind socket ({err})");
            return;
        }
    };
    let port = listener.local_addr().unwrap().port();
    let dir = project();
    fs::write(dir.path().join(".env"), format!("PORT={port}\n")).unwrap();

    let output = packrig(dir.path())
        .args(["build", "--yes"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let config = stdout_json(&output);
    let chosen = config["devServer"]["port"].as_u64().unwrap();
    assert!(chosen > u64::from(port));

    let define = config["plugins"]
        .as_array()
        .unwrap()
        .iter()
        .find(|plugin| plugin["plugin"] == "DefinePlugin")
        .unwrap();
    assert_eq!(define["options"]["process.env.PORT"], format!("\"{chosen}\""));
}

#[cfg(unix)]
#[test]
fn bundler_exit_code_is_propagated() {
    let dir = project();
    packrig(dir.path())
        .args(["build", "--out", "rspack.json", "--", "sh", "-c"])
        .arg(r#"test -f "$PACKRIG_CONFIG" && exit 3"#)
        .assert()
        .code(3);
}

#[test]
fn bundler_without_out_is_rejected() {
    let dir = project();
    packrig(dir.path())
        .args(["build", "--", "rspack", "build"])
        .assert()
        .failure();
}
