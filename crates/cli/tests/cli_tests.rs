//! CLI integration tests

use std::process::Command;

fn hpe() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hpe"));
    cmd.env_remove("HPE_API_URL");
    cmd
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = hpe()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Home Price Estimator"), "Should show app name");
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("locations"), "Should show locations command");
    assert!(stdout.contains("health"), "Should show health command");
    assert!(stdout.contains("reload"), "Should show reload command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = hpe()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("hpe"), "Should show binary name");
}

/// Test predict subcommand help
#[test]
fn test_predict_help() {
    let output = hpe()
        .args(["predict", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Predict help should succeed");
    assert!(stdout.contains("--location"), "Should show location option");
    assert!(stdout.contains("--sqft"), "Should show sqft option");
    assert!(stdout.contains("--bhk"), "Should show bhk option");
    assert!(stdout.contains("--bath"), "Should show bath option");
}

/// Test that predict requires all property fields
#[test]
fn test_predict_missing_arguments() {
    let output = hpe()
        .args(["predict", "--location", "kalhalli"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Missing arguments should fail");
    assert!(stderr.contains("--sqft"), "Should name the missing option");
}

/// Test that a non-numeric area is rejected locally
#[test]
fn test_predict_rejects_non_numeric_sqft() {
    let output = hpe()
        .args([
            "predict", "--location", "kalhalli", "--sqft", "big", "--bhk", "2", "--bath", "2",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Non-numeric sqft should fail");
}

/// Test that the output format is validated
#[test]
fn test_invalid_format() {
    let output = hpe()
        .args(["--format", "yaml", "health"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Unknown format should fail");
    assert!(stderr.contains("table") && stderr.contains("json"));
}

/// Test that an invalid API URL is reported before any request
#[test]
fn test_invalid_api_url() {
    let output = hpe()
        .args(["--api-url", "not a url", "health"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Invalid URL should fail");
    assert!(stderr.contains("Invalid API URL"));
}

/// Test that an unreachable server is reported
#[test]
fn test_unreachable_server() {
    let output = hpe()
        .args(["--api-url", "http://127.0.0.1:9", "health"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Unreachable server should fail");
    assert!(stderr.contains("Failed to send request"));
}
