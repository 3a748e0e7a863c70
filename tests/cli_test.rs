//! Integration tests for the buildbatch CLI
//!
//! Backends are `sh -c` scripts, so these tests only run on Unix.

#![cfg(unix)]

mod common;

use common::{stdout_json, TestProject, SAMPLE_SETTINGS};

#[test]
fn test_run_builds_active_definitions() {
    let project = TestProject::new();
    project.create_file("buildbatch.toml", SAMPLE_SETTINGS);

    let output = project.run(&["--json", "run", "--tick-ms", "1"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let result = stdout_json(&output);
    assert_eq!(result["succeeded"], 1);
    assert_eq!(result["failed"], 0);
    assert_eq!(result["skipped"], 1);
    assert_eq!(result["canceled"], false);
    assert_eq!(result["outcomes"][0]["name"], "Linux");
    assert_eq!(result["outcomes"][1]["status"], "skipped");

    assert_eq!(project.read_file("Builds/Linux/game.txt"), "RELEASE_LOGS");
    assert!(!project.file_exists("Builds/Android"));
}

#[test]
fn test_run_text_summary() {
    let project = TestProject::new();
    project.create_file("buildbatch.toml", SAMPLE_SETTINGS);

    let output = project.run(&["run", "--tick-ms", "1"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 succeeded, 0 failed"));
    assert!(stdout.contains("Android (inactive)"));
}

#[test]
fn test_failed_build_does_not_stop_the_batch() {
    let project = TestProject::new();
    project.create_file(
        "batch.toml",
        r#"
[[build]]
name = "Broken"
platform = "linux64"
output_directory = "Builds/Broken"

[[build]]
name = "Fine"
platform = "windows64"
output_directory = "Builds/Fine"

[backend]
build = ["sh", "-c", "if [ \"$BUILDBATCH_PLATFORM\" = linux64 ]; then echo 'error CS0103: missing' >&2; exit 1; fi"]
"#,
    );

    let output = project.run(&["--json", "run", "-s", "batch.toml", "--tick-ms", "1"]);
    assert!(!output.status.success());

    let result = stdout_json(&output);
    assert_eq!(result["succeeded"], 1);
    assert_eq!(result["failed"], 1);
    assert_eq!(result["outcomes"][0]["error_count"], 1);
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 of 2 builds failed"));
}

#[test]
fn test_cancelled_build_aborts_the_batch() {
    let project = TestProject::new();
    project.create_file(
        "buildbatch.toml",
        r#"
[[build]]
name = "First"
platform = "linux64"
output_directory = "Builds/First"

[[build]]
name = "Second"
platform = "windows64"
output_directory = "Builds/Second"

[[build]]
name = "Third"
platform = "macos"
output_directory = "Builds/Third"

[backend]
build = ["sh", "-c", "[ \"$BUILDBATCH_PLATFORM\" = windows64 ] && exit 42; exit 0"]
cancel_exit_code = 42
"#,
    );

    let output = project.run(&["--json", "run", "--tick-ms", "1"]);
    assert!(!output.status.success());

    let result = stdout_json(&output);
    assert_eq!(result["canceled"], true);
    assert_eq!(result["succeeded"], 1);
    assert_eq!(result["failed"], 0);
    assert_eq!(result["outcomes"].as_array().map(Vec::len), Some(2));
    assert!(!project.file_exists("Builds/Third"));
}

#[test]
fn test_run_only_selected_definition() {
    let project = TestProject::new();
    project.create_file(
        "buildbatch.toml",
        &SAMPLE_SETTINGS.replace("active = false", "active = true"),
    );

    let output = project.run(&["--json", "run", "--tick-ms", "1", "--only", "Linux"]);
    assert!(output.status.success());

    let result = stdout_json(&output);
    assert_eq!(result["succeeded"], 1);
    assert_eq!(result["skipped"], 1);
}

#[test]
fn test_run_only_unknown_definition_fails() {
    let project = TestProject::new();
    project.create_file("buildbatch.toml", SAMPLE_SETTINGS);

    let output = project.run(&["run", "--only", "Switch"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No build definition named 'Switch'"));
}

#[test]
fn test_run_without_build_command_fails() {
    let project = TestProject::new();
    project.create_file(
        "buildbatch.toml",
        r#"
[[build]]
name = "Linux"
platform = "linux64"
output_directory = "Builds/Linux"
"#,
    );

    let output = project.run(&["run"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No build command configured"));
}

#[test]
fn test_missing_settings_file() {
    let project = TestProject::new();
    let output = project.run(&["run"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Settings file not found"));
}

#[test]
fn test_json_settings_with_env_substitution() {
    let project = TestProject::new();
    project.create_file(
        "batch.json",
        r#"{
            "build": [
                { "name": "Linux", "platform": "linux64", "output_directory": "${BB_OUT}/Linux" }
            ],
            "backend": { "build": ["true"] }
        }"#,
    );

    let output = project.run_with_env(
        &["--json", "run", "-s", "batch.json", "--tick-ms", "1"],
        &[("BB_OUT", "Staging")],
    );
    assert!(output.status.success());
    assert!(project.path().join("Staging/Linux").is_dir());
}

#[test]
fn test_check_reports_invalid_definitions() {
    let project = TestProject::new();
    project.create_file(
        "buildbatch.toml",
        r#"
[[build]]
name = "Switch"
platform = "switch"
output_directory = "Builds/Switch"

[[build]]
name = "Linux"
platform = "linux64"
output_directory = "Builds/Linux"

[backend]
build = ["true"]
"#,
    );

    let output = project.run(&["--json", "check"]);
    assert!(!output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["valid"], false);
    assert_eq!(report["to_build"], serde_json::json!(["Linux"]));
    assert!(report["errors"][0]
        .as_str()
        .is_some_and(|e| e.contains("app_id")));
    assert!(!project.file_exists("Builds/Linux"));
}

#[test]
fn test_check_valid_batch() {
    let project = TestProject::new();
    project.create_file("buildbatch.toml", SAMPLE_SETTINGS);

    let output = project.run(&["check"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("All active definitions are valid"));
    assert!(stdout.contains("• Linux"));
}

#[test]
fn test_list_json() {
    let project = TestProject::new();
    project.create_file("buildbatch.toml", SAMPLE_SETTINGS);

    let output = project.run(&["--json", "list"]);
    assert!(output.status.success());

    let definitions = stdout_json(&output);
    let definitions = definitions.as_array().expect("array of definitions");
    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions[0]["platform"], "linux64");
    assert_eq!(definitions[1]["active"], false);
}

#[test]
fn test_global_config_signing_identity_is_used() {
    let project = TestProject::new();
    std::fs::write(
        project.config_dir.path().join("config.toml"),
        "[run]\nsigning_identity = \"Studio\"\n\n[tools]\nsigning = \"true\"\n",
    )
    .unwrap();
    project.create_file(
        "buildbatch.toml",
        r#"
[[build]]
name = "Mac"
platform = "macos"
output_directory = "Builds/Mac"
output_filename = "Game.app"
sign = true

[backend]
build = ["true"]
"#,
    );

    let output = project.run(&["--json", "run", "--tick-ms", "1"]);
    assert!(output.status.success());

    let result = stdout_json(&output);
    assert_eq!(result["succeeded"], 1);
    assert!(result["outcomes"][0].get("signing_error").is_none());
}
