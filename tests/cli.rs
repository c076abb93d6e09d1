//! Integration tests that run the twlint binary

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::process::{Command, Output};

const TAILWIND_CSS: &str = "@import \"tailwindcss\";\n";

fn twlint_bin(dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_twlint"));
    command.current_dir(dir.path()).env_remove("RUST_LOG");
    command
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("app.css").write_str(TAILWIND_CSS).unwrap();
    for (name, content) in files {
        temp.child(name).write_str(content).unwrap();
    }
    temp
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_valid_classes_exit_zero() {
    let temp = project(&[("src/index.html", r#"<div class="flex items-center">Hello</div>"#)]);

    let output = twlint_bin(&temp)
        .args(["--path", "app.css", "src/**/*.html"])
        .output()
        .expect("Failed to run twlint");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(predicate::str::contains("All 2 classes are valid").eval(&stdout), "{}", stdout);
}

#[test]
fn test_invalid_class_reported_as_json_with_exit_one() {
    let temp = project(&[
        ("src/index.html", r#"<div class="flex bg-opacity-50">Hello</div>"#),
        ("src/App.tsx", "export const App = () => <p className={cn(\"p-4\", \"text-sm\")}>hi</p>;"),
    ]);

    let output = twlint_bin(&temp)
        .args(["--path", "app.css", "--json", "src"])
        .output()
        .expect("Failed to run twlint");

    assert_eq!(output.status.code(), Some(1));
    let report = json(&output);
    assert_eq!(report["invalidClasses"], serde_json::json!(["bg-opacity-50"]));
    assert_eq!(report["summary"]["invalid"], 1);
    assert_eq!(report["summary"]["valid"], 3);
    assert_eq!(report["summary"]["files"], 2);

    let by_file = report["byFile"].as_array().unwrap();
    let html = by_file
        .iter()
        .find(|entry| entry["file"].as_str().unwrap().ends_with("index.html"))
        .unwrap();
    assert_eq!(html["invalidClasses"], serde_json::json!(["bg-opacity-50"]));
    assert_eq!(html["validClasses"], serde_json::json!(["flex"]));
}

#[test]
fn test_no_filter_json_keeps_file_breakdown_key() {
    let temp = project(&[("index.html", r#"<div class="flex bg-opacity-50"></div>"#)]);

    let output = twlint_bin(&temp)
        .args(["--path", "app.css", "--no-filter", "--json", "index.html"])
        .output()
        .expect("Failed to run twlint");

    assert_eq!(output.status.code(), Some(1));
    let report = json(&output);
    assert_eq!(report["byFile"], serde_json::json!([]));
    assert_eq!(report["summary"]["files"], 0);
    let invalid = report["invalidClasses"].as_array().unwrap();
    assert!(invalid.contains(&serde_json::json!("bg-opacity-50")));
    assert!(report["validClasses"].as_array().unwrap().contains(&serde_json::json!("flex")));
}

#[test]
fn test_negated_pattern_excludes_files() {
    let temp = project(&[
        ("src/index.html", r#"<div class="flex">ok</div>"#),
        ("src/legacy/old.html", r#"<div class="bg-opacity-50">old</div>"#),
    ]);

    let output = twlint_bin(&temp)
        .args(["--path", "app.css", "src/**/*.html", "!src/legacy/**"])
        .output()
        .expect("Failed to run twlint");

    assert!(output.status.success(), "stdout: {}", String::from_utf8_lossy(&output.stdout));
}

#[test]
fn test_missing_css_configuration_fails() {
    let temp = project(&[("index.html", r#"<div class="flex"></div>"#)]);

    let output = twlint_bin(&temp).arg("index.html").output().expect("Failed to run twlint");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(predicate::str::contains("No CSS configuration").eval(&stderr), "{}", stderr);

    let output = twlint_bin(&temp)
        .args(["--path", "missing.css", "index.html"])
        .output()
        .expect("Failed to run twlint");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_config_file_supplies_css_path() {
    let temp = project(&[("index.html", r#"<div class="bg-opacity-50"></div>"#)]);
    temp.child("twlint.toml").write_str("css = \"app.css\"\n").unwrap();

    let output = twlint_bin(&temp).args(["--json", "index.html"]).output().expect("Failed to run twlint");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json(&output)["invalidClasses"][0], "bg-opacity-50");
}

#[test]
fn test_design_system_warnings_in_json() {
    let temp = project(&[("index.html", r#"<div class="flex"></div>"#)]);
    temp.child("plain.css").write_str("@theme { --color-brand: #123456; }\n").unwrap();

    let output = twlint_bin(&temp)
        .args(["--path", "plain.css", "--json", "index.html"])
        .output()
        .expect("Failed to run twlint");

    assert!(output.status.success());
    let warnings = json(&output)["warnings"].as_array().unwrap().clone();
    assert_eq!(warnings.len(), 1);
}

#[test]
fn test_count_classes() {
    let temp = project(&[
        ("a.html", "<main>\n  <p class=\"text-sm p-2\">one</p>\n  <p class=\"text-sm\">two</p>\n</main>\n"),
        ("b.html", "<p class=\"text-base\">text-sm</p>\n"),
    ]);

    let output = twlint_bin(&temp)
        .args(["count-classes", "--class", "text-sm", "--path", "app.css", "--json", "."])
        .output()
        .expect("Failed to run twlint");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report = json(&output);
    assert_eq!(report["className"], "text-sm");
    assert_eq!(report["isValid"], true);
    assert_eq!(report["totalOccurrences"], 2);
    assert_eq!(report["filesWithOccurrences"], 1);
    let occurrences = report["files"][0]["occurrences"].as_array().unwrap();
    assert_eq!(occurrences[0]["line"], 2);
    assert_eq!(occurrences[0]["column"], 13);
    assert_eq!(occurrences[1]["line"], 3);
}
