//! Integration tests for the `greenmodel-cli train` and `sweep` commands.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn greenmodel(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("greenmodel-cli").unwrap();
    cmd.current_dir(temp_dir.path())
        .env("HOME", temp_dir.path())
        .env_remove("GREENMODEL_DATA_DIR")
        .env_remove("GREENMODEL_LOG_LEVEL")
        .env_remove("GREENMODEL_CARBON_INTENSITY");
    cmd
}

#[test]
fn test_train_iris_random_forest() {
    let temp_dir = TempDir::new().unwrap();
    greenmodel(&temp_dir)
        .args(["--no-side-log", "train", "--dataset", "iris", "--trees", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Trees: 10"))
        .stdout(predicate::str::contains("Greenest configuration (for Iris dataset)"))
        .stdout(predicate::str::contains("boiling a kettle"));

    assert!(!temp_dir.path().join("emissions.csv").exists());
}

#[test]
fn test_train_json_and_side_log() {
    let temp_dir = TempDir::new().unwrap();
    let output = greenmodel(&temp_dir)
        .args(["train", "--dataset", "iris", "--model", "logistic_regression", "--max-iter", "100", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["runs"].as_array().unwrap().len(), 1);
    assert_eq!(view["appended"]["params"], "Epochs: 100");
    assert_eq!(view["appended"]["model"], "Logistic Regression");
    assert!(view["appended"]["accuracy_pct"].as_f64().unwrap() > 70.0);
    assert!(view["appended"]["emissions_g"].as_f64().unwrap() >= 0.0);
    assert_eq!(view["selected_dataset"], "iris");

    let side_log = std::fs::read_to_string(temp_dir.path().join("emissions.csv")).unwrap();
    assert_eq!(side_log.lines().count(), 2);
    assert!(side_log.starts_with("timestamp,project_name,run_id"));
}

#[test]
fn test_train_rejects_out_of_range_trees() {
    let temp_dir = TempDir::new().unwrap();
    greenmodel(&temp_dir)
        .args(["--no-side-log", "train", "--dataset", "iris", "--trees", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--trees"));
}

#[test]
fn test_train_breast_cancer_without_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let output = greenmodel(&temp_dir)
        .args(["--no-side-log", "train", "--dataset", "breast_cancer", "--model", "lr", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["appended"]["dataset"], "Breast Cancer");
}

#[test]
fn test_sweep_exports_markdown() {
    let temp_dir = TempDir::new().unwrap();
    let export = temp_dir.path().join("runs.md");

    greenmodel(&temp_dir)
        .args(["--no-side-log", "sweep", "--dataset", "iris", "--values", "10,20", "--export"])
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Trees: 20"));

    let markdown = std::fs::read_to_string(export).unwrap();
    assert!(markdown.contains("| 1 | Iris | Random Forest | Trees: 10 |"));
    assert!(markdown.contains("| 2 | Iris | Random Forest | Trees: 20 |"));
}

#[test]
fn test_sweep_rejects_value_outside_range() {
    let temp_dir = TempDir::new().unwrap();
    greenmodel(&temp_dir)
        .args(["--no-side-log", "sweep", "--dataset", "iris", "--model", "lr", "--values", "100,900"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("50..=500"));
}
