#![allow(deprecated)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SECTION: &str = r#"{
    "id": "s1",
    "name": "orientation",
    "scenes": [{"id": "scene"}],
    "variables": [
        {
            "id": "angle",
            "name": "angle",
            "selection": {"kind": "in-order"},
            "object": "grating",
            "property": {"name": "rotation", "unit": {"name": "deg"}},
            "list": {"id": "angles", "name": "angles", "values": [
                {"id": "a0", "components": [0, 0, 0]},
                {"id": "a1", "components": [45, 0, 0]}
            ]}
        },
        {
            "id": "side",
            "name": "side",
            "selection": {"kind": "shuffled"},
            "object": "grating",
            "property": {"name": "x", "unit": {"name": "px"}},
            "list": {"id": "sides", "name": "sides", "values": [
                {"id": "left", "components": [-1, 0, 0]},
                {"id": "right", "components": [1, 0, 0]}
            ]}
        }
    ]
}"#;

fn stim() -> Command {
    Command::cargo_bin("stim").unwrap()
}

fn write_section(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("section.json");
    fs::write(&path, SECTION).unwrap();
    path
}

#[test]
fn help_lists_subcommands() {
    stim()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("hash"));
}

#[test]
fn generate_prints_the_design() {
    let dir = TempDir::new().unwrap();
    let section = write_section(dir.path());
    stim()
        .args(["generate", "--section"])
        .arg(&section)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"number_of_trials\": 4"))
        .stdout(predicate::str::contains("\"seeds_used\""));
}

#[test]
fn write_seeds_makes_runs_repeatable() {
    let dir = TempDir::new().unwrap();
    let section = write_section(dir.path());
    let seeds = dir.path().join("seeds.json");

    stim()
        .args(["generate", "--write-seeds", "--section"])
        .arg(&section)
        .arg("--seeds")
        .arg(&seeds)
        .assert()
        .success();
    let registry = fs::read_to_string(&seeds).unwrap();
    assert!(registry.contains("\"s1\""));

    let first = stim()
        .args(["hash", "--section"])
        .arg(&section)
        .arg("--seeds")
        .arg(&seeds)
        .output()
        .unwrap();
    let second = stim()
        .args(["hash", "--section"])
        .arg(&section)
        .arg("--seeds")
        .arg(&seeds)
        .output()
        .unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(String::from_utf8(first.stdout).unwrap().trim().len(), 64);
}

#[test]
fn table_prints_columns_and_rows() {
    let dir = TempDir::new().unwrap();
    let section = write_section(dir.path());
    stim()
        .args(["generate", "--table", "--section"])
        .arg(&section)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"columns\""))
        .stdout(predicate::str::contains("\"angle\""));
}

#[test]
fn config_limits_are_enforced() {
    let dir = TempDir::new().unwrap();
    let section = write_section(dir.path());
    let config = dir.path().join("config.yaml");
    fs::write(&config, "max_trials: 4\n").unwrap();
    stim()
        .args(["generate", "--section"])
        .arg(&section)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("maximum number of trials"));
}

#[test]
fn write_seeds_requires_a_registry() {
    let dir = TempDir::new().unwrap();
    let section = write_section(dir.path());
    stim()
        .args(["generate", "--write-seeds", "--section"])
        .arg(&section)
        .assert()
        .failure();
}
