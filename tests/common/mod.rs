// Shared helpers for the CLI integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use serde_json::Value;

pub fn diffgrade() -> Command {
    Command::cargo_bin("diffgrade").expect("diffgrade binary builds")
}

pub fn combine_results() -> Command {
    Command::cargo_bin("combine-results").expect("combine-results binary builds")
}

pub fn read_json(dir: &Path, name: &str) -> Value {
    let text = fs::read_to_string(dir.join(name)).expect("results file exists");
    serde_json::from_str(&text).expect("results file is valid JSON")
}
