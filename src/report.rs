//! Grading report assembly and merging.
//!
//! The report is the Gradescope results shape: a `tests` array plus an
//! optional rolled-up `score`. Pre-existing test entries are carried as raw
//! JSON values so fields this tool does not know about survive a round trip
//! untouched, and unknown top-level keys are preserved the same way.
//!
//! Loading is permissive everywhere: a missing or unparsable prior report is
//! an empty one, never an error, since grading must not hard-fail because an
//! earlier phase did not run. The one strict contract is the merger's: a
//! *named input file that does not exist* is a usage error and fatal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{GradeError, Result};
use crate::scoring::GradedCheck;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub tests: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Top-level fields other tools put in results.json, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Report {
    /// Loads a prior report, substituting an empty one when the file is
    /// missing or not valid JSON of the report shape.
    pub fn load_or_default(path: &Path) -> Report {
        fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    /// Appends newly graded checks, and rolls their scores into `score` only
    /// if the prior report already carried one. Pre-existing entries are
    /// never recomputed.
    pub fn append_checks(&mut self, checks: &[GradedCheck]) {
        if let Some(score) = &mut self.score {
            *score += checks.iter().map(|check| check.score).sum::<f64>();
        }
        for check in checks {
            if let Ok(value) = serde_json::to_value(check) {
                self.tests.push(value);
            }
        }
    }

    /// Writes the report as 2-space-indented JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| GradeError::WriteFile {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, source),
        })?;
        fs::write(path, json).map_err(GradeError::write(path.to_path_buf()))
    }
}

/// Concatenates the `tests` arrays of several report files, in input order.
///
/// A named file that does not exist is fatal. A file that exists but does
/// not parse is skipped with a warning, and a parsed value that is not an
/// object with a `tests` array contributes nothing.
pub fn merge_files(paths: &[PathBuf], verbose: u8) -> Result<Report> {
    let mut combined = Report::default();

    for path in paths {
        if !path.is_file() {
            return Err(GradeError::InputMissing { path: path.clone() });
        }
        let text = fs::read_to_string(path).map_err(GradeError::read(path.clone()))?;
        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                eprintln!(
                    "Warning: skipping {}: not valid JSON ({})",
                    path.display(),
                    err
                );
                continue;
            }
        };
        match value.get("tests").and_then(Value::as_array) {
            Some(tests) => combined.tests.extend(tests.iter().cloned()),
            None if verbose > 0 => {
                println!("{} has no tests array; contributing nothing", path.display());
            }
            None => {}
        }
    }

    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, max_score: f64, score: f64) -> GradedCheck {
        GradedCheck {
            name: name.to_string(),
            visibility: None,
            max_score,
            score,
            output: None,
        }
    }

    #[test]
    fn missing_prior_report_loads_as_empty() {
        let report = Report::load_or_default(Path::new("no/such/results.json"));
        assert!(report.tests.is_empty());
        assert!(report.score.is_none());
    }

    #[test]
    fn unparsable_prior_report_loads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("results.json");
        fs::write(&path, "{ definitely not json").unwrap();
        let report = Report::load_or_default(&path);
        assert!(report.tests.is_empty());
    }

    #[test]
    fn score_rolls_up_only_when_already_present() {
        let mut with_score: Report =
            serde_json::from_str(r#"{"tests": [], "score": 10}"#).unwrap();
        with_score.append_checks(&[check("a", 5.0, 5.0), check("b", 5.0, 0.0)]);
        assert_eq!(with_score.score, Some(15.0));

        let mut without_score = Report::default();
        without_score.append_checks(&[check("a", 5.0, 5.0)]);
        assert_eq!(without_score.score, None);
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = r#"{"tests": [{"name": "t1", "max_score": 1, "score": 1, "extra_data": {"x": 1}}], "execution_time": 4.2}"#;
        let report: Report = serde_json::from_str(raw).unwrap();
        let out = serde_json::to_string(&report).unwrap();
        assert!(out.contains("execution_time"));
        assert!(out.contains("extra_data"));
    }

    #[test]
    fn merge_concatenates_in_input_order() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.json");
        let b = tmp.path().join("b.json");
        fs::write(&a, r#"{"tests": [{"name": "t1", "max_score": 1, "score": 1}]}"#).unwrap();
        fs::write(&b, r#"{"tests": [{"name": "t2", "max_score": 1, "score": 0}]}"#).unwrap();

        let merged = merge_files(&[a, b], 0).unwrap();
        let names: Vec<&str> = merged
            .tests
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["t1", "t2"]);
        assert_eq!(merged.score, None);
    }

    #[test]
    fn merge_is_associative_over_inputs() {
        let tmp = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, stem)| {
                let path = tmp.path().join(format!("{}.json", stem));
                fs::write(
                    &path,
                    format!(r#"{{"tests": [{{"name": "t{}", "max_score": 1, "score": 1}}]}}"#, i),
                )
                .unwrap();
                path
            })
            .collect();

        let all_at_once = merge_files(&paths, 0).unwrap();

        let ab = merge_files(&paths[..2], 0).unwrap();
        let ab_path = tmp.path().join("ab.json");
        ab.save(&ab_path).unwrap();
        let staged = merge_files(&[ab_path, paths[2].clone()], 0).unwrap();

        assert_eq!(all_at_once.tests, staged.tests);
    }

    #[test]
    fn merge_requires_every_input_to_exist() {
        let err = merge_files(&[PathBuf::from("no/such.json")], 0).unwrap_err();
        assert!(matches!(err, GradeError::InputMissing { .. }));
    }

    #[test]
    fn merge_ignores_inputs_without_a_tests_array() {
        let tmp = tempfile::tempdir().unwrap();
        let plain = tmp.path().join("plain.json");
        let good = tmp.path().join("good.json");
        fs::write(&plain, r#"[1, 2, 3]"#).unwrap();
        fs::write(&good, r#"{"tests": [{"name": "t1", "max_score": 1, "score": 1}]}"#).unwrap();

        let merged = merge_files(&[plain, good], 0).unwrap();
        assert_eq!(merged.tests.len(), 1);
    }
}
