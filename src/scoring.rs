//! Compares student captures against reference captures and scores them.
//!
//! Scoring is all-or-nothing per channel: an empty diff earns the channel's
//! full max score, any divergence earns zero and attaches the rendered diff
//! so the student can see what went wrong. Checks are emitted in annotation
//! order and, within an annotation, in stdout / stderr / return / file
//! order.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::annotation::TestAnnotation;
use crate::diff::unified_diff;
use crate::errors::{GradeError, Result};
use crate::runner::{capture_path, sentinel_path};
use crate::testspec::{TestSpec, Visibility};

/// One scored entry of the grading report: a single channel of a single
/// annotation, in the report schema's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedCheck {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    pub max_score: f64,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl GradedCheck {
    pub fn passed(&self) -> bool {
        self.score >= self.max_score
    }
}

#[derive(Debug, Clone, Copy)]
enum Channel {
    Stdout,
    Stderr,
    Return,
}

const CHANNELS: [Channel; 3] = [Channel::Stdout, Channel::Stderr, Channel::Return];

impl Channel {
    /// Capture-file extension, also the display label.
    fn label(self) -> &'static str {
        match self {
            Channel::Stdout => "stdout",
            Channel::Stderr => "stderr",
            Channel::Return => "return",
        }
    }

    fn max_score(self, spec: &TestSpec) -> Option<f64> {
        match self {
            Channel::Stdout => spec.stdout,
            Channel::Stderr => spec.stderr,
            Channel::Return => spec.return_code,
        }
    }
}

/// `"<name> (<channel>)"` when the annotation is named, otherwise a
/// description of what was checked.
fn check_name(spec: &TestSpec, command: &str, channel: &str) -> String {
    match &spec.name {
        Some(name) => format!("{} ({})", name, channel),
        None => format!("Checking {} from {}", channel, command.trim()),
    }
}

/// Grades every declared channel of every annotation.
///
/// Only the absence of a *reference* output file for a declared `filename`
/// is fatal; it means the reference pass never ran or is misconfigured.
/// Everything else (timeouts, missing student output) scores zero with a
/// message.
pub fn grade_annotations(
    annotations: &[TestAnnotation],
    reference_dir: &Path,
    student_dir: &Path,
) -> Result<Vec<GradedCheck>> {
    let mut checks = Vec::new();

    for ta in annotations {
        let Some(spec) = &ta.spec else { continue };

        for channel in CHANNELS {
            if let Some(max_score) = channel.max_score(spec) {
                checks.push(check_channel(
                    ta,
                    spec,
                    channel,
                    max_score,
                    reference_dir,
                    student_dir,
                ));
            }
        }

        if let (Some(filename), Some(points)) = (&spec.filename, spec.points) {
            checks.push(check_output_file(
                ta,
                spec,
                filename,
                points,
                reference_dir,
                student_dir,
            )?);
        }
    }

    Ok(checks)
}

fn check_channel(
    ta: &TestAnnotation,
    spec: &TestSpec,
    channel: Channel,
    max_score: f64,
    reference_dir: &Path,
    student_dir: &Path,
) -> GradedCheck {
    let name = check_name(spec, &ta.shell_command, channel.label());
    let reference = capture_path(reference_dir, ta.line_number, channel.label());
    let student = capture_path(student_dir, ta.line_number, channel.label());

    // A capture can be absent when the command timed out; that run wrote no
    // .return file, and a missing capture is always a failing check.
    let (score, output) = match (
        fs::read_to_string(&reference).ok(),
        fs::read_to_string(&student).ok(),
    ) {
        (Some(reference_text), Some(student_text)) => {
            match unified_diff(&reference_text, &student_text) {
                None => (max_score, None),
                Some(diff) => (0.0, Some(diff)),
            }
        }
        (None, _) => (
            0.0,
            Some(format!(
                "no {} captured for the reference run (command may have timed out)",
                channel.label()
            )),
        ),
        (_, None) => (
            0.0,
            Some(format!(
                "no {} captured for the student run (command may have timed out)",
                channel.label()
            )),
        ),
    };

    GradedCheck {
        name,
        visibility: spec.visibility,
        max_score,
        score,
        output,
    }
}

fn check_output_file(
    ta: &TestAnnotation,
    spec: &TestSpec,
    filename: &str,
    points: f64,
    reference_dir: &Path,
    student_dir: &Path,
) -> Result<GradedCheck> {
    let label = format!("output file {}", filename);
    let name = check_name(spec, &ta.shell_command, &label);

    let reference = reference_dir.join(filename);
    if !reference.is_file() {
        return Err(GradeError::ReferenceOutputMissing {
            filename: filename.to_string(),
        });
    }

    let mut check = GradedCheck {
        name,
        visibility: spec.visibility,
        max_score: points,
        score: 0.0,
        output: None,
    };

    // The sentinel means the student command never produced the file at
    // all; there is nothing to diff.
    if sentinel_path(student_dir, filename).is_file() {
        check.output = Some(format!(
            "Missing output in student solution for {}",
            filename
        ));
        return Ok(check);
    }

    let reference_text =
        fs::read_to_string(&reference).map_err(GradeError::read(reference.clone()))?;
    match fs::read_to_string(student_dir.join(filename)).ok() {
        Some(student_text) => match unified_diff(&reference_text, &student_text) {
            None => check.score = points,
            Some(diff) => check.output = Some(diff),
        },
        None => {
            check.output = Some(format!(
                "Missing output in student solution for {}",
                filename
            ));
        }
    }
    Ok(check)
}
