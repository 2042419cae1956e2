//! Extracts test annotations from an annotated shell script.
//!
//! A test is declared as a one-line comment marker carrying a JSON payload,
//! immediately followed by the shell command it grades:
//!
//! ```sh
//! # @test {"stdout": 10, "name": "echo test"}
//! echo hello
//! ```
//!
//! Scanning is an explicit two-state machine over the script's lines: either
//! we are looking at fresh lines, or the previous line was a valid marker and
//! the current line (whatever it contains) is consumed as that test's
//! command. Lines that are not markers are kept as pass-through annotations
//! so the executor can replay the script faithfully, side effects included.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::testspec::{SpecError, TestSpec};

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#\s*@test(.*)$").expect("marker pattern is valid")
});

/// One line (or marker/command line pair) of the script, in line order.
#[derive(Debug, Clone, PartialEq)]
pub struct TestAnnotation {
    /// 1-indexed line of the marker (or of the line itself for pass-through).
    /// Capture files for this annotation are keyed by this number.
    pub line_number: usize,
    /// The marker line as it appeared in the script.
    pub raw_line: String,
    /// The command the executor replays. For a graded test this is the line
    /// following the marker, verbatim.
    pub shell_command: String,
    /// Present only for valid markers; pass-through lines carry none.
    pub spec: Option<TestSpec>,
    /// Why a would-be marker was demoted to a pass-through line.
    pub error: Option<String>,
}

impl TestAnnotation {
    fn pass_through(line_number: usize, line: &str, error: Option<String>) -> Self {
        TestAnnotation {
            line_number,
            raw_line: line.to_string(),
            shell_command: line.to_string(),
            spec: None,
            error,
        }
    }

    /// True when this annotation grades at least one channel.
    pub fn is_test(&self) -> bool {
        self.spec.is_some()
    }
}

enum ScanState {
    Scanning,
    AwaitingCommand {
        line_number: usize,
        raw_line: String,
        spec: TestSpec,
    },
}

enum LineKind {
    Marker(TestSpec),
    MarkerError(SpecError),
    Plain,
}

fn classify(line: &str) -> LineKind {
    let Some(caps) = MARKER.captures(line.trim()) else {
        return LineKind::Plain;
    };
    let payload = caps.get(1).map_or("", |m| m.as_str());
    match TestSpec::parse_payload(payload) {
        Ok(spec) => LineKind::Marker(spec),
        Err(err) => LineKind::MarkerError(err),
    }
}

/// Scans a script and returns its annotations in line order.
///
/// Never fails: malformed markers are demoted to pass-through lines with
/// `error` set, including a marker on the final line with no command after
/// it.
pub fn scan_script(source: &str) -> Vec<TestAnnotation> {
    let mut annotations = Vec::new();
    let mut state = ScanState::Scanning;

    for (idx, line) in source.lines().enumerate() {
        let line_number = idx + 1;
        state = match state {
            ScanState::AwaitingCommand {
                line_number: marker_line,
                raw_line,
                spec,
            } => {
                annotations.push(TestAnnotation {
                    line_number: marker_line,
                    raw_line,
                    shell_command: line.to_string(),
                    spec: Some(spec),
                    error: None,
                });
                ScanState::Scanning
            }
            ScanState::Scanning => match classify(line) {
                LineKind::Marker(spec) => ScanState::AwaitingCommand {
                    line_number,
                    raw_line: line.to_string(),
                    spec,
                },
                LineKind::MarkerError(err) => {
                    annotations.push(TestAnnotation::pass_through(
                        line_number,
                        line,
                        Some(err.to_string()),
                    ));
                    ScanState::Scanning
                }
                LineKind::Plain => {
                    annotations.push(TestAnnotation::pass_through(line_number, line, None));
                    ScanState::Scanning
                }
            },
        };
    }

    // A marker on the last line has no command to grade.
    if let ScanState::AwaitingCommand {
        line_number,
        raw_line,
        ..
    } = state
    {
        annotations.push(TestAnnotation::pass_through(
            line_number,
            &raw_line,
            Some("test annotation has no following command line".to_string()),
        ));
    }

    annotations
}
