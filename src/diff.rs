//! Line diffing for captured output.
//!
//! Comparison is trailing-whitespace-insensitive: each line is trimmed on the
//! right before comparing, so a missing final newline or stray spaces at line
//! ends never fail a test. When the normalized sequences differ, the full
//! diff is rendered as unified-style text with `expected`/`actual` headers
//! for inclusion in the grading report.

use difference::{Changeset, Difference};

/// Diffs two captured texts, ignoring trailing whitespace on every line.
///
/// Returns `None` when the texts are equivalent, otherwise the rendered diff.
pub fn unified_diff(expected: &str, actual: &str) -> Option<String> {
    let expected_lines: Vec<&str> = expected.lines().map(str::trim_end).collect();
    let actual_lines: Vec<&str> = actual.lines().map(str::trim_end).collect();

    if expected_lines == actual_lines {
        return None;
    }

    let changeset = Changeset::new(
        &expected_lines.join("\n"),
        &actual_lines.join("\n"),
        "\n",
    );

    let mut rendered = String::from("--- expected\n+++ actual");
    for diff in &changeset.diffs {
        let (prefix, chunk) = match diff {
            Difference::Same(text) => (' ', text),
            Difference::Add(text) => ('+', text),
            Difference::Rem(text) => ('-', text),
        };
        // A chunk may span several lines; prefix each one.
        for line in chunk.split('\n') {
            rendered.push('\n');
            rendered.push(prefix);
            rendered.push_str(line);
        }
    }
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_yields_no_diff() {
        assert_eq!(unified_diff("hello\nworld\n", "hello\nworld\n"), None);
    }

    #[test]
    fn trailing_whitespace_and_final_newline_are_ignored() {
        assert_eq!(unified_diff("hello  \nworld\n", "hello\nworld"), None);
        assert_eq!(unified_diff("a\n", "a"), None);
    }

    #[test]
    fn a_single_changed_character_is_detected() {
        let diff = unified_diff("hello\n", "hullo\n").expect("texts differ");
        assert!(diff.contains("--- expected"));
        assert!(diff.contains("+++ actual"));
        assert!(diff.contains("-hello"));
        assert!(diff.contains("+hullo"));
    }

    #[test]
    fn leading_whitespace_still_counts() {
        assert!(unified_diff("  hello\n", "hello\n").is_some());
    }

    #[test]
    fn extra_blank_line_inside_the_output_counts() {
        assert!(unified_diff("a\nb\n", "a\n\nb\n").is_some());
    }

    #[test]
    fn diff_against_empty_output_lists_every_expected_line() {
        let diff = unified_diff("one\ntwo\n", "").expect("texts differ");
        assert!(diff.contains("-one"));
        assert!(diff.contains("-two"));
    }
}
