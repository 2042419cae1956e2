//! User-facing output for the CLI.
//!
//! Centralizes the colorized reporting so every command prints check results
//! and diffs the same way.

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::scoring::GradedCheck;

/// Prints one line per check, green for full marks and red otherwise, with
/// the failing check's diff echoed underneath.
pub fn print_checks(checks: &[GradedCheck]) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    for check in checks {
        let (tag, color) = if check.passed() {
            ("PASS", Color::Green)
        } else {
            ("FAIL", Color::Red)
        };
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        println!("{} {} ({}/{})", tag, check.name, check.score, check.max_score);
        let _ = stdout.reset();

        if let Some(output) = &check.output {
            print_diff(&mut stdout, output);
        }
    }
}

fn print_diff(stdout: &mut StandardStream, diff: &str) {
    for line in diff.lines() {
        match line.as_bytes().first() {
            Some(b'+') => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
            }
            Some(b'-') => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
            }
            _ => {
                let _ = stdout.reset();
            }
        }
        println!("{}", line);
    }
    let _ = stdout.reset();
}
