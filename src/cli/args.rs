//! Command-line arguments for both binaries.
//!
//! Uses the `clap` derive API so the argument surface is declarative and
//! type-safe: one struct per binary.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Arguments for the grading run (`diffgrade`).
#[derive(Debug, Parser)]
#[command(
    name = "diffgrade",
    version,
    about = "Generate Gradescope compatible results.json for diff-based testing",
    long_about = "Generate Gradescope compatible results.json for diff-based testing.\n\n\
        The script is a shell script whose commands are annotated with one-line\n\
        markers such as:\n\n  \
        # @test {\"stdout\": 10, \"name\": \"echo test\"}\n  \
        echo foo\n\n\
        Run once with --reference from the instructor's solution to produce\n\
        <script>-reference/, then run without it from the student's submission\n\
        to diff, score, and write the results file."
)]
pub struct GradeArgs {
    /// Name of the annotated script file, e.g. diffs.sh.
    pub script: PathBuf,

    /// Print progress detail; repeat for more.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Produce the reference captures only; no diffing or scoring.
    #[arg(short, long)]
    pub reference: bool,

    /// Existing results file to fold the new checks into.
    #[arg(short, long, default_value = "results.json")]
    pub inputfile: PathBuf,

    /// Where the combined results are written.
    #[arg(short, long, default_value = "results.json")]
    pub outputfile: PathBuf,
}

/// Arguments for the report merger (`combine-results`).
#[derive(Debug, Parser)]
#[command(
    name = "combine-results",
    version,
    about = "Combine separate Gradescope results.json files into one",
    long_about = "Combine separate Gradescope results.json files into one.\n\n\
        The inputs might come from different phases, e.g. a diff-based testing\n\
        phase followed by a unit-test phase followed by another diff-based\n\
        phase. Their tests arrays are concatenated in input order."
)]
pub struct CombineArgs {
    /// Results files to combine, e.g. results1.json results2.json.
    #[arg(required = true)]
    pub jsonfiles: Vec<PathBuf>,

    /// Where the combined results are written.
    #[arg(short, long, default_value = "results.json")]
    pub outputfile: PathBuf,

    /// Print progress detail; repeat for more.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
