//! The diffgrade command-line interface.
//!
//! Orchestrates the grading pipeline (scan annotations, replay the script,
//! diff the captures, fold the checks into the results file) and the report
//! merger. Fatal configuration errors are printed here and exit with status
//! 1; annotation errors are reported with their line numbers and never abort
//! the run.

use std::fs;
use std::process;

use clap::Parser;

use crate::annotation::{self, TestAnnotation};
use crate::cli::args::{CombineArgs, GradeArgs};
use crate::errors::{GradeError, Result};
use crate::report::{self, Report};
use crate::runner::{self, RunMode};
use crate::scoring;

pub mod args;
pub mod output;

/// Entry point for the `diffgrade` binary.
pub fn run_grade() {
    let args = GradeArgs::parse();
    if let Err(e) = grade(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Entry point for the `combine-results` binary.
pub fn run_combine() {
    let args = CombineArgs::parse();
    if let Err(e) = combine(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn grade(args: &GradeArgs) -> Result<()> {
    if !args.script.is_file() {
        return Err(GradeError::ScriptMissing {
            path: args.script.clone(),
        });
    }

    let source =
        fs::read_to_string(&args.script).map_err(GradeError::read(args.script.clone()))?;
    let annotations = annotation::scan_script(&source);
    report_annotation_errors(args, &annotations);

    if args.verbose > 2 {
        println!("{:#?}", annotations);
    }

    let mode = if args.reference {
        RunMode::Reference
    } else {
        RunMode::Student
    };
    runner::generate_output(&args.script, &annotations, mode, args.verbose)?;

    if args.reference {
        return Ok(());
    }

    let reference_dir = runner::output_dir(&args.script, RunMode::Reference);
    if !reference_dir.is_dir() {
        return Err(GradeError::ReferenceDirMissing { dir: reference_dir });
    }
    let student_dir = runner::output_dir(&args.script, RunMode::Student);

    let checks = scoring::grade_annotations(&annotations, &reference_dir, &student_dir)?;
    if args.verbose > 0 {
        output::print_checks(&checks);
    }

    let mut report = Report::load_or_default(&args.inputfile);
    report.append_checks(&checks);
    report.save(&args.outputfile)
}

fn report_annotation_errors(args: &GradeArgs, annotations: &[TestAnnotation]) {
    for ta in annotations {
        if args.verbose > 1 {
            println!("linenumber: {} line: {}", ta.line_number, ta.raw_line.trim());
        }
        if let Some(error) = &ta.error {
            eprintln!(
                "Error on line {} of {}: {}",
                ta.line_number,
                args.script.display(),
                error
            );
        }
    }
}

fn combine(args: &CombineArgs) -> Result<()> {
    let combined = report::merge_files(&args.jsonfiles, args.verbose)?;
    if args.verbose > 0 {
        println!(
            "Combined {} tests into {}",
            combined.tests.len(),
            args.outputfile.display()
        );
    }
    combined.save(&args.outputfile)
}
