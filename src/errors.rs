//! Fatal error taxonomy for the grading pipeline.
//!
//! Only configuration-level failures live here: a missing script, a missing
//! reference directory, an unusable run directory, a missing reference output
//! file, or an unwritable report. Annotation syntax problems are *not* errors
//! in this sense; they demote the offending line to a plain pass-through
//! command and are reported inline by the CLI layer.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GradeError>;

/// A failure that halts the whole run.
///
/// Every variant identifies the offending file or directory; the CLI prints
/// the message and exits with status 1.
#[derive(Debug, Error, Diagnostic)]
pub enum GradeError {
    #[error("the script {path} does not exist")]
    #[diagnostic(
        code(diffgrade::script_missing),
        help("pass the path of the annotated shell script as the first argument")
    )]
    ScriptMissing { path: PathBuf },

    #[error("cannot perform diff; reference output {dir} not found")]
    #[diagnostic(
        code(diffgrade::reference_missing),
        help("generate it first with `diffgrade --reference <script>`")
    )]
    ReferenceDirMissing { dir: PathBuf },

    #[error("no output for {filename} for reference solution")]
    #[diagnostic(
        code(diffgrade::reference_output_missing),
        help("the reference run never produced this file; re-run with --reference and check the command")
    )]
    ReferenceOutputMissing { filename: String },

    #[error("was unable to remove {dir}")]
    #[diagnostic(code(diffgrade::run_dir))]
    RemoveDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("was unable to create {dir}")]
    #[diagnostic(code(diffgrade::run_dir))]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}")]
    #[diagnostic(code(diffgrade::io))]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}")]
    #[diagnostic(code(diffgrade::io))]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run `{command}`")]
    #[diagnostic(code(diffgrade::exec))]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("the inputfile {path} does not exist")]
    #[diagnostic(code(diffgrade::input_missing))]
    InputMissing { path: PathBuf },
}

impl GradeError {
    pub fn read(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> GradeError {
        let path = path.into();
        move |source| GradeError::ReadFile { path, source }
    }

    pub fn write(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> GradeError {
        let path = path.into();
        move |source| GradeError::WriteFile { path, source }
    }
}
