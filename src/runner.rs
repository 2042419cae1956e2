//! Replays a script's annotations and captures their output.
//!
//! Each run targets one directory, `<script>-reference` or
//! `<script>-student`, which is destroyed and recreated so stale captures
//! can never leak across invocations. Graded annotations get three capture
//! files keyed by zero-padded marker line number (`00003.stdout`,
//! `00003.stderr`, `00003.return`) plus, when the annotation declares a
//! `filename`, a copy of that file or a `<filename>-MISSING` sentinel.
//! Pass-through lines are executed for their side effects only.
//!
//! Execution is strictly sequential: every command blocks the pipeline until
//! it exits or its per-test timeout elapses, at which point it is killed and
//! its `.return` capture is deliberately left unwritten; the missing file is
//! the downstream signal that the test failed.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::annotation::TestAnnotation;
use crate::errors::{GradeError, Result};
use crate::testspec::{TestSpec, DEFAULT_TIMEOUT_SECS};

/// Which side of the grading comparison a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Ground truth, produced from the instructor's solution.
    Reference,
    /// The submission being graded.
    Student,
}

impl RunMode {
    pub fn suffix(self) -> &'static str {
        match self {
            RunMode::Reference => "reference",
            RunMode::Student => "student",
        }
    }
}

/// `<script>-reference` or `<script>-student`, next to the script.
pub fn output_dir(script: &Path, mode: RunMode) -> PathBuf {
    let mut name = script.as_os_str().to_os_string();
    name.push("-");
    name.push(mode.suffix());
    PathBuf::from(name)
}

/// Capture file for one channel of one annotation, e.g. `00003.stdout`.
pub fn capture_path(dir: &Path, line_number: usize, extension: &str) -> PathBuf {
    dir.join(format!("{:05}.{}", line_number, extension))
}

/// Sentinel marking a declared output file the command never produced.
pub fn sentinel_path(dir: &Path, filename: &str) -> PathBuf {
    dir.join(format!("{}-MISSING", filename))
}

/// Runs every annotation in order and fills `<script>-<mode>` with captures.
///
/// Returns the run directory. Failure to remove or create the directory is
/// fatal; everything downstream assumes it starts clean.
pub fn generate_output(
    script: &Path,
    annotations: &[TestAnnotation],
    mode: RunMode,
    verbose: u8,
) -> Result<PathBuf> {
    let dir = output_dir(script, mode);
    prepare_output_dir(&dir)?;

    for ta in annotations {
        run_annotation(ta, &dir, verbose)?;
        if let Some(spec) = &ta.spec {
            collect_output_file(spec, &dir, verbose)?;
        }
    }

    Ok(dir)
}

fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        println!("Removing old directory: {}", dir.display());
        fs::remove_dir_all(dir).map_err(|source| GradeError::RemoveDir {
            dir: dir.to_path_buf(),
            source,
        })?;
    }
    println!("Creating directory {} ...", dir.display());
    fs::create_dir(dir).map_err(|source| GradeError::CreateDir {
        dir: dir.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn run_annotation(ta: &TestAnnotation, dir: &Path, verbose: u8) -> Result<()> {
    let command = ta.shell_command.trim().to_string();
    let timeout = ta
        .spec
        .as_ref()
        .map_or(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS), TestSpec::timeout);

    if verbose > 2 {
        println!("About to call sh -c \"{}\"", command);
    }

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&command);

    let wants_stdin = ta
        .spec
        .as_ref()
        .is_some_and(|spec| spec.stdin.is_some());

    match &ta.spec {
        Some(_) => {
            let out = create_capture(dir, ta.line_number, "stdout")?;
            let err = create_capture(dir, ta.line_number, "stderr")?;
            cmd.stdout(Stdio::from(out)).stderr(Stdio::from(err));
        }
        // Pass-through lines run for side effects; their output is not graded.
        None => {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
    }
    cmd.stdin(if wants_stdin {
        Stdio::piped()
    } else {
        Stdio::null()
    });

    let mut child = cmd.spawn().map_err(|source| GradeError::Spawn {
        command: command.clone(),
        source,
    })?;

    // Feed stdin from its own thread so a command that never reads cannot
    // deadlock against a full pipe.
    let stdin_text = ta.spec.as_ref().and_then(|spec| spec.stdin.clone());
    let stdin_thread = stdin_text.and_then(|text| {
        child.stdin.take().map(|mut stdin| {
            thread::spawn(move || {
                let _ = stdin.write_all(text.as_bytes());
            })
        })
    });

    let outcome = wait_with_timeout(&mut child, timeout, &command)?;
    if let Some(handle) = stdin_thread {
        let _ = handle.join();
    }

    match outcome {
        Some(status) => {
            if ta.spec.is_some() {
                let code = status.code().unwrap_or(-1);
                let path = capture_path(dir, ta.line_number, "return");
                fs::write(&path, format!("{}\n", code))
                    .map_err(GradeError::write(path.clone()))?;
            }
        }
        None => {
            println!(
                "WARNING: {} TIMED OUT AFTER {} seconds",
                command,
                timeout.as_secs_f64()
            );
        }
    }

    Ok(())
}

fn create_capture(dir: &Path, line_number: usize, extension: &str) -> Result<File> {
    let path = capture_path(dir, line_number, extension);
    File::create(&path).map_err(GradeError::write(path.clone()))
}

/// Blocks until the child exits or the deadline passes, in which case the
/// child is killed and `None` is returned.
fn wait_with_timeout(
    child: &mut Child,
    limit: Duration,
    command: &str,
) -> Result<Option<ExitStatus>> {
    let deadline = Instant::now().checked_add(limit);

    loop {
        let waited = child.try_wait().map_err(|source| GradeError::Spawn {
            command: command.to_string(),
            source,
        })?;
        if let Some(status) = waited {
            return Ok(Some(status));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(Duration::from_millis(5));
    }
}

fn collect_output_file(spec: &TestSpec, dir: &Path, verbose: u8) -> Result<()> {
    let Some(filename) = &spec.filename else {
        return Ok(());
    };
    if verbose > 1 {
        println!("LOOKING FOR [{}]", filename);
    }
    let source = Path::new(filename);
    if source.is_file() {
        let dest = dir.join(filename);
        fs::copy(source, &dest).map_err(GradeError::write(dest.clone()))?;
    } else {
        let sentinel = sentinel_path(dir, filename);
        File::create(&sentinel).map_err(GradeError::write(sentinel.clone()))?;
    }
    Ok(())
}
