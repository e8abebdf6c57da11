use std::path::Path;
use std::process::{Command, Stdio};
use crate::error::{Error, Result};

/// Captured result of one engine invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the engine binary and captures its output.
///
/// Implementations block until the process exits. A returned `Err` means the
/// process could not be launched at all; a non-zero exit is reported through
/// [`ProcessOutput::success`].
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[&str]) -> Result<ProcessOutput>;
}

/// [`ProcessRunner`] that spawns real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[&str]) -> Result<ProcessOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::process(command_line(program, args), e.to_string()))?;

        Ok(ProcessOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Render `program args...` for log messages
pub fn command_line(program: &Path, args: &[&str]) -> String {
    if args.is_empty() {
        program.display().to_string()
    } else {
        format!("{} {}", program.display(), args.join(" "))
    }
}
