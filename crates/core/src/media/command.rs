//! Subprocess runner for the ffmpeg family of tools.

use crate::media::error::MediaError;
use std::ffi::OsStr;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Lines of stderr kept in `MediaError::ToolFailed`.
const STDERR_TAIL_LINES: usize = 20;

/// A command-line media tool such as `ffmpeg` or `ffprobe`.
///
/// Children are spawned with `kill_on_drop`, so dropping the future (timeout,
/// cancellation) also stops the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTool {
    program: String,
}

impl MediaTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether the program resolves on `PATH` (or as a path).
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// Run the tool to completion and return its stdout.
    ///
    /// # Errors
    ///
    /// - `ToolNotFound` if the program cannot be spawned because it does not exist
    /// - `ToolFailed` on a non-zero exit, with the tail of stderr
    pub async fn run<I, S>(&self, args: I) -> Result<String, MediaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        debug!(program = %self.program, "Spawning media tool");
        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaError::ToolNotFound(self.program.clone()));
            }
            Err(e) => return Err(MediaError::Io(e)),
        };

        if !output.status.success() {
            return Err(MediaError::ToolFailed {
                tool: self.program.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: stderr_tail(&String::from_utf8_lossy(&output.stderr)),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
