// ABOUTME: Runs external tools (git, docker, podman) non-interactively.
// ABOUTME: Short checks capture their output; long-running tools stream to the operator instead.

use std::io;
use std::process::Stdio;
use tokio::process::Command;

/// Output of a finished external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Short human description of a failure, preferring stderr.
    pub fn failure_detail(&self) -> String {
        let message = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };

        match self.exit_code {
            Some(code) if message.is_empty() => format!("exit status {code}"),
            Some(code) => format!("exit status {code}: {message}"),
            None if message.is_empty() => "terminated by signal".to_string(),
            None => format!("terminated by signal: {message}"),
        }
    }
}

/// Run a command to completion, capturing stdout and stderr.
pub(crate) async fn capture(command: &mut Command) -> io::Result<CommandOutput> {
    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    Ok(CommandOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a command to completion with its output going straight to the operator.
///
/// The child's stdout is sent to our stderr so that stdout stays reserved for
/// the final summary (and stays valid JSON lines in `--json` mode). Returns
/// the exit code, `None` when terminated by a signal.
pub(crate) async fn stream(command: &mut Command) -> io::Result<Option<i32>> {
    let status = command
        .stdin(Stdio::null())
        .stdout(Stdio::from(io::stderr()))
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .status()
        .await?;

    Ok(status.code())
}
