// ABOUTME: ChangeDetector backed by the git command line.
// ABOUTME: Runs git non-interactively with tokio::process and interprets its output.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use super::detector::ChangeDetector;
use super::error::VcsError;
use crate::process::{CommandOutput, capture};
use crate::types::SubDir;

const REMOTE: &str = "origin";

/// Git adapter that shells out to the `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, path: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(path) = path {
            cmd.current_dir(path);
        }
        // Never block on credential prompts; auth failures surface as errors.
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd
    }

    async fn run(
        &self,
        path: Option<&Path>,
        operation: &'static str,
        args: &[&str],
    ) -> Result<CommandOutput, VcsError> {
        execute(operation, self.command(path).args(args)).await
    }

    /// Fail with `RemoteBranchNotFound` unless `origin/<branch>` exists locally.
    async fn ensure_remote_branch(&self, path: &Path, branch: &str) -> Result<(), VcsError> {
        let reference = remote_ref(branch);
        let output = capture(self.command(Some(path)).args([
            "rev-parse",
            "--verify",
            "--quiet",
            reference.as_str(),
        ]))
        .await?;

        match output.exit_code {
            Some(0) => Ok(()),
            // --quiet reports a missing ref with status 1 and no output
            Some(1) => Err(VcsError::RemoteBranchNotFound(branch.to_string())),
            _ => Err(VcsError::Command {
                operation: "rev-parse",
                detail: output.failure_detail(),
            }),
        }
    }
}

fn local_ref(branch: &str) -> String {
    format!("refs/heads/{branch}")
}

async fn execute(
    operation: &'static str,
    command: &mut Command,
) -> Result<CommandOutput, VcsError> {
    let output = capture(command).await?;
    if output.success() {
        Ok(output)
    } else {
        Err(VcsError::Command {
            operation,
            detail: output.failure_detail(),
        })
    }
}

fn remote_ref(branch: &str) -> String {
    format!("refs/remotes/{REMOTE}/{branch}")
}

/// Split `git diff --name-only -z` output into paths.
fn parse_name_list(stdout: &str) -> impl Iterator<Item = &str> {
    stdout.split('\0').filter(|name| !name.is_empty())
}

#[async_trait]
impl ChangeDetector for GitCli {
    async fn is_repository(&self, path: &Path) -> bool {
        let Ok(output) = capture(
            self.command(Some(path))
                .args(["rev-parse", "--show-toplevel"]),
        )
        .await
        else {
            return false;
        };

        if !output.success() {
            return false;
        }

        // A plain directory nested inside some other repository is not a checkout.
        let top_level = output.stdout.trim();
        match (
            tokio::fs::canonicalize(top_level).await,
            tokio::fs::canonicalize(path).await,
        ) {
            (Ok(top), Ok(requested)) => top == requested,
            _ => false,
        }
    }

    async fn fetch(&self, path: &Path) -> Result<(), VcsError> {
        self.run(Some(path), "fetch", &["fetch", "--prune", REMOTE])
            .await
            .map(|_| ())
    }

    async fn is_behind_remote(&self, path: &Path, branch: &str) -> Result<bool, VcsError> {
        self.ensure_remote_branch(path, branch).await?;

        let range = format!("{}..{}", local_ref(branch), remote_ref(branch));
        let output = self
            .run(Some(path), "rev-list", &["rev-list", "--count", range.as_str()])
            .await?;

        let count: u64 = output
            .stdout
            .trim()
            .parse()
            .map_err(|_| VcsError::UnexpectedOutput(output.stdout.trim().to_string()))?;

        Ok(count > 0)
    }

    async fn pull(&self, path: &Path, branch: &str) -> Result<(), VcsError> {
        self.ensure_remote_branch(path, branch).await?;

        let remote = remote_ref(branch);
        self.run(
            Some(path),
            "checkout",
            &["checkout", "--force", "-B", branch, remote.as_str()],
        )
        .await
        .map(|_| ())
    }

    async fn clone_repo(&self, path: &Path, url: &str, branch: &str) -> Result<(), VcsError> {
        let mut command = self.command(None);
        command
            .args(["clone", "--branch", branch, "--single-branch", "--", url])
            .arg(path);
        execute("clone", &mut command).await.map(|_| ())
    }

    async fn path_changed(
        &self,
        path: &Path,
        branch: &str,
        sub_dir: &SubDir,
    ) -> Result<bool, VcsError> {
        self.ensure_remote_branch(path, branch).await?;

        let local = local_ref(branch);
        let remote = remote_ref(branch);
        let output = self
            .run(
                Some(path),
                "diff",
                &[
                    "diff",
                    "--name-only",
                    "--no-renames",
                    "-z",
                    local.as_str(),
                    remote.as_str(),
                ],
            )
            .await?;

        Ok(parse_name_list(&output.stdout).any(|file| sub_dir.contains(file)))
    }
}
