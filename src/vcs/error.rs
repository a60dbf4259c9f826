// ABOUTME: Error types for version-control operations and repository sync.
// ABOUTME: Sync errors carry the step that failed so callers can report the phase.

use std::path::PathBuf;

use crate::deploy::Phase;
use crate::types::SubDir;

/// Errors from a single version-control operation.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// `origin/<branch>` does not exist after fetching.
    #[error("remote branch origin/{0} not found")]
    RemoteBranchNotFound(String),

    /// The tool ran but reported failure.
    #[error("git {operation} failed: {detail}")]
    Command {
        operation: &'static str,
        detail: String,
    },

    /// The tool produced output that could not be interpreted.
    #[error("unexpected git output: {0}")]
    UnexpectedOutput(String),

    /// The tool could not be started.
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),

    /// Scripted failure from an in-memory detector.
    #[error("{0}")]
    Scripted(String),
}

/// Errors from [`RepositorySync::sync`](super::RepositorySync::sync).
///
/// Any of these aborts the invocation before planning; partially detected
/// changes are never returned.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("{} exists but is not a git checkout", path.display())]
    NotARepository { path: PathBuf },

    #[error("failed to clone {url} (branch {branch}): {source}")]
    Clone {
        url: String,
        branch: String,
        source: VcsError,
    },

    #[error("failed to fetch remote state: {source}")]
    Fetch { source: VcsError },

    #[error("failed to diff sub-directory {sub_dir}: {source}")]
    Diff { sub_dir: SubDir, source: VcsError },

    #[error("failed to check whether {branch} is behind its remote: {source}")]
    BehindCheck { branch: String, source: VcsError },

    #[error("failed to pull {branch}: {source}")]
    Pull { branch: String, source: VcsError },

    /// `phase` is `Detect` when diffing found the branch missing, `Pull`
    /// when the behind check or the pull did.
    #[error("remote branch origin/{branch} not found")]
    RemoteBranchNotFound { branch: String, phase: Phase },
}

impl SyncError {
    /// The sync step that produced this error.
    pub fn phase(&self) -> Phase {
        match self {
            SyncError::Clone { .. } => Phase::Clone,
            SyncError::NotARepository { .. } => Phase::Open,
            SyncError::Fetch { .. } => Phase::Fetch,
            SyncError::Diff { .. } => Phase::Detect,
            SyncError::RemoteBranchNotFound { phase, .. } => *phase,
            SyncError::BehindCheck { .. } | SyncError::Pull { .. } => Phase::Pull,
        }
    }
}
