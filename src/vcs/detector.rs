// ABOUTME: ChangeDetector port consumed by the sync engine.
// ABOUTME: Path-scoped diffing and checkout state queries against a git working copy.

use async_trait::async_trait;
use std::path::Path;

use super::error::VcsError;
use crate::types::SubDir;

/// Version-control operations the sync engine depends on.
///
/// Each call is atomic from the engine's point of view: it either succeeds or
/// fails as a unit. Implementations never retry.
#[async_trait]
pub trait ChangeDetector: Send + Sync {
    /// Whether `path` is the root of a usable checkout.
    async fn is_repository(&self, path: &Path) -> bool;

    /// Update remote-tracking state from `origin`.
    async fn fetch(&self, path: &Path) -> Result<(), VcsError>;

    /// Whether `origin/<branch>` has commits the local branch lacks.
    async fn is_behind_remote(&self, path: &Path, branch: &str) -> Result<bool, VcsError>;

    /// Move the local branch and working tree to `origin/<branch>`.
    ///
    /// Remote is authoritative: local drift in tracked files is discarded.
    async fn pull(&self, path: &Path, branch: &str) -> Result<(), VcsError>;

    /// Clone a single branch of `url` into `path`.
    async fn clone_repo(&self, path: &Path, url: &str, branch: &str) -> Result<(), VcsError>;

    /// Whether any file differing between `<branch>` and `origin/<branch>`
    /// lies under `sub_dir`.
    async fn path_changed(
        &self,
        path: &Path,
        branch: &str,
        sub_dir: &SubDir,
    ) -> Result<bool, VcsError>;
}
