// ABOUTME: Identity of the checkout being synchronized.
// ABOUTME: Remote URL, tracked branch, and local checkout path.

use std::path::{Path, PathBuf};

/// One checkout: where it comes from and where it lives. Immutable for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    url: String,
    branch: String,
    local_path: PathBuf,
}

impl RepositoryRef {
    pub fn new(
        url: impl Into<String>,
        branch: impl Into<String>,
        local_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            url: url.into(),
            branch: branch.into(),
            local_path: local_path.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }
}
