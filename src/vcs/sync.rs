// ABOUTME: Incremental repository sync: clone-or-update plus per-sub-directory change detection.
// ABOUTME: Leaves the working tree untouched when no configured sub-directory changed.

use std::path::Path;

use super::detector::ChangeDetector;
use super::error::{SyncError, VcsError};
use crate::deploy::Phase;
use crate::events::{Event, PullSkipReason, SharedSink};
use crate::types::{RepositoryRef, SubDir};

/// Brings one checkout up to date and reports which sub-directories changed.
pub struct RepositorySync<D> {
    repository: RepositoryRef,
    detector: D,
    sink: SharedSink,
}

impl<D: ChangeDetector> RepositorySync<D> {
    pub fn new(repository: RepositoryRef, detector: D, sink: SharedSink) -> Self {
        Self {
            repository,
            detector,
            sink,
        }
    }

    pub fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Synchronize the checkout and return the sub-directories touched by the update.
    ///
    /// `sub_dirs` must already be distinct; the result keeps their order.
    ///
    /// - No checkout yet: clone it and report every sub-directory as changed.
    /// - Otherwise: fetch, diff each sub-directory against `origin/<branch>`,
    ///   and pull only when something changed and the branch is behind.
    ///
    /// The detected list is returned even when no pull was needed, so a
    /// positive diff is never suppressed by the state of the working tree.
    pub async fn sync(&self, sub_dirs: &[SubDir]) -> Result<Vec<SubDir>, SyncError> {
        let path = self.repository.local_path();

        if !checkout_exists(path).await {
            self.clone_checkout(path).await?;
            return Ok(sub_dirs.to_vec());
        }

        if !self.detector.is_repository(path).await {
            return Err(SyncError::NotARepository {
                path: path.to_path_buf(),
            });
        }
        self.sink.emit(Event::CheckoutOpened {
            path: path.to_path_buf(),
        });

        self.detector
            .fetch(path)
            .await
            .map_err(|source| SyncError::Fetch { source })?;
        self.sink.emit(Event::FetchCompleted {
            path: path.to_path_buf(),
        });

        let changed = self.detect_changes(path, sub_dirs).await?;

        if changed.is_empty() {
            self.sink.emit(Event::PullSkipped {
                reason: PullSkipReason::NoChanges,
            });
            return Ok(changed);
        }

        self.update_checkout(path).await?;
        Ok(changed)
    }

    async fn clone_checkout(&self, path: &Path) -> Result<(), SyncError> {
        let url = self.repository.url();
        let branch = self.repository.branch();

        self.sink.emit(Event::CloneStarted {
            url: url.to_string(),
            branch: branch.to_string(),
            path: path.to_path_buf(),
        });

        self.detector
            .clone_repo(path, url, branch)
            .await
            .map_err(|source| SyncError::Clone {
                url: url.to_string(),
                branch: branch.to_string(),
                source,
            })?;

        self.sink.emit(Event::CloneFinished {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    async fn detect_changes(
        &self,
        path: &Path,
        sub_dirs: &[SubDir],
    ) -> Result<Vec<SubDir>, SyncError> {
        let branch = self.repository.branch();
        let mut changed = Vec::new();

        for sub_dir in sub_dirs {
            let touched = self
                .detector
                .path_changed(path, branch, sub_dir)
                .await
                .map_err(|source| {
                    remote_or(source, Phase::Detect, |source| SyncError::Diff {
                        sub_dir: sub_dir.clone(),
                        source,
                    })
                })?;

            self.sink.emit(Event::SubDirChecked {
                sub_dir: sub_dir.clone(),
                changed: touched,
            });

            if touched {
                changed.push(sub_dir.clone());
            }
        }

        Ok(changed)
    }

    /// Fast-forward the checkout to its remote when it is behind.
    async fn update_checkout(&self, path: &Path) -> Result<(), SyncError> {
        let branch = self.repository.branch();

        let behind = self
            .detector
            .is_behind_remote(path, branch)
            .await
            .map_err(|source| {
                remote_or(source, Phase::Pull, |source| SyncError::BehindCheck {
                    branch: branch.to_string(),
                    source,
                })
            })?;

        if !behind {
            self.sink.emit(Event::PullSkipped {
                reason: PullSkipReason::NotBehind,
            });
            return Ok(());
        }

        self.detector
            .pull(path, branch)
            .await
            .map_err(|source| {
                remote_or(source, Phase::Pull, |source| SyncError::Pull {
                    branch: branch.to_string(),
                    source,
                })
            })?;

        self.sink.emit(Event::PullPerformed {
            branch: branch.to_string(),
        });
        Ok(())
    }
}

/// Keep a missing remote branch distinct from other failures.
fn remote_or(
    source: VcsError,
    phase: Phase,
    otherwise: impl FnOnce(VcsError) -> SyncError,
) -> SyncError {
    match source {
        VcsError::RemoteBranchNotFound(branch) => SyncError::RemoteBranchNotFound { branch, phase },
        source => otherwise(source),
    }
}

async fn checkout_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
