// ABOUTME: In-memory RuntimeApplier for deterministic dispatch tests.
// ABOUTME: Records applied manifests and fails on scripted manifests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

use super::applier::{ApplyError, RuntimeApplier};

/// A fake runtime that remembers what it was asked to apply.
#[derive(Debug, Default)]
pub struct InMemoryApplier {
    unavailable: bool,
    failures: Vec<PathBuf>,
    applied: Mutex<Vec<(PathBuf, bool)>>,
    attempts: Mutex<Vec<PathBuf>>,
}

impl InMemoryApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the runtime as unreachable for every apply.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Fail applies whose path ends with `manifest` (component-wise).
    pub fn failing_on(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.failures.push(manifest.into());
        self
    }

    /// Manifests applied successfully, with the daemon flag used.
    pub fn applied(&self) -> Vec<(PathBuf, bool)> {
        self.applied.lock().clone()
    }

    /// Every manifest passed to `apply`, successful or not.
    pub fn attempts(&self) -> Vec<PathBuf> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl RuntimeApplier for InMemoryApplier {
    async fn apply(&self, manifest: &Path, daemon: bool) -> Result<(), ApplyError> {
        self.attempts.lock().push(manifest.to_path_buf());

        if self.unavailable {
            return Err(ApplyError::RuntimeUnavailable(
                "runtime daemon is not running".to_string(),
            ));
        }

        if self.failures.iter().any(|failing| manifest.ends_with(failing)) {
            return Err(ApplyError::Failed(format!(
                "scripted failure for {}",
                manifest.display()
            )));
        }

        self.applied.lock().push((manifest.to_path_buf(), daemon));
        Ok(())
    }
}
