// ABOUTME: Sequential, fail-fast application of planned manifests.
// ABOUTME: Stops at the first failure and never rolls back what was already applied.

use std::path::{Path, PathBuf};

use super::error::DispatchError;
use crate::compose::{ApplyError, RuntimeApplier};
use crate::events::{Event, SharedSink};

/// Outcome of a successful dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Manifests applied, in order.
    pub applied: Vec<String>,
}

/// Applies manifests from a checkout one at a time.
pub struct Dispatcher<A> {
    checkout_root: PathBuf,
    applier: A,
    daemon: bool,
    sink: SharedSink,
}

impl<A: RuntimeApplier> Dispatcher<A> {
    /// Create a dispatcher that starts services detached.
    ///
    /// A relative `checkout_root` is resolved against the current directory
    /// here, so manifests always reach the runtime as absolute paths.
    pub fn new(checkout_root: impl Into<PathBuf>, applier: A, sink: SharedSink) -> Self {
        Self {
            checkout_root: absolute_root(checkout_root.into()),
            applier,
            daemon: true,
            sink,
        }
    }

    /// Whether services are started detached.
    pub fn daemon(mut self, daemon: bool) -> Self {
        self.daemon = daemon;
        self
    }

    pub fn applier(&self) -> &A {
        &self.applier
    }

    pub fn checkout_root(&self) -> &Path {
        &self.checkout_root
    }

    /// Apply `manifests` in order, stopping at the first failure.
    pub async fn run(&self, manifests: &[String]) -> Result<DispatchReport, DispatchError> {
        let mut applied = Vec::with_capacity(manifests.len());

        for manifest in manifests {
            self.sink.emit(Event::DispatchStarted {
                manifest: manifest.clone(),
            });

            if let Err(err) = self.apply_one(manifest, &applied).await {
                self.sink.emit(Event::DispatchFailed {
                    manifest: manifest.clone(),
                    error: err.to_string(),
                });
                return Err(err);
            }

            self.sink.emit(Event::DispatchSucceeded {
                manifest: manifest.clone(),
            });
            applied.push(manifest.clone());
        }

        Ok(DispatchReport { applied })
    }

    async fn apply_one(&self, manifest: &str, applied: &[String]) -> Result<(), DispatchError> {
        let path = self.checkout_root.join(manifest);

        if !is_file(&path).await {
            return Err(DispatchError::ManifestNotFound {
                manifest: manifest.to_string(),
                path,
                applied: applied.to_vec(),
            });
        }

        self.applier
            .apply(&path, self.daemon)
            .await
            .map_err(|source| match source {
                ApplyError::RuntimeUnavailable(_) => DispatchError::RuntimeUnavailable {
                    manifest: manifest.to_string(),
                    source,
                    applied: applied.to_vec(),
                },
                ApplyError::Failed(_) => DispatchError::Deploy {
                    manifest: manifest.to_string(),
                    source,
                    applied: applied.to_vec(),
                },
            })
    }
}

fn absolute_root(root: PathBuf) -> PathBuf {
    // Only an empty path fails to resolve; it then fails at the manifest lookup.
    std::path::absolute(&root).unwrap_or(root)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
