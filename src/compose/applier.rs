// ABOUTME: RuntimeApplier port consumed by the deployment dispatcher.
// ABOUTME: Distinguishes an unreachable runtime from a failed apply.

use async_trait::async_trait;
use std::path::Path;

/// Applies a single compose manifest.
#[async_trait]
pub trait RuntimeApplier: Send + Sync {
    /// Bring up the services described by `manifest`.
    ///
    /// Implementations verify the runtime is reachable before applying.
    /// With `daemon` set the services are started detached.
    async fn apply(&self, manifest: &Path, daemon: bool) -> Result<(), ApplyError>;
}

/// Errors from applying a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// The runtime daemon or its compose support cannot be reached.
    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    /// The runtime was reachable but the apply itself failed.
    #[error("compose up failed: {0}")]
    Failed(String),
}
