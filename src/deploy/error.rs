// ABOUTME: Error types for manifest dispatch.
// ABOUTME: Each error names the failing manifest, the stage, and what was already applied.

use std::path::PathBuf;

use crate::compose::ApplyError;

/// Dispatch step at which a manifest failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    /// Locating the manifest inside the checkout.
    Resolve,
    /// Applying the manifest with the runtime.
    Apply,
}

/// First failure of a dispatch run. Manifests applied before it stay applied.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("manifest {manifest} not found at {}", path.display())]
    ManifestNotFound {
        manifest: String,
        path: PathBuf,
        applied: Vec<String>,
    },

    #[error("cannot deploy {manifest}: {source}")]
    RuntimeUnavailable {
        manifest: String,
        source: ApplyError,
        applied: Vec<String>,
    },

    #[error("failed to deploy {manifest}: {source}")]
    Deploy {
        manifest: String,
        source: ApplyError,
        applied: Vec<String>,
    },
}

impl DispatchError {
    /// The manifest that failed, as configured.
    pub fn manifest(&self) -> &str {
        match self {
            DispatchError::ManifestNotFound { manifest, .. }
            | DispatchError::RuntimeUnavailable { manifest, .. }
            | DispatchError::Deploy { manifest, .. } => manifest,
        }
    }

    pub fn stage(&self) -> DispatchStage {
        match self {
            DispatchError::ManifestNotFound { .. } => DispatchStage::Resolve,
            DispatchError::RuntimeUnavailable { .. } | DispatchError::Deploy { .. } => {
                DispatchStage::Apply
            }
        }
    }

    /// Manifests applied in this run before the failure.
    pub fn applied(&self) -> &[String] {
        match self {
            DispatchError::ManifestNotFound { applied, .. }
            | DispatchError::RuntimeUnavailable { applied, .. }
            | DispatchError::Deploy { applied, .. } => applied,
        }
    }
}
