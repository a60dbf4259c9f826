// ABOUTME: RuntimeApplier backed by the docker or podman command line.
// ABOUTME: Verifies the daemon and compose support before running `compose up`.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use super::applier::{ApplyError, RuntimeApplier};
use super::types::RuntimeType;
use crate::process::{capture, stream};

/// Applies manifests with `<runtime> compose -f <manifest> up`.
#[derive(Debug, Clone)]
pub struct ComposeCli {
    runtime: RuntimeType,
}

impl ComposeCli {
    pub fn new(runtime: RuntimeType) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> RuntimeType {
        self.runtime
    }

    fn command(&self) -> Command {
        Command::new(self.runtime.program())
    }

    async fn ensure_available(&self) -> Result<(), ApplyError> {
        let program = self.runtime.program();

        let info = capture(self.command().arg("info"))
            .await
            .map_err(|e| ApplyError::RuntimeUnavailable(format!("failed to run {program}: {e}")))?;
        if !info.success() {
            return Err(ApplyError::RuntimeUnavailable(format!(
                "{program} daemon is not running ({})",
                info.failure_detail()
            )));
        }

        let compose = capture(self.command().args(["compose", "version"]))
            .await
            .map_err(|e| ApplyError::RuntimeUnavailable(format!("failed to run {program}: {e}")))?;
        if !compose.success() {
            return Err(ApplyError::RuntimeUnavailable(format!(
                "{program} compose is not installed ({})",
                compose.failure_detail()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl RuntimeApplier for ComposeCli {
    async fn apply(&self, manifest: &Path, daemon: bool) -> Result<(), ApplyError> {
        self.ensure_available().await?;

        let mut cmd = self.command();
        cmd.arg("compose").arg("-f").arg(manifest).arg("up");
        if daemon {
            cmd.arg("-d");
        }
        if let Some(dir) = manifest.parent() {
            cmd.current_dir(dir);
        }

        // Compose output (pulls, builds, attached logs) goes to the operator live.
        let exit_code = stream(&mut cmd)
            .await
            .map_err(|e| ApplyError::Failed(e.to_string()))?;

        match exit_code {
            Some(0) => Ok(()),
            Some(code) => Err(ApplyError::Failed(format!("compose up exited with status {code}"))),
            None => Err(ApplyError::Failed("compose up was terminated by a signal".to_string())),
        }
    }
}
