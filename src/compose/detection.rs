// ABOUTME: Picks the container runtime that applies compose manifests.
// ABOUTME: Explicit configuration wins, then host variables, then well-known sockets.

use super::types::RuntimeType;
use std::path::Path;

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container runtime found (checked CONTAINER_HOST, DOCKER_HOST and local sockets)")]
    NoRuntimeFound,
}

/// Detect the runtime available on this machine.
///
/// `CONTAINER_HOST` points at Podman and `DOCKER_HOST` at Docker. Without
/// either, the rootless Podman socket, the rootful Podman socket, and the
/// Docker socket are checked in that order.
pub fn detect_local() -> Result<RuntimeType, DetectionError> {
    detect_with(|name| std::env::var(name).ok(), |path| Path::new(path).exists())
}

fn detect_with(
    env: impl Fn(&str) -> Option<String>,
    exists: impl Fn(&str) -> bool,
) -> Result<RuntimeType, DetectionError> {
    let set = |name: &str| env(name).is_some_and(|v| !v.trim().is_empty());

    if set("CONTAINER_HOST") {
        return Ok(RuntimeType::Podman);
    }
    if set("DOCKER_HOST") {
        return Ok(RuntimeType::Docker);
    }

    let rootless = current_uid(&env).map(|uid| format!("/run/user/{uid}/podman/podman.sock"));
    if rootless.as_deref().is_some_and(&exists) || exists(ROOTFUL_PODMAN) {
        return Ok(RuntimeType::Podman);
    }
    if exists(DOCKER_SOCKET) {
        return Ok(RuntimeType::Docker);
    }

    Err(DetectionError::NoRuntimeFound)
}

/// Pick the runtime to deploy with.
///
/// Falls back to Docker when nothing is detected; an unreachable runtime is
/// then reported by the apply step.
pub fn select_runtime(configured: Option<RuntimeType>) -> RuntimeType {
    configured
        .or_else(|| detect_local().ok())
        .unwrap_or(RuntimeType::Docker)
}

fn current_uid(env: &impl Fn(&str) -> Option<String>) -> Option<String> {
    env("UID").or_else(|| {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        status
            .lines()
            .find(|line| line.starts_with("Uid:"))
            .and_then(|line| line.split_whitespace().nth(1))
            .map(str::to_string)
    })
}
