// ABOUTME: End-to-end tests of sync, plan, and dispatch with in-memory adapters.
// ABOUTME: Checks phase ordering, force semantics, and how failures are tagged.

mod support;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use voyage::compose::InMemoryApplier;
use voyage::deploy::{Phase, Pipeline, PipelineErrorKind, PlanReason};
use voyage::events::{Event, RecordingSink};
use voyage::types::{ManifestSet, RepositoryRef, SubDir};
use voyage::vcs::{InMemoryRepository, Operation};

const MANIFESTS: [&str; 3] = [
    "app1/docker-compose.yml",
    "app2/docker-compose.yml",
    "app3/docker-compose.yml",
];

type TestPipeline = Pipeline<InMemoryRepository, InMemoryApplier>;

fn pipeline(
    local_path: &Path,
    detector: InMemoryRepository,
    applier: InMemoryApplier,
) -> (TestPipeline, Arc<RecordingSink>) {
    support::init_tracing();
    let sink = RecordingSink::new();
    let repository = RepositoryRef::new("git@example.com:org/mono.git", "main", local_path);
    let manifests = ManifestSet::from_paths(MANIFESTS).unwrap();
    (
        Pipeline::new(repository, manifests, detector, applier, sink.clone()),
        sink,
    )
}

/// A checkout directory that already holds every manifest.
fn existing_checkout() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for manifest in MANIFESTS {
        let path = dir.path().join(manifest);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "services: {}\n").unwrap();
    }
    dir
}

fn applied_names(pipeline: &TestPipeline, root: &Path) -> Vec<String> {
    pipeline
        .applier()
        .applied()
        .into_iter()
        .map(|(path, _)| {
            path.strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

#[tokio::test]
async fn first_run_clones_and_deploys_everything() {
    let dir = tempfile::tempdir().unwrap();
    let checkout = dir.path().join("checkout");
    let detector = InMemoryRepository::new().with_checkout_files(MANIFESTS);
    let (pipeline, _) = pipeline(&checkout, detector, InMemoryApplier::new());

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.changed.len(), 3);
    assert_eq!(report.plan.reason(), PlanReason::Changed);
    assert_eq!(report.applied, MANIFESTS);
    assert_eq!(applied_names(&pipeline, &checkout), MANIFESTS);
}

#[tokio::test]
async fn unchanged_checkout_deploys_nothing() {
    let dir = existing_checkout();
    let (pipeline, _) = pipeline(dir.path(), InMemoryRepository::new(), InMemoryApplier::new());

    let report = pipeline.run().await.unwrap();

    assert!(report.changed.is_empty());
    assert_eq!(report.plan.reason(), PlanReason::NoChanges);
    assert!(report.applied.is_empty());
    assert!(pipeline.applier().attempts().is_empty());
}

#[tokio::test]
async fn force_redeploys_everything_when_nothing_changed() {
    let dir = existing_checkout();
    let (pipeline, sink) = pipeline(dir.path(), InMemoryRepository::new(), InMemoryApplier::new());
    let pipeline = pipeline.force(true);

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.applied, MANIFESTS);
    assert!(sink.events().contains(&Event::PlanComputed {
        manifests: MANIFESTS.iter().map(|m| m.to_string()).collect(),
        forced: true,
    }));
}

#[tokio::test]
async fn only_changed_sub_dirs_are_redeployed() {
    let dir = existing_checkout();
    let detector = InMemoryRepository::new().with_remote_changes(["app3/.env", "app1/Dockerfile"]);
    let applier = InMemoryApplier::new().failing_on("app2/docker-compose.yml");
    let (pipeline, _) = pipeline(dir.path(), detector, applier);

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.changed, vec![SubDir::new("app1"), SubDir::new("app3")]);
    assert_eq!(
        report.applied,
        ["app1/docker-compose.yml", "app3/docker-compose.yml"]
    );
    assert_eq!(pipeline.detector().count(Operation::Pull), 1);
}

#[tokio::test]
async fn foreground_flag_reaches_the_runtime() {
    let dir = existing_checkout();
    let detector = InMemoryRepository::new().with_remote_changes(["app2/x"]);
    let (pipeline, _) = pipeline(dir.path(), detector, InMemoryApplier::new());
    let pipeline = pipeline.daemon(false);

    pipeline.run().await.unwrap();

    let applied = pipeline.applier().applied();
    assert_eq!(applied.len(), 1);
    assert!(!applied[0].1);
}

#[tokio::test]
async fn sync_failure_prevents_planning_and_dispatch() {
    let dir = existing_checkout();
    let detector = InMemoryRepository::new()
        .with_remote_changes(["app1/x"])
        .failing(Operation::Fetch, "network unreachable");
    let (pipeline, sink) = pipeline(dir.path(), detector, InMemoryApplier::new());
    let pipeline = pipeline.force(true);

    let err = pipeline.run().await.unwrap_err();

    assert_eq!(err.phase(), Phase::Fetch);
    assert_eq!(err.kind(), PipelineErrorKind::FetchFailure);
    assert!(err.to_string().contains("network unreachable"));
    assert!(pipeline.applier().attempts().is_empty());
    assert!(!sink
        .events()
        .iter()
        .any(|e| matches!(e, Event::PlanComputed { .. })));
}

#[tokio::test]
async fn clone_failure_is_tagged_with_clone_phase() {
    let dir = tempfile::tempdir().unwrap();
    let detector = InMemoryRepository::new().failing(Operation::Clone, "repository not found");
    let (pipeline, _) = pipeline(&dir.path().join("checkout"), detector, InMemoryApplier::new());

    let err = pipeline.run().await.unwrap_err();

    assert_eq!(err.phase(), Phase::Clone);
    assert_eq!(err.kind(), PipelineErrorKind::CloneFailure);
}

#[tokio::test]
async fn missing_remote_branch_fails_detection() {
    let dir = existing_checkout();
    let (pipeline, _) = pipeline(
        dir.path(),
        InMemoryRepository::new().without_remote_branch(),
        InMemoryApplier::new(),
    );

    let err = pipeline.run().await.unwrap_err();

    assert_eq!(err.phase(), Phase::Detect);
    assert_eq!(err.kind(), PipelineErrorKind::RemoteBranchNotFound);
}

#[tokio::test]
async fn missing_remote_branch_while_updating_fails_the_pull() {
    let dir = existing_checkout();
    let detector = InMemoryRepository::new()
        .with_remote_changes(["app1/x"])
        .without_remote_branch_on(Operation::IsBehindRemote);
    let (pipeline, _) = pipeline(dir.path(), detector, InMemoryApplier::new());

    let err = pipeline.run().await.unwrap_err();

    assert_eq!(err.phase(), Phase::Pull);
    assert_eq!(err.kind(), PipelineErrorKind::RemoteBranchNotFound);
    assert!(pipeline.applier().attempts().is_empty());
}

#[tokio::test]
async fn dispatch_failure_is_tagged_with_dispatch_phase() {
    let dir = existing_checkout();
    let detector = InMemoryRepository::new().with_remote_changes(["app1/x", "app2/y"]);
    let applier = InMemoryApplier::new().failing_on("app2/docker-compose.yml");
    let (pipeline, _) = pipeline(dir.path(), detector, applier);

    let err = pipeline.run().await.unwrap_err();

    assert_eq!(err.phase(), Phase::Dispatch);
    assert_eq!(err.kind(), PipelineErrorKind::DeployFailure);
    assert_eq!(applied_names(&pipeline, dir.path()), ["app1/docker-compose.yml"]);
}

#[tokio::test]
async fn manifest_missing_from_checkout() {
    let dir = tempfile::tempdir().unwrap();
    let detector = InMemoryRepository::new().with_remote_changes(["app1/x"]);
    let (pipeline, _) = pipeline(dir.path(), detector, InMemoryApplier::new());

    let err = pipeline.run().await.unwrap_err();

    assert_eq!(err.kind(), PipelineErrorKind::ManifestNotFound);
}

#[tokio::test]
async fn unavailable_runtime_is_reported_after_sync() {
    let dir = existing_checkout();
    let detector = InMemoryRepository::new().with_remote_changes(["app1/x"]);
    let (pipeline, _) = pipeline(dir.path(), detector, InMemoryApplier::new().unavailable());

    let err = pipeline.run().await.unwrap_err();

    assert_eq!(err.kind(), PipelineErrorKind::RuntimeUnavailable);
    assert_eq!(pipeline.detector().count(Operation::Pull), 1);
}

#[tokio::test]
async fn repeated_runs_deploy_only_new_changes() {
    let dir = existing_checkout();
    let detector = InMemoryRepository::new().with_remote_changes(["app1/x"]);
    let (pipeline, _) = pipeline(dir.path(), detector, InMemoryApplier::new());

    let first = pipeline.run().await.unwrap();
    let second = pipeline.run().await.unwrap();
    pipeline.detector().push_remote_changes(["app2/y"]);
    let third = pipeline.run().await.unwrap();

    assert_eq!(first.applied, ["app1/docker-compose.yml"]);
    assert!(second.applied.is_empty());
    assert_eq!(third.applied, ["app2/docker-compose.yml"]);
}
