// ABOUTME: Tests for the repository sync engine against a scripted change detector.
// ABOUTME: Covers clone-or-update, per-sub-directory detection, pull gating, and error mapping.

mod support;

use std::path::Path;
use std::sync::Arc;
use voyage::deploy::Phase;
use voyage::events::{Event, PullSkipReason, RecordingSink};
use voyage::types::{RepositoryRef, SubDir};
use voyage::vcs::{InMemoryRepository, Operation, RepositorySync, SyncError, VcsError};

fn dirs(names: &[&str]) -> Vec<SubDir> {
    names.iter().map(|name| SubDir::new(name)).collect()
}

fn engine(
    local_path: &Path,
    detector: InMemoryRepository,
) -> (RepositorySync<InMemoryRepository>, Arc<RecordingSink>) {
    support::init_tracing();
    let sink = RecordingSink::new();
    let repository = RepositoryRef::new("https://example.com/mono.git", "main", local_path);
    (
        RepositorySync::new(repository, detector, sink.clone()),
        sink,
    )
}

mod fresh_clone {
    use super::*;

    #[tokio::test]
    async fn reports_every_sub_dir_as_changed() {
        let dir = tempfile::tempdir().unwrap();
        let checkout = dir.path().join("checkout");
        let (sync, _) = engine(&checkout, InMemoryRepository::new());

        let changed = sync.sync(&dirs(&["app1", "app2"])).await.unwrap();

        assert_eq!(changed, dirs(&["app1", "app2"]));
        assert!(checkout.is_dir());
    }

    #[tokio::test]
    async fn makes_no_other_calls() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, _) = engine(&dir.path().join("checkout"), InMemoryRepository::new());

        sync.sync(&dirs(&["app1"])).await.unwrap();

        assert_eq!(sync.detector().calls(), vec![Operation::Clone]);
    }

    #[tokio::test]
    async fn emits_clone_events() {
        let dir = tempfile::tempdir().unwrap();
        let checkout = dir.path().join("checkout");
        let (sync, sink) = engine(&checkout, InMemoryRepository::new());

        sync.sync(&dirs(&["app1"])).await.unwrap();

        assert_eq!(
            sink.events(),
            vec![
                Event::CloneStarted {
                    url: "https://example.com/mono.git".to_string(),
                    branch: "main".to_string(),
                    path: checkout.clone(),
                },
                Event::CloneFinished { path: checkout },
            ]
        );
    }

    #[tokio::test]
    async fn clone_failure_is_reported_with_url_and_branch() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new().failing(Operation::Clone, "host unreachable");
        let (sync, sink) = engine(&dir.path().join("checkout"), detector);

        let err = sync.sync(&dirs(&["app1"])).await.unwrap_err();

        match err {
            SyncError::Clone { url, branch, .. } => {
                assert_eq!(url, "https://example.com/mono.git");
                assert_eq!(branch, "main");
            }
            other => panic!("expected clone error, got {other:?}"),
        }
        assert!(!sink
            .events()
            .iter()
            .any(|e| matches!(e, Event::CloneFinished { .. })));
    }

    #[tokio::test]
    async fn second_sync_after_clone_reports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, _) = engine(&dir.path().join("checkout"), InMemoryRepository::new());

        sync.sync(&dirs(&["app1", "app2"])).await.unwrap();
        let changed = sync.sync(&dirs(&["app1", "app2"])).await.unwrap();

        assert!(changed.is_empty());
        assert_eq!(sync.detector().count(Operation::Clone), 1);
        assert_eq!(sync.detector().count(Operation::Pull), 0);
    }
}

mod existing_checkout {
    use super::*;

    #[tokio::test]
    async fn no_changes_leaves_working_tree_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, sink) = engine(dir.path(), InMemoryRepository::new());

        let changed = sync.sync(&dirs(&["app1", "app2"])).await.unwrap();

        assert!(changed.is_empty());
        let detector = sync.detector();
        assert_eq!(detector.count(Operation::Fetch), 1);
        assert_eq!(detector.count(Operation::PathChanged), 2);
        assert_eq!(detector.count(Operation::IsBehindRemote), 0);
        assert_eq!(detector.count(Operation::Pull), 0);
        assert_eq!(
            sink.events().last(),
            Some(&Event::PullSkipped {
                reason: PullSkipReason::NoChanges
            })
        );
    }

    #[tokio::test]
    async fn change_in_one_sub_dir_pulls_once() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new().with_remote_changes(["app2/docker-compose.yml"]);
        let (sync, _) = engine(dir.path(), detector);

        let changed = sync.sync(&dirs(&["app1", "app2", "app3"])).await.unwrap();

        assert_eq!(changed, dirs(&["app2"]));
        assert_eq!(sync.detector().count(Operation::Pull), 1);
    }

    #[tokio::test]
    async fn every_sub_dir_is_checked_even_after_a_match() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new().with_remote_changes(["app1/a.txt", "app3/b.txt"]);
        let (sync, _) = engine(dir.path(), detector);

        let changed = sync.sync(&dirs(&["app1", "app2", "app3"])).await.unwrap();

        assert_eq!(changed, dirs(&["app1", "app3"]));
        assert_eq!(
            sync.detector().checked_sub_dirs(),
            dirs(&["app1", "app2", "app3"])
        );
    }

    #[tokio::test]
    async fn result_follows_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new().with_remote_changes(["zeta/x", "alpha/y"]);
        let (sync, _) = engine(dir.path(), detector);

        let changed = sync.sync(&dirs(&["zeta", "alpha"])).await.unwrap();

        assert_eq!(changed, dirs(&["zeta", "alpha"]));
    }

    #[tokio::test]
    async fn sibling_with_shared_prefix_is_not_a_change() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new().with_remote_changes(["app10/docker-compose.yml"]);
        let (sync, _) = engine(dir.path(), detector);

        let changed = sync.sync(&dirs(&["app1", "app10"])).await.unwrap();

        assert_eq!(changed, dirs(&["app10"]));
    }

    #[tokio::test]
    async fn root_sub_dir_sees_any_change() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new().with_remote_changes(["docs/readme.md"]);
        let (sync, _) = engine(dir.path(), detector);

        let changed = sync.sync(&[SubDir::root()]).await.unwrap();

        assert_eq!(changed, vec![SubDir::root()]);
    }

    #[tokio::test]
    async fn detected_change_is_kept_when_branch_is_not_behind() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new()
            .with_remote_changes(["app1/docker-compose.yml"])
            .behind(false);
        let (sync, sink) = engine(dir.path(), detector);

        let changed = sync.sync(&dirs(&["app1"])).await.unwrap();

        assert_eq!(changed, dirs(&["app1"]));
        assert_eq!(sync.detector().count(Operation::Pull), 0);
        assert!(sink.events().contains(&Event::PullSkipped {
            reason: PullSkipReason::NotBehind
        }));
    }

    #[tokio::test]
    async fn pull_consumes_the_changes() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new().with_remote_changes(["app1/docker-compose.yml"]);
        let (sync, _) = engine(dir.path(), detector);

        let first = sync.sync(&dirs(&["app1"])).await.unwrap();
        let second = sync.sync(&dirs(&["app1"])).await.unwrap();

        assert_eq!(first, dirs(&["app1"]));
        assert!(second.is_empty());
        assert_eq!(sync.detector().count(Operation::Pull), 1);
    }

    #[tokio::test]
    async fn later_remote_commits_are_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, _) = engine(dir.path(), InMemoryRepository::new());

        assert!(sync.sync(&dirs(&["app1", "app2"])).await.unwrap().is_empty());
        sync.detector().push_remote_changes(["app1/.env"]);

        let changed = sync.sync(&dirs(&["app1", "app2"])).await.unwrap();
        assert_eq!(changed, dirs(&["app1"]));
    }

    #[tokio::test]
    async fn events_trace_each_step() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new().with_remote_changes(["app2/x"]);
        let (sync, sink) = engine(dir.path(), detector);

        sync.sync(&dirs(&["app1", "app2"])).await.unwrap();

        assert_eq!(
            sink.events(),
            vec![
                Event::CheckoutOpened {
                    path: dir.path().to_path_buf()
                },
                Event::FetchCompleted {
                    path: dir.path().to_path_buf()
                },
                Event::SubDirChecked {
                    sub_dir: SubDir::new("app1"),
                    changed: false
                },
                Event::SubDirChecked {
                    sub_dir: SubDir::new("app2"),
                    changed: true
                },
                Event::PullPerformed {
                    branch: "main".to_string()
                },
            ]
        );
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn existing_directory_that_is_not_a_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, _) = engine(dir.path(), InMemoryRepository::new().not_a_repository());

        let err = sync.sync(&dirs(&["app1"])).await.unwrap_err();

        assert!(matches!(err, SyncError::NotARepository { ref path } if path == dir.path()));
        assert_eq!(sync.detector().calls(), vec![Operation::IsRepository]);
    }

    #[tokio::test]
    async fn fetch_failure_stops_before_detection() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new().failing(Operation::Fetch, "connection reset");
        let (sync, _) = engine(dir.path(), detector);

        let err = sync.sync(&dirs(&["app1"])).await.unwrap_err();

        assert!(matches!(err, SyncError::Fetch { .. }));
        assert_eq!(sync.detector().count(Operation::PathChanged), 0);
    }

    #[tokio::test]
    async fn diff_failure_names_the_sub_dir_and_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new()
            .with_remote_changes(["app1/x"])
            .failing_path(SubDir::new("app2"), "bad object");
        let (sync, _) = engine(dir.path(), detector);

        let err = sync.sync(&dirs(&["app1", "app2", "app3"])).await.unwrap_err();

        match err {
            SyncError::Diff { sub_dir, source } => {
                assert_eq!(sub_dir, SubDir::new("app2"));
                assert!(matches!(source, VcsError::Scripted(ref m) if m == "bad object"));
            }
            other => panic!("expected diff error, got {other:?}"),
        }
        assert_eq!(sync.detector().checked_sub_dirs(), dirs(&["app1", "app2"]));
        assert_eq!(sync.detector().count(Operation::Pull), 0);
    }

    #[tokio::test]
    async fn missing_remote_branch_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let (sync, _) = engine(dir.path(), InMemoryRepository::new().without_remote_branch());

        let err = sync.sync(&dirs(&["app1"])).await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::RemoteBranchNotFound { ref branch, .. } if branch == "main"
        ));
        assert_eq!(err.phase(), Phase::Detect);
    }

    #[tokio::test]
    async fn missing_remote_branch_during_update_is_a_pull_failure() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new()
            .with_remote_changes(["app1/x"])
            .without_remote_branch_on(Operation::IsBehindRemote);
        let (sync, _) = engine(dir.path(), detector);

        let err = sync.sync(&dirs(&["app1"])).await.unwrap_err();

        assert!(matches!(err, SyncError::RemoteBranchNotFound { .. }));
        assert_eq!(err.phase(), Phase::Pull);
        assert_eq!(sync.detector().count(Operation::Pull), 0);
    }

    #[tokio::test]
    async fn missing_remote_branch_at_pull_is_a_pull_failure() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new()
            .with_remote_changes(["app1/x"])
            .without_remote_branch_on(Operation::Pull);
        let (sync, _) = engine(dir.path(), detector);

        let err = sync.sync(&dirs(&["app1"])).await.unwrap_err();

        assert!(matches!(err, SyncError::RemoteBranchNotFound { .. }));
        assert_eq!(err.phase(), Phase::Pull);
    }

    #[tokio::test]
    async fn behind_check_failure() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new()
            .with_remote_changes(["app1/x"])
            .failing(Operation::IsBehindRemote, "rev-list failed");
        let (sync, _) = engine(dir.path(), detector);

        let err = sync.sync(&dirs(&["app1"])).await.unwrap_err();

        assert!(matches!(err, SyncError::BehindCheck { .. }));
        assert_eq!(sync.detector().count(Operation::Pull), 0);
    }

    #[tokio::test]
    async fn pull_failure_reports_branch() {
        let dir = tempfile::tempdir().unwrap();
        let detector = InMemoryRepository::new()
            .with_remote_changes(["app1/x"])
            .failing(Operation::Pull, "checkout conflict");
        let (sync, sink) = engine(dir.path(), detector);

        let err = sync.sync(&dirs(&["app1"])).await.unwrap_err();

        assert!(matches!(err, SyncError::Pull { ref branch, .. } if branch == "main"));
        assert!(!sink
            .events()
            .iter()
            .any(|e| matches!(e, Event::PullPerformed { .. })));
    }
}
