// ABOUTME: Throwaway git repositories acting as the remote for sync tests.
// ABOUTME: Commits are made with a fixed identity so no user config is needed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tempfile::TempDir;

pub const BRANCH: &str = "main";

/// Whether a usable `git` binary is on PATH.
pub fn git_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    })
}

/// Run git in `dir`, panicking with its stderr on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=voyage-tests",
            "-c",
            "user.email=voyage-tests@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "init.defaultBranch=main",
        ])
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A non-bare repository on `main` that clones and fetches read from.
pub struct RemoteRepo {
    dir: TempDir,
}

impl RemoteRepo {
    /// Create the repository with an initial commit containing `files`.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
        let repo = Self { dir };
        repo.commit(files, "initial");
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Clone URL for this repository.
    pub fn url(&self) -> String {
        self.dir.path().display().to_string()
    }

    /// Write `files` and commit them on the current branch.
    pub fn commit(&self, files: &[(&str, &str)], message: &str) {
        for (name, contents) in files {
            let target = self.dir.path().join(name);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).expect("failed to create parent dir");
            }
            fs::write(&target, contents).expect("failed to write file");
        }
        git(self.dir.path(), &["add", "-A"]);
        git(self.dir.path(), &["commit", "-q", "-m", message]);
    }

    /// Rename `main` so `origin/main` disappears on the next pruning fetch.
    pub fn rename_branch(&self, to: &str) {
        git(self.dir.path(), &["branch", "-m", BRANCH, to]);
    }
}

/// A scratch directory with a not-yet-created checkout location inside it.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn checkout(&self) -> PathBuf {
        self.dir.path().join("checkout")
    }
}
