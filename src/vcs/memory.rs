// ABOUTME: In-memory ChangeDetector for deterministic tests without a git binary.
// ABOUTME: Scripted remote changes and failures; records every call in order.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

use super::detector::ChangeDetector;
use super::error::VcsError;
use crate::types::SubDir;

/// ChangeDetector operations, used to script failures and inspect calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    IsRepository,
    Fetch,
    IsBehindRemote,
    Pull,
    Clone,
    PathChanged,
}

#[derive(Debug)]
struct State {
    is_repository: bool,
    /// Operations that find `origin/<branch>` missing.
    missing_branch_on: Vec<Operation>,
    /// Files that differ between the local branch and its remote.
    pending: Vec<String>,
    /// Files written into the checkout when it is cloned.
    checkout_files: Vec<String>,
    behind: bool,
    failures: HashMap<Operation, String>,
    path_failures: HashMap<SubDir, String>,
    calls: Vec<Operation>,
    checked: Vec<SubDir>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            is_repository: true,
            missing_branch_on: Vec::new(),
            pending: Vec::new(),
            checkout_files: Vec::new(),
            behind: false,
            failures: HashMap::new(),
            path_failures: HashMap::new(),
            calls: Vec::new(),
            checked: Vec::new(),
        }
    }
}

impl State {
    fn record(&mut self, operation: Operation) -> Result<(), VcsError> {
        self.calls.push(operation);
        match self.failures.get(&operation) {
            Some(message) => Err(VcsError::Scripted(message.clone())),
            None => Ok(()),
        }
    }

    fn require_remote_branch(&self, operation: Operation, branch: &str) -> Result<(), VcsError> {
        if self.missing_branch_on.contains(&operation) {
            Err(VcsError::RemoteBranchNotFound(branch.to_string()))
        } else {
            Ok(())
        }
    }
}

/// A scripted checkout whose remote state lives in memory.
///
/// Cloning materializes the checkout directory (and any scripted files) on
/// disk so that later syncs and dispatches find them; everything else is
/// simulated. Pulling applies the pending remote
/// changes, after which no paths differ.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files changed on the remote and not yet pulled. Marks the branch behind.
    pub fn with_remote_changes<I, S>(self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_remote_changes(files);
        self
    }

    /// Files (relative paths) that cloning writes into the checkout directory.
    pub fn with_checkout_files<I, S>(self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .checkout_files
            .extend(files.into_iter().map(Into::into));
        self
    }

    /// Override whether the local branch is behind its remote.
    pub fn behind(self, behind: bool) -> Self {
        self.state.lock().behind = behind;
        self
    }

    /// The existing directory is not a valid checkout.
    pub fn not_a_repository(self) -> Self {
        self.state.lock().is_repository = false;
        self
    }

    /// `origin/<branch>` does not exist.
    pub fn without_remote_branch(self) -> Self {
        [Operation::PathChanged, Operation::IsBehindRemote, Operation::Pull]
            .into_iter()
            .fold(self, Self::without_remote_branch_on)
    }

    /// `origin/<branch>` is missing only when `operation` looks for it.
    pub fn without_remote_branch_on(self, operation: Operation) -> Self {
        self.state.lock().missing_branch_on.push(operation);
        self
    }

    /// Make every call to `operation` fail with `message`.
    pub fn failing(self, operation: Operation, message: impl Into<String>) -> Self {
        self.state.lock().failures.insert(operation, message.into());
        self
    }

    /// Make `path_changed` fail for one sub-directory only.
    pub fn failing_path(self, sub_dir: SubDir, message: impl Into<String>) -> Self {
        self.state.lock().path_failures.insert(sub_dir, message.into());
        self
    }

    /// Simulate new commits landing on the remote.
    pub fn push_remote_changes<I, S>(&self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.lock();
        let before = state.pending.len();
        state.pending.extend(files.into_iter().map(Into::into));
        if state.pending.len() > before {
            state.behind = true;
        }
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.state.lock().calls.clone()
    }

    /// Number of calls made to `operation`.
    pub fn count(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    /// Sub-directories passed to `path_changed`, in order.
    pub fn checked_sub_dirs(&self) -> Vec<SubDir> {
        self.state.lock().checked.clone()
    }
}

#[async_trait]
impl ChangeDetector for InMemoryRepository {
    async fn is_repository(&self, _path: &Path) -> bool {
        let mut state = self.state.lock();
        state.calls.push(Operation::IsRepository);
        state.is_repository
    }

    async fn fetch(&self, _path: &Path) -> Result<(), VcsError> {
        self.state.lock().record(Operation::Fetch)
    }

    async fn is_behind_remote(&self, _path: &Path, branch: &str) -> Result<bool, VcsError> {
        let mut state = self.state.lock();
        state.record(Operation::IsBehindRemote)?;
        state.require_remote_branch(Operation::IsBehindRemote, branch)?;
        Ok(state.behind)
    }

    async fn pull(&self, _path: &Path, branch: &str) -> Result<(), VcsError> {
        let mut state = self.state.lock();
        state.record(Operation::Pull)?;
        state.require_remote_branch(Operation::Pull, branch)?;
        state.pending.clear();
        state.behind = false;
        Ok(())
    }

    async fn clone_repo(&self, path: &Path, _url: &str, _branch: &str) -> Result<(), VcsError> {
        let mut state = self.state.lock();
        state.record(Operation::Clone)?;
        std::fs::create_dir_all(path)?;
        for file in &state.checkout_files {
            let target = path.join(file);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, "")?;
        }
        state.is_repository = true;
        state.pending.clear();
        state.behind = false;
        Ok(())
    }

    async fn path_changed(
        &self,
        _path: &Path,
        branch: &str,
        sub_dir: &SubDir,
    ) -> Result<bool, VcsError> {
        let mut state = self.state.lock();
        state.record(Operation::PathChanged)?;
        state.checked.push(sub_dir.clone());
        if let Some(message) = state.path_failures.get(sub_dir) {
            return Err(VcsError::Scripted(message.clone()));
        }
        state.require_remote_branch(Operation::PathChanged, branch)?;
        Ok(state.pending.iter().any(|file| sub_dir.contains(file)))
    }
}
