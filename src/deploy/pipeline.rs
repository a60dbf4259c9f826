// ABOUTME: End-to-end invocation: sync, plan, then dispatch, strictly in sequence.
// ABOUTME: Errors are tagged with the phase that failed, SNAFU style.

use snafu::{ResultExt, Snafu};

use super::dispatch::Dispatcher;
use super::error::DispatchError;
use super::phase::Phase;
use super::plan::{DeployPlan, plan};
use crate::compose::RuntimeApplier;
use crate::events::{Event, SharedSink};
use crate::types::{ManifestSet, RepositoryRef, SubDir};
use crate::vcs::{ChangeDetector, RepositorySync, SyncError};

/// Failure of a whole invocation.
///
/// A sync failure means nothing was planned or dispatched.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    #[snafu(display("repository sync failed: {source}"))]
    Sync { source: SyncError },

    #[snafu(display("deployment failed: {source}"))]
    Dispatch { source: DispatchError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorKind {
    NotARepository,
    CloneFailure,
    FetchFailure,
    DiffFailure,
    BehindCheckFailure,
    PullFailure,
    RemoteBranchNotFound,
    ManifestNotFound,
    RuntimeUnavailable,
    DeployFailure,
}

impl PipelineError {
    /// Phase in which the invocation failed.
    pub fn phase(&self) -> Phase {
        match self {
            PipelineError::Sync { source } => source.phase(),
            PipelineError::Dispatch { .. } => Phase::Dispatch,
        }
    }

    pub fn kind(&self) -> PipelineErrorKind {
        match self {
            PipelineError::Sync { source } => match source {
                SyncError::NotARepository { .. } => PipelineErrorKind::NotARepository,
                SyncError::Clone { .. } => PipelineErrorKind::CloneFailure,
                SyncError::Fetch { .. } => PipelineErrorKind::FetchFailure,
                SyncError::Diff { .. } => PipelineErrorKind::DiffFailure,
                SyncError::BehindCheck { .. } => PipelineErrorKind::BehindCheckFailure,
                SyncError::Pull { .. } => PipelineErrorKind::PullFailure,
                SyncError::RemoteBranchNotFound { .. } => PipelineErrorKind::RemoteBranchNotFound,
            },
            PipelineError::Dispatch { source } => match source {
                DispatchError::ManifestNotFound { .. } => PipelineErrorKind::ManifestNotFound,
                DispatchError::RuntimeUnavailable { .. } => PipelineErrorKind::RuntimeUnavailable,
                DispatchError::Deploy { .. } => PipelineErrorKind::DeployFailure,
            },
        }
    }
}

/// What a successful invocation did.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Sub-directories reported changed by the sync.
    pub changed: Vec<SubDir>,
    pub plan: DeployPlan,
    /// Manifests applied, in order.
    pub applied: Vec<String>,
}

/// Wires sync, planning, and dispatch for one checkout.
pub struct Pipeline<D, A> {
    manifests: ManifestSet,
    sync: RepositorySync<D>,
    dispatcher: Dispatcher<A>,
    force: bool,
    sink: SharedSink,
}

impl<D: ChangeDetector, A: RuntimeApplier> Pipeline<D, A> {
    pub fn new(
        repository: RepositoryRef,
        manifests: ManifestSet,
        detector: D,
        applier: A,
        sink: SharedSink,
    ) -> Self {
        let dispatcher = Dispatcher::new(repository.local_path(), applier, sink.clone());
        Self {
            manifests,
            sync: RepositorySync::new(repository, detector, sink.clone()),
            dispatcher,
            force: false,
            sink,
        }
    }

    /// Redeploy every manifest when nothing changed.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Whether services are started detached.
    pub fn daemon(mut self, daemon: bool) -> Self {
        self.dispatcher = self.dispatcher.daemon(daemon);
        self
    }

    pub fn manifests(&self) -> &ManifestSet {
        &self.manifests
    }

    pub fn detector(&self) -> &D {
        self.sync.detector()
    }

    pub fn applier(&self) -> &A {
        self.dispatcher.applier()
    }

    /// Run one invocation to completion.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let changed = self
            .sync
            .sync(self.manifests.sub_dirs())
            .await
            .context(SyncSnafu)?;

        let plan = plan(self.manifests.entries(), &changed, self.force);
        self.sink.emit(Event::PlanComputed {
            manifests: plan.manifests().to_vec(),
            forced: plan.is_forced(),
        });

        let report = self
            .dispatcher
            .run(plan.manifests())
            .await
            .context(DispatchSnafu)?;

        Ok(PipelineReport {
            changed,
            plan,
            applied: report.applied,
        })
    }
}
