// ABOUTME: Structured phase-boundary events and the sink capability that receives them.
// ABOUTME: TracingSink forwards to tracing; RecordingSink keeps events in memory for tests.

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

use crate::types::SubDir;

/// Why the sync engine left the working tree untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullSkipReason {
    /// No configured sub-directory changed.
    NoChanges,
    /// Changes were detected but the local branch is not behind its remote.
    NotBehind,
}

/// A single observable step of a sync-and-deploy invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CloneStarted {
        url: String,
        branch: String,
        path: PathBuf,
    },
    CloneFinished {
        path: PathBuf,
    },
    CheckoutOpened {
        path: PathBuf,
    },
    FetchCompleted {
        path: PathBuf,
    },
    SubDirChecked {
        sub_dir: SubDir,
        changed: bool,
    },
    PullPerformed {
        branch: String,
    },
    PullSkipped {
        reason: PullSkipReason,
    },
    PlanComputed {
        manifests: Vec<String>,
        forced: bool,
    },
    DispatchStarted {
        manifest: String,
    },
    DispatchSucceeded {
        manifest: String,
    },
    DispatchFailed {
        manifest: String,
        error: String,
    },
}

/// Receives events from the sync engine, planner, and dispatcher.
///
/// Components hold a sink handed to them at construction and never reach for
/// process-wide logging state themselves.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Shared handle to a sink.
pub type SharedSink = Arc<dyn EventSink>;

/// Sink that forwards every event to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    pub fn shared() -> SharedSink {
        Arc::new(Self)
    }
}

impl EventSink for TracingSink {
    fn emit(&self, event: Event) {
        match event {
            Event::CloneStarted { url, branch, path } => {
                tracing::info!(%url, %branch, path = %path.display(), "cloning repository");
            }
            Event::CloneFinished { path } => {
                tracing::info!(path = %path.display(), "clone finished");
            }
            Event::CheckoutOpened { path } => {
                tracing::debug!(path = %path.display(), "opened existing checkout");
            }
            Event::FetchCompleted { path } => {
                tracing::debug!(path = %path.display(), "fetched remote state");
            }
            Event::SubDirChecked { sub_dir, changed } => {
                tracing::debug!(%sub_dir, changed, "checked sub-directory for changes");
            }
            Event::PullPerformed { branch } => {
                tracing::info!(%branch, "pulled remote changes");
            }
            Event::PullSkipped { reason } => {
                tracing::debug!(?reason, "pull skipped");
            }
            Event::PlanComputed { manifests, forced } => {
                tracing::info!(?manifests, forced, "deployment plan computed");
            }
            Event::DispatchStarted { manifest } => {
                tracing::info!(%manifest, "deploying manifest");
            }
            Event::DispatchSucceeded { manifest } => {
                tracing::info!(%manifest, "manifest deployed");
            }
            Event::DispatchFailed { manifest, error } => {
                tracing::error!(%manifest, %error, "manifest deployment failed");
            }
        }
    }
}

/// Sink that records events in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of every event recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: Event) {
        self.events.lock().push(event);
    }
}
