// ABOUTME: Version-control capability and the incremental repository sync engine.
// ABOUTME: Exposes the ChangeDetector port, its git CLI and in-memory adapters, and RepositorySync.

mod detector;
mod error;
mod git;
mod memory;
mod sync;

pub use detector::ChangeDetector;
pub use error::{SyncError, VcsError};
pub use git::GitCli;
pub use memory::{InMemoryRepository, Operation};
pub use sync::RepositorySync;
