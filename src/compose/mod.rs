// ABOUTME: Container runtime capability for applying compose manifests.
// ABOUTME: Exposes the RuntimeApplier port, its CLI and in-memory adapters, and runtime detection.

mod applier;
mod cli;
mod detection;
mod memory;
mod types;

pub use applier::{ApplyError, RuntimeApplier};
pub use cli::ComposeCli;
pub use detection::{DetectionError, detect_local, select_runtime};
pub use memory::InMemoryApplier;
pub use types::RuntimeType;
