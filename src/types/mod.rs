// ABOUTME: Validated domain types shared by sync, planning, and dispatch.
// ABOUTME: Sub-directory scoping, manifest entries, and repository references.

mod manifest;
mod repository;
mod sub_dir;

pub use manifest::{ManifestEntry, ManifestPathError, ManifestSet};
pub use repository::RepositoryRef;
pub use sub_dir::{SubDir, clean_path};
