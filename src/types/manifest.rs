// ABOUTME: Manifest entries derived from configured compose paths.
// ABOUTME: Preserves configuration order and groups manifests by parent directory.

use super::sub_dir::{SubDir, clean_path};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestPathError {
    #[error("manifest path cannot be empty")]
    Empty,

    #[error("manifest path must be relative to the repository: {0}")]
    Absolute(String),

    #[error("manifest path escapes the repository: {0}")]
    EscapesRepository(String),
}

/// One configured manifest and the sub-directory that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    manifest_path: String,
    sub_dir: SubDir,
}

impl ManifestEntry {
    /// Parse a repository-relative manifest path.
    ///
    /// The sub-directory is the parent portion of the cleaned path; manifests
    /// at the repository root belong to [`SubDir::root`].
    pub fn parse(path: &str) -> Result<Self, ManifestPathError> {
        if path.trim().is_empty() {
            return Err(ManifestPathError::Empty);
        }
        if path.starts_with('/') {
            return Err(ManifestPathError::Absolute(path.to_string()));
        }

        let cleaned = clean_path(path);
        if cleaned.is_empty() {
            return Err(ManifestPathError::Empty);
        }
        if cleaned == ".." || cleaned.starts_with("../") {
            return Err(ManifestPathError::EscapesRepository(path.to_string()));
        }

        let sub_dir = match cleaned.rsplit_once('/') {
            Some((parent, _)) => SubDir::new(parent),
            None => SubDir::root(),
        };

        Ok(Self {
            manifest_path: cleaned,
            sub_dir,
        })
    }

    /// Cleaned manifest path, relative to the checkout root.
    pub fn manifest_path(&self) -> &str {
        &self.manifest_path
    }

    pub fn sub_dir(&self) -> &SubDir {
        &self.sub_dir
    }
}

/// Ordered manifest entries plus their distinct sub-directories.
///
/// Sub-directories keep first-seen order, so change detection and dispatch
/// both follow configuration order.
#[derive(Debug, Clone, Default)]
pub struct ManifestSet {
    entries: Vec<ManifestEntry>,
    sub_dirs: Vec<SubDir>,
}

impl ManifestSet {
    pub fn from_paths<I, S>(paths: I) -> Result<Self, ManifestPathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = paths
            .into_iter()
            .map(|path| ManifestEntry::parse(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<ManifestEntry>) -> Self {
        let mut sub_dirs: Vec<SubDir> = Vec::new();
        for entry in &entries {
            if !sub_dirs.contains(entry.sub_dir()) {
                sub_dirs.push(entry.sub_dir().clone());
            }
        }

        Self { entries, sub_dirs }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn sub_dirs(&self) -> &[SubDir] {
        &self.sub_dirs
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
