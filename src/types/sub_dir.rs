// ABOUTME: Repository sub-directory used as the unit of change detection.
// ABOUTME: Path containment uses a trailing separator boundary, so "app1" never owns "app10/".

use std::fmt;

/// A cleaned, repository-relative directory. The empty value is the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubDir(String);

impl SubDir {
    /// The repository root, which contains every path.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Build a sub-directory from a relative path, cleaning it first.
    ///
    /// `"."`, `""` and `"./"` all collapse to the root.
    pub fn new(value: &str) -> Self {
        Self(clean_path(value))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a repository-relative file path lies under this directory.
    ///
    /// The file path is cleaned before comparison. A path equal to the
    /// directory itself counts as contained, matching git pathspec behavior.
    pub fn contains(&self, path: &str) -> bool {
        let path = clean_path(path);
        if path.is_empty() {
            return false;
        }
        if self.is_root() {
            return true;
        }

        match path.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for SubDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Lexically clean a slash-separated relative path.
///
/// Empty and `.` segments are dropped, `..` pops the previous segment, and
/// leading or trailing separators are removed. A `..` with nothing left to pop
/// is kept so callers can detect paths escaping the repository.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    segments.join("/")
}
