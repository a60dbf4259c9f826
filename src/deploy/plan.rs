// ABOUTME: Deployment planner mapping changed sub-directories to manifests.
// ABOUTME: Configuration order is the ordering contract, never discovery order.

use std::collections::HashSet;

use crate::types::{ManifestEntry, SubDir};

/// Why a plan contains what it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanReason {
    /// Manifests in changed sub-directories.
    Changed,
    /// Nothing changed, every manifest redeployed by operator request.
    Forced,
    /// Nothing changed and no force: nothing to deploy.
    NoChanges,
}

/// Ordered manifests to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    manifests: Vec<String>,
    reason: PlanReason,
}

impl DeployPlan {
    pub fn manifests(&self) -> &[String] {
        &self.manifests
    }

    pub fn reason(&self) -> PlanReason {
        self.reason
    }

    pub fn is_forced(&self) -> bool {
        self.reason == PlanReason::Forced
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }
}

/// Derive the manifests to deploy.
///
/// - Something changed: every entry whose sub-directory changed, in entry order.
/// - Nothing changed and `force`: every entry, in entry order.
/// - Otherwise: nothing.
///
/// Membership is exact sub-directory equality.
pub fn plan(entries: &[ManifestEntry], changed: &[SubDir], force: bool) -> DeployPlan {
    if !changed.is_empty() {
        let changed: HashSet<&SubDir> = changed.iter().collect();
        let manifests = entries
            .iter()
            .filter(|entry| changed.contains(entry.sub_dir()))
            .map(|entry| entry.manifest_path().to_string())
            .collect();
        return DeployPlan {
            manifests,
            reason: PlanReason::Changed,
        };
    }

    if force {
        return DeployPlan {
            manifests: entries
                .iter()
                .map(|entry| entry.manifest_path().to_string())
                .collect(),
            reason: PlanReason::Forced,
        };
    }

    DeployPlan {
        manifests: Vec::new(),
        reason: PlanReason::NoChanges,
    }
}
