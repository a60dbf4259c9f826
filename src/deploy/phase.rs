// ABOUTME: Phases of one sync-and-deploy invocation.
// ABOUTME: Single pass, never revisits an earlier phase.

use std::fmt;

/// The step an invocation failed in.
///
/// `{Clone | Open} → Fetch → Detect → Pull → Dispatch`. A run with nothing
/// to deploy stops after `Detect`; planning cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Clone,
    Open,
    Fetch,
    Detect,
    Pull,
    Dispatch,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Clone => "clone",
            Phase::Open => "open",
            Phase::Fetch => "fetch",
            Phase::Detect => "detect",
            Phase::Pull => "pull",
            Phase::Dispatch => "dispatch",
        };
        f.write_str(name)
    }
}
