// ABOUTME: Selective deployment: planning, fail-fast dispatch, and the end-to-end pipeline.
// ABOUTME: Exports the planner, Dispatcher, Pipeline, and their error and phase types.

mod dispatch;
mod error;
mod phase;
mod pipeline;
mod plan;

pub use dispatch::{DispatchReport, Dispatcher};
pub use error::{DispatchError, DispatchStage};
pub use phase::Phase;
pub use pipeline::{
    DispatchSnafu, Pipeline, PipelineError, PipelineErrorKind, PipelineReport, SyncSnafu,
};
pub use plan::{DeployPlan, PlanReason, plan};
