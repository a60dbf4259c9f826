// ABOUTME: Deploy command implementation.
// ABOUTME: Wires the git and compose adapters into the pipeline and reports the outcome.

use voyage::compose::{ComposeCli, select_runtime};
use voyage::config::Config;
use voyage::deploy::{Pipeline, PipelineError, PipelineReport, PlanReason};
use voyage::error::{Error, Result};
use voyage::events::TracingSink;
use voyage::output::Output;
use voyage::vcs::GitCli;

/// Sync the checkout and deploy whatever the plan selects.
pub async fn deploy(config: Config, output: &mut Output) -> Result<()> {
    output.start_timer();

    let runtime = select_runtime(config.runtime);
    output.progress(&format!(
        "Syncing {} ({}) into {}",
        config.repository.url(),
        config.repository.branch(),
        config.repository.local_path().display()
    ));
    output.progress(&format!(
        "  → {} manifest(s) across {} sub-director(ies), using {}",
        config.manifests.len(),
        config.manifests.sub_dirs().len(),
        runtime
    ));

    let pipeline = Pipeline::new(
        config.repository.clone(),
        config.manifests.clone(),
        GitCli::new(),
        ComposeCli::new(runtime),
        TracingSink::shared(),
    )
    .force(config.force)
    .daemon(config.daemon);

    let result = match config.timeout {
        Some(limit) => tokio::time::timeout(limit, pipeline.run())
            .await
            .map_err(|_| Error::Timeout(limit))?,
        None => pipeline.run().await,
    };

    match result {
        Ok(report) => {
            summarize(&report, output);
            Ok(())
        }
        Err(err) => {
            report_partial_deploy(&err, output);
            Err(err.into())
        }
    }
}

fn summarize(report: &PipelineReport, output: &Output) {
    match report.plan.reason() {
        PlanReason::NoChanges => {
            output.success("No changes detected, nothing to deploy", &[]);
        }
        PlanReason::Forced => {
            output.success(
                &format!(
                    "No changes detected; force-deployed {} manifest(s)",
                    report.applied.len()
                ),
                &report.applied,
            );
        }
        PlanReason::Changed => {
            let changed: Vec<String> = report.changed.iter().map(ToString::to_string).collect();
            output.success(
                &format!(
                    "Deployed {} manifest(s) for changed: {}",
                    report.applied.len(),
                    changed.join(", ")
                ),
                &report.applied,
            );
        }
    }
}

/// Manifests applied before a dispatch failure stay applied; say which.
fn report_partial_deploy(err: &PipelineError, output: &Output) {
    if let PipelineError::Dispatch { source } = err
        && !source.applied().is_empty()
    {
        output.warning(&format!(
            "already applied before the failure: {}",
            source.applied().join(", ")
        ));
    }
}
