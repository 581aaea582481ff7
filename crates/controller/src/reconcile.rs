// SPDX-License-Identifier: MIT

//! The single-pipeline reconcile procedure (§4.4), driven by
//! `kube::runtime::Controller` and talking to the cluster solely through a
//! [`ClusterAdapter`].

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::batch::v1::Job;
use kube::runtime::controller::Action;
use kube::{Resource, ResourceExt};
use pl_adapters::{observe, ClusterAdapter};
use pl_core::{validate, Pipeline, PipelineStatus};
use pl_engine::{decide, job_name, materialize, with_suspend, ObservedJob, STEP_LABEL};
use tracing::{debug, error, warn};

use crate::error::ReconcileError;

/// Shared context handed to every reconcile invocation.
pub struct ReconcileContext<A: ClusterAdapter> {
    pub adapter: A,
    /// How long to wait before re-checking a pipeline with a Running step,
    /// since Job-completion events can be throttled by the cluster (§4.4 step 9).
    pub requeue_running_after: Duration,
}

/// Entry point wired into `kube::runtime::Controller::new(...).run(...)`.
/// `trigger` only needs a valid namespace/name — a fresh copy is always
/// re-fetched through the adapter (step 1), which is what makes this safe
/// to call from either a `Pipeline` or an owned-`Job` watch event.
pub async fn reconcile<A: ClusterAdapter>(
    trigger: Arc<Pipeline>,
    ctx: Arc<ReconcileContext<A>>,
) -> Result<Action, ReconcileError> {
    let namespace = trigger.namespace().unwrap_or_default();
    let name = trigger.name_any();
    debug!(pipeline.namespace = %namespace, pipeline.name = %name, "reconcile start");

    // Step 1: fetch a fresh copy; a deleted pipeline needs no further work,
    // cascade deletion (owner references) takes care of its owned Jobs.
    let Some(pipeline) = ctx.adapter.get_pipeline(&namespace, &name).await? else {
        debug!(pipeline.namespace = %namespace, pipeline.name = %name, "pipeline not found, nothing to reconcile");
        return Ok(Action::await_change());
    };

    // Step 2: validate structural invariants.
    if let Err(errors) = validate(&pipeline.spec, &name) {
        warn!(pipeline.namespace = %namespace, pipeline.name = %name, ?errors, "pipeline failed validation");
        let status = failed_validation_status(&errors);
        patch_status_if_changed(&ctx.adapter, &namespace, &name, pipeline.status.as_ref(), status).await?;
        return Ok(Action::await_change());
    }

    // Step 3: list owned Jobs, keyed by step name via the step label.
    let owned_jobs = ctx.adapter.list_owned_jobs(&namespace, &name).await?;
    let jobs_by_step: HashMap<String, Job> = owned_jobs
        .into_iter()
        .filter_map(|job| job.labels().get(STEP_LABEL).cloned().map(|step| (step, job)))
        .collect();

    // Step 4: reduce owned Jobs down to what the pure components need.
    let observed: Vec<Option<ObservedJob>> = pipeline
        .spec
        .steps
        .iter()
        .map(|step| {
            jobs_by_step
                .get(step.name.as_str())
                .map(|job| observe(job_name(&name, step), job))
        })
        .collect();

    // Step 5: gate. Panics here indicate a bug in the pure engine, not a
    // cluster condition — caught so they become a requeue, not a crash.
    let spec = pipeline.spec.clone();
    let observed_for_gate = observed.clone();
    let decisions = std::panic::catch_unwind(AssertUnwindSafe(|| decide(&spec, &observed_for_gate)))
        .map_err(|_| ReconcileError::PanicInPureComponent("gate".to_string()))?;

    // Step 6: materialize and create a Job for every eligible, jobless step.
    for (i, step) in pipeline.spec.steps.iter().enumerate() {
        if jobs_by_step.contains_key(step.name.as_str()) {
            continue;
        }
        let Some(eligibility) = decisions[i].eligibility() else {
            continue;
        };
        let pipeline_for_job = pipeline.clone();
        let step_for_job = step.clone();
        let job = std::panic::catch_unwind(AssertUnwindSafe(|| materialize(&pipeline_for_job, &step_for_job)))
            .map_err(|_| ReconcileError::PanicInPureComponent("materialize".to_string()))?;
        let job = with_suspend(job, eligibility.is_suspend());
        debug!(pipeline.namespace = %namespace, pipeline.name = %name, step = %step.name, "creating job");
        ctx.adapter.create_job(&namespace, job).await?;
    }

    // Step 7 (live suspend/resume edits) needs no reconciler action: the
    // aggregator reads the owned Job's own `spec.suspend`/conditions next
    // pass via `observe`, so a hand-edited Job is picked up without this
    // procedure recreating or touching it.

    // Step 8: aggregate and patch status if it changed.
    let spec_for_aggregate = pipeline.spec.clone();
    let previous_status = pipeline.status.clone();
    let generation = pipeline.meta().generation;
    let now = now_rfc3339();
    let new_status = std::panic::catch_unwind(AssertUnwindSafe(|| {
        pl_engine::aggregate(&spec_for_aggregate, &observed, previous_status.as_ref(), generation, &now)
    }))
    .map_err(|_| ReconcileError::PanicInPureComponent("aggregate".to_string()))?;

    patch_status_if_changed(&ctx.adapter, &namespace, &name, pipeline.status.as_ref(), new_status.clone()).await?;

    // Step 9: requeue policy.
    let any_running = new_status
        .steps
        .iter()
        .any(|s| s.phase == pl_core::StepPhase::Running);
    if any_running {
        debug!(pipeline.namespace = %namespace, pipeline.name = %name, "a step is running, requeuing for a bounded poll");
        Ok(Action::requeue(ctx.requeue_running_after))
    } else {
        Ok(Action::await_change())
    }
}

/// Error policy handed to `Controller::run`. Every variant becomes a
/// requeue decision — the reconciler never lets an error propagate past
/// this point (§7's propagation policy).
pub fn error_policy<A: ClusterAdapter>(
    pipeline: Arc<Pipeline>,
    err: &ReconcileError,
    _ctx: Arc<ReconcileContext<A>>,
) -> Action {
    error!(
        pipeline.namespace = %pipeline.namespace().unwrap_or_default(),
        pipeline.name = %pipeline.name_any(),
        error = %err,
        "reconcile failed"
    );
    match err {
        ReconcileError::Adapter(_) => Action::requeue(Duration::from_secs(5)),
        ReconcileError::PanicInPureComponent(_) => Action::requeue(Duration::from_secs(30)),
    }
}

fn failed_validation_status(errors: &[pl_core::ValidationError]) -> PipelineStatus {
    let now = now_rfc3339();
    PipelineStatus {
        phase: Some(pl_core::PipelinePhase::Failed),
        conditions: vec![pl_core::Condition {
            type_: "Ready".to_string(),
            status: pl_core::ConditionStatus::False,
            reason: "ValidationError".to_string(),
            message: errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
            last_transition_time: now,
        }],
        ..PipelineStatus::default()
    }
}

async fn patch_status_if_changed<A: ClusterAdapter>(
    adapter: &A,
    namespace: &str,
    name: &str,
    previous: Option<&PipelineStatus>,
    new_status: PipelineStatus,
) -> Result<(), ReconcileError> {
    if previous == Some(&new_status) {
        return Ok(());
    }
    match adapter.patch_pipeline_status(namespace, name, new_status.clone()).await {
        Ok(()) => Ok(()),
        // Conflict: one retry from a fresh read, then give up (§4.5, §7).
        Err(pl_adapters::AdapterError::Conflict(_)) => {
            warn!(pipeline.namespace = %namespace, pipeline.name = %name, "status patch conflict, retrying once");
            adapter.patch_pipeline_status(namespace, name, new_status).await?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
