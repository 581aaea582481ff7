use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::batch::v1::{Job, JobCondition, JobStatus};
use kube::api::ObjectMeta;
pub use pl_adapters::FakeClusterAdapter;
pub use pl_core::test_support::{pipeline, run_if, spec, step, suspended_step};
pub use pl_core::{Pipeline, PipelinePhase, PipelineStep, RunIfOperator, RunIfOutcome, StepPhase};
pub use pl_controller::{reconcile, ReconcileContext};
pub use pl_engine::{PIPELINE_LABEL, STEP_LABEL};

pub const NAMESPACE: &str = "ns";

pub fn context(adapter: FakeClusterAdapter) -> Arc<ReconcileContext<FakeClusterAdapter>> {
    Arc::new(ReconcileContext {
        adapter,
        requeue_running_after: Duration::from_secs(10),
    })
}

/// Run one reconcile pass against `pipeline_name`, re-fetching it from the
/// adapter just like the real controller would.
pub async fn reconcile_once(adapter: &FakeClusterAdapter, pipeline_name: &str) {
    let trigger = adapter
        .get_pipeline(NAMESPACE, pipeline_name)
        .await
        .unwrap()
        .expect("pipeline must be seeded before reconciling");
    reconcile(Arc::new(trigger), context(adapter.clone())).await.unwrap();
}

fn job_named(pipeline_name: &str, step_name: &str) -> Job {
    Job {
        metadata: ObjectMeta {
            name: Some(format!("{pipeline_name}-{step_name}")),
            namespace: Some(NAMESPACE.to_string()),
            labels: Some(BTreeMap::from([
                (PIPELINE_LABEL.to_string(), pipeline_name.to_string()),
                (STEP_LABEL.to_string(), step_name.to_string()),
            ])),
            ..ObjectMeta::default()
        },
        ..Job::default()
    }
}

/// Flip the owned Job for `step_name` to Succeeded, as the Job/Pod
/// controller would once its containers exit 0.
pub fn succeed_job(adapter: &FakeClusterAdapter, pipeline_name: &str, step_name: &str) {
    let mut job = adapter
        .get_job(NAMESPACE, &format!("{pipeline_name}-{step_name}"))
        .unwrap_or_else(|| job_named(pipeline_name, step_name));
    job.status = Some(JobStatus {
        succeeded: Some(1),
        conditions: Some(vec![JobCondition {
            type_: "Complete".to_string(),
            status: "True".to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    });
    adapter.set_job(NAMESPACE, job);
}

/// Flip the owned Job for `step_name` to Failed.
pub fn fail_job(adapter: &FakeClusterAdapter, pipeline_name: &str, step_name: &str) {
    let mut job = adapter
        .get_job(NAMESPACE, &format!("{pipeline_name}-{step_name}"))
        .unwrap_or_else(|| job_named(pipeline_name, step_name));
    job.status = Some(JobStatus {
        failed: Some(1),
        conditions: Some(vec![JobCondition {
            type_: "Failed".to_string(),
            status: "True".to_string(),
            reason: Some("BackoffLimitExceeded".to_string()),
            ..Default::default()
        }]),
        ..Default::default()
    });
    adapter.set_job(NAMESPACE, job);
}

/// Patch the owned Job's `spec.suspend`, as an operator editing the live
/// Job directly would (S4's manual-gate resume).
pub fn set_job_suspend(adapter: &FakeClusterAdapter, pipeline_name: &str, step_name: &str, suspend: bool) {
    let mut job = adapter
        .get_job(NAMESPACE, &format!("{pipeline_name}-{step_name}"))
        .unwrap_or_else(|| job_named(pipeline_name, step_name));
    let mut job_spec = job.spec.take().unwrap_or_default();
    job_spec.suspend = Some(suspend);
    job.spec = Some(job_spec);
    adapter.set_job(NAMESPACE, job);
}

pub fn step_phase(adapter: &FakeClusterAdapter, pipeline_name: &str, step_name: &str) -> StepPhase {
    let status = adapter
        .latest_status(NAMESPACE, pipeline_name)
        .expect("pipeline must have a status by now");
    status
        .steps
        .iter()
        .find(|s| s.name.as_str() == step_name)
        .unwrap_or_else(|| panic!("no step status for {step_name:?}"))
        .phase
}

pub fn pipeline_phase(adapter: &FakeClusterAdapter, pipeline_name: &str) -> PipelinePhase {
    adapter
        .latest_status(NAMESPACE, pipeline_name)
        .expect("pipeline must have a status by now")
        .phase
        .expect("phase must be set once a status exists")
}
