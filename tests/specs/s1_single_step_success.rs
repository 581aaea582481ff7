//! S1. Single step success: one step `build`, container exits 0.

use crate::prelude::*;

#[tokio::test]
async fn single_step_progresses_to_succeeded_and_creates_one_job() {
    let adapter = FakeClusterAdapter::new();
    adapter.seed_pipeline(pipeline("ns", "ci", spec(vec![step("build")])));

    reconcile_once(&adapter, "ci").await;
    assert_eq!(step_phase(&adapter, "ci", "build"), StepPhase::Pending);
    assert!(adapter.get_job("ns", "ci-build").is_some());

    set_job_active(&adapter, "ci", "build");
    reconcile_once(&adapter, "ci").await;
    assert_eq!(step_phase(&adapter, "ci", "build"), StepPhase::Running);
    assert_eq!(pipeline_phase(&adapter, "ci"), PipelinePhase::Running);

    succeed_job(&adapter, "ci", "build");
    reconcile_once(&adapter, "ci").await;
    assert_eq!(step_phase(&adapter, "ci", "build"), StepPhase::Succeeded);
    assert_eq!(pipeline_phase(&adapter, "ci"), PipelinePhase::Succeeded);

    let jobs = adapter.calls();
    let create_count = jobs
        .iter()
        .filter(|c| matches!(c, pl_adapters::AdapterCall::CreateJob { .. }))
        .count();
    assert_eq!(create_count, 1, "reconciling across three passes must not recreate the Job");
}

fn set_job_active(adapter: &FakeClusterAdapter, pipeline_name: &str, step_name: &str) {
    use k8s_openapi::api::batch::v1::JobStatus;
    let mut job = adapter
        .get_job("ns", &format!("{pipeline_name}-{step_name}"))
        .expect("job must already exist");
    job.status = Some(JobStatus {
        active: Some(1),
        ..Default::default()
    });
    adapter.set_job("ns", job);
}
