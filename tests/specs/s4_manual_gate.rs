//! S4. Manual gate: [build, approve, deploy] where `approve.jobSpec.suspend`
//! starts `true`. Pipeline parks at Suspended until an operator flips the
//! live Job's `spec.suspend` back to `false`, then `approve` and `deploy`
//! run to completion.

use crate::prelude::*;

#[tokio::test]
async fn flipping_suspend_on_the_live_job_lets_the_pipeline_resume() {
    let adapter = FakeClusterAdapter::new();
    adapter.seed_pipeline(pipeline(
        "ns",
        "release",
        spec(vec![step("build"), suspended_step("approve"), step("deploy")]),
    ));

    reconcile_once(&adapter, "release").await;
    succeed_job(&adapter, "release", "build");
    reconcile_once(&adapter, "release").await;

    assert!(adapter.get_job("ns", "release-approve").is_some(), "approve's Job must materialize suspended");
    assert_eq!(step_phase(&adapter, "release", "approve"), StepPhase::Suspended);
    assert_eq!(pipeline_phase(&adapter, "release"), PipelinePhase::Suspended);
    assert!(adapter.get_job("ns", "release-deploy").is_none(), "deploy must not materialize while approve is gating");

    let status = adapter.latest_status("ns", "release").unwrap();
    let ready = status.condition("Ready").expect("Ready condition must be present");
    assert!(ready.message.contains("approve"), "Ready message must name the suspended step: {}", ready.message);

    set_job_suspend(&adapter, "release", "approve", false);
    reconcile_once(&adapter, "release").await;
    assert_eq!(step_phase(&adapter, "release", "approve"), StepPhase::Pending);

    succeed_job(&adapter, "release", "approve");
    reconcile_once(&adapter, "release").await;
    assert_eq!(step_phase(&adapter, "release", "approve"), StepPhase::Succeeded);
    assert!(adapter.get_job("ns", "release-deploy").is_some());

    succeed_job(&adapter, "release", "deploy");
    reconcile_once(&adapter, "release").await;
    assert_eq!(pipeline_phase(&adapter, "release"), PipelinePhase::Succeeded);
}
