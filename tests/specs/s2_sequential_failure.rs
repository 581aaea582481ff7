//! S2. Sequential failure: [a, b, c], `a` succeeds, `b` fails → `c` Skipped,
//! pipeline Failed, no Job ever created for `c`.

use crate::prelude::*;

#[tokio::test]
async fn failure_propagates_skip_to_downstream_steps() {
    let adapter = FakeClusterAdapter::new();
    adapter.seed_pipeline(pipeline("ns", "seq", spec(vec![step("a"), step("b"), step("c")])));

    reconcile_once(&adapter, "seq").await;
    succeed_job(&adapter, "seq", "a");
    reconcile_once(&adapter, "seq").await;
    fail_job(&adapter, "seq", "b");
    reconcile_once(&adapter, "seq").await;

    assert_eq!(step_phase(&adapter, "seq", "a"), StepPhase::Succeeded);
    assert_eq!(step_phase(&adapter, "seq", "b"), StepPhase::Failed);
    assert_eq!(step_phase(&adapter, "seq", "c"), StepPhase::Skipped);
    assert_eq!(pipeline_phase(&adapter, "seq"), PipelinePhase::Failed);

    assert!(adapter.get_job("ns", "seq-a").is_some());
    assert!(adapter.get_job("ns", "seq-b").is_some());
    assert!(adapter.get_job("ns", "seq-c").is_none());
}
