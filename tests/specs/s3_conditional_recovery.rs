//! S3. Conditional recovery: [a, b] where `b.runIf={condition: fail, and, [a]}`.
//! `a` fails, `b` runs and succeeds — pipeline is still Failed, because `a`
//! itself settled Failed and nothing downstream of it remains reachable.

use crate::prelude::*;

#[tokio::test]
async fn a_recovery_branch_still_leaves_the_pipeline_failed() {
    let adapter = FakeClusterAdapter::new();
    let b = PipelineStep {
        run_if: Some(run_if(RunIfOutcome::Fail, RunIfOperator::And, &["a"])),
        ..step("b")
    };
    adapter.seed_pipeline(pipeline("ns", "recover", spec(vec![step("a"), b])));

    reconcile_once(&adapter, "recover").await;
    fail_job(&adapter, "recover", "a");
    reconcile_once(&adapter, "recover").await;

    assert!(adapter.get_job("ns", "recover-b").is_some(), "b must run once a's runIf=fail condition is met");

    succeed_job(&adapter, "recover", "b");
    reconcile_once(&adapter, "recover").await;

    assert_eq!(step_phase(&adapter, "recover", "a"), StepPhase::Failed);
    assert_eq!(step_phase(&adapter, "recover", "b"), StepPhase::Succeeded);
    assert_eq!(pipeline_phase(&adapter, "recover"), PipelinePhase::Failed);
}
