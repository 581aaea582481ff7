use super::*;
use pl_core::test_support::{run_if, spec, step, suspended_step};
use pl_core::{PipelineStep, RunIfOperator, RunIfOutcome};

const NOW: &str = "2026-01-01T00:00:00Z";

fn job(name: &str) -> ObservedJob {
    ObservedJob {
        job_name: name.to_string(),
        suspend: false,
        complete: false,
        failed: false,
        deadline_exceeded: false,
        active: 0,
        succeeded: 0,
        failed_count: 0,
    }
}

fn running(name: &str) -> ObservedJob {
    ObservedJob { active: 1, ..job(name) }
}

fn succeeded(name: &str) -> ObservedJob {
    ObservedJob { complete: true, succeeded: 1, ..job(name) }
}

fn failed(name: &str) -> ObservedJob {
    ObservedJob { failed: true, failed_count: 1, ..job(name) }
}

fn suspended(name: &str) -> ObservedJob {
    ObservedJob { suspend: true, ..job(name) }
}

#[test]
fn s1_single_step_progresses_pending_running_succeeded() {
    let spec = spec(vec![step("build")]);

    let status = aggregate(&spec, &[None], None, Some(1), NOW);
    assert_eq!(status.phase, Some(PipelinePhase::Pending));

    let status = aggregate(&spec, &[Some(running("ci-build"))], None, Some(1), NOW);
    assert_eq!(status.phase, Some(PipelinePhase::Running));
    assert_eq!(status.start_time.as_deref(), Some(NOW));

    let status = aggregate(&spec, &[Some(succeeded("ci-build"))], Some(&status), Some(1), NOW);
    assert_eq!(status.phase, Some(PipelinePhase::Succeeded));
    assert_eq!(status.completion_time.as_deref(), Some(NOW));
}

#[test]
fn s2_sequential_failure_propagates_skip_to_downstream() {
    let spec = spec(vec![step("a"), step("b"), step("c")]);
    let observed = vec![Some(succeeded("ci-a")), Some(failed("ci-b")), None];
    let status = aggregate(&spec, &observed, None, Some(1), NOW);

    assert_eq!(status.step(&pl_core::StepName::parse("a").unwrap()).unwrap().phase, StepPhase::Succeeded);
    assert_eq!(status.step(&pl_core::StepName::parse("b").unwrap()).unwrap().phase, StepPhase::Failed);
    assert_eq!(status.step(&pl_core::StepName::parse("c").unwrap()).unwrap().phase, StepPhase::Skipped);
    assert_eq!(status.phase, Some(PipelinePhase::Failed));
}

#[test]
fn s3_conditional_recovery_step_b_runs_but_pipeline_is_still_failed() {
    let b = PipelineStep {
        run_if: Some(run_if(RunIfOutcome::Fail, RunIfOperator::And, &["a"])),
        ..step("b")
    };
    let spec = spec(vec![step("a"), b]);
    let observed = vec![Some(failed("ci-a")), Some(succeeded("ci-b"))];
    let status = aggregate(&spec, &observed, None, Some(1), NOW);

    assert_eq!(status.step(&pl_core::StepName::parse("a").unwrap()).unwrap().phase, StepPhase::Failed);
    assert_eq!(status.step(&pl_core::StepName::parse("b").unwrap()).unwrap().phase, StepPhase::Succeeded);
    assert_eq!(status.phase, Some(PipelinePhase::Failed));
}

#[test]
fn s4_manual_gate_suspends_then_resumes() {
    let spec = spec(vec![step("build"), suspended_step("approve"), step("deploy")]);

    let observed = vec![Some(succeeded("ci-build")), Some(suspended("ci-approve")), None];
    let status = aggregate(&spec, &observed, None, Some(1), NOW);
    assert_eq!(status.step(&pl_core::StepName::parse("approve").unwrap()).unwrap().phase, StepPhase::Suspended);
    assert_eq!(status.phase, Some(PipelinePhase::Suspended));
    let ready = status.condition("Ready").unwrap();
    assert!(ready.message.contains("approve"));

    // Job's spec.suspend is flipped false out of band; it now has no active
    // pods yet (apiserver hasn't scheduled it), so it's Pending, not Suspended.
    let observed = vec![Some(succeeded("ci-build")), Some(job("ci-approve")), None];
    let status2 = aggregate(&spec, &observed, Some(&status), Some(1), NOW);
    assert_eq!(status2.step(&pl_core::StepName::parse("approve").unwrap()).unwrap().phase, StepPhase::Pending);
}

#[test]
fn pipeline_phase_succeeded_requires_at_least_one_succeeded_step() {
    let b = PipelineStep {
        run_if: Some(run_if(RunIfOutcome::Success, RunIfOperator::And, &["a"])),
        ..step("b")
    };
    let spec = spec(vec![step("a"), b]);
    // a failed -> b is skipped -> all steps are Failed/Skipped, not all Succeeded/Skipped.
    let observed = vec![Some(failed("ci-a")), None];
    let status = aggregate(&spec, &observed, None, Some(1), NOW);
    assert_eq!(status.phase, Some(PipelinePhase::Failed));
}

#[test]
fn reachability_does_not_mark_pipeline_failed_while_a_rescue_branch_is_still_pending() {
    // a fails; b has runIf(fail, [a]) so it could still rescue the pipeline.
    let b = PipelineStep {
        run_if: Some(run_if(RunIfOutcome::Fail, RunIfOperator::And, &["a"])),
        ..step("b")
    };
    let spec = spec(vec![step("a"), b]);
    let observed = vec![Some(failed("ci-a")), None];
    let status = aggregate(&spec, &observed, None, Some(1), NOW);
    // b hasn't been created/observed yet, so its phase is Pending and it is
    // still reachable (best case) -> pipeline must not be Failed yet.
    assert_eq!(status.phase, Some(PipelinePhase::Running));
}

#[test]
fn reachability_marks_pipeline_failed_once_no_branch_can_rescue_it() {
    // a fails; b only runs on a's success, so it can never run now.
    let b = PipelineStep {
        run_if: Some(run_if(RunIfOutcome::Success, RunIfOperator::And, &["a"])),
        ..step("b")
    };
    let spec = spec(vec![step("a"), b]);
    let observed = vec![Some(failed("ci-a")), None];
    let status = aggregate(&spec, &observed, None, Some(1), NOW);
    assert_eq!(status.phase, Some(PipelinePhase::Failed));
}

#[test]
fn condition_last_transition_time_is_stable_across_unchanged_reason() {
    let spec = spec(vec![step("build")]);
    let first = aggregate(&spec, &[Some(running("ci-build"))], None, Some(1), "t0");
    let second = aggregate(&spec, &[Some(running("ci-build"))], Some(&first), Some(1), "t1");
    assert_eq!(
        first.condition("Ready").unwrap().last_transition_time,
        second.condition("Ready").unwrap().last_transition_time
    );
}

#[test]
fn timestamps_are_set_once_and_never_move() {
    let spec = spec(vec![step("build")]);
    let running_status = aggregate(&spec, &[Some(running("ci-build"))], None, Some(1), "t0");
    let succeeded_status =
        aggregate(&spec, &[Some(succeeded("ci-build"))], Some(&running_status), Some(1), "t1");
    let reaggregated =
        aggregate(&spec, &[Some(succeeded("ci-build"))], Some(&succeeded_status), Some(1), "t2");

    assert_eq!(running_status.start_time.as_deref(), Some("t0"));
    assert_eq!(succeeded_status.start_time.as_deref(), Some("t0"));
    assert_eq!(succeeded_status.completion_time.as_deref(), Some("t1"));
    assert_eq!(reaggregated.completion_time.as_deref(), Some("t1"));
}

#[test]
fn decide_reports_eligible_for_a_jobless_first_step() {
    let spec = spec(vec![step("a"), step("b")]);
    let decisions = decide(&spec, &[None, None]);
    assert_eq!(decisions[0], Decision::Eligible(Eligibility::Run));
    assert_eq!(decisions[1], Decision::Wait);
}

#[test]
fn decide_skips_downstream_of_a_failed_predecessor() {
    let spec = spec(vec![step("a"), step("b")]);
    let decisions = decide(&spec, &[Some(failed("ci-a")), None]);
    assert_eq!(decisions[1], Decision::Skip);
}

#[test]
fn decide_marks_suspended_step_job_spec_eligible_as_suspend() {
    let spec = spec(vec![suspended_step("a")]);
    let decisions = decide(&spec, &[None]);
    assert_eq!(decisions[0], Decision::Eligible(Eligibility::Suspend));
}
