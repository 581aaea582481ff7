// SPDX-License-Identifier: MIT

//! The status aggregator: pure mapping from `(spec, observed Jobs, gating
//! decisions, previous status, now)` to the next `PipelineStatus` (§4.3).

use crate::gate::{gate, gate_one, Decision};
#[cfg(test)]
use crate::gate::Eligibility;
use pl_core::{Condition, ConditionStatus, PipelinePhase, PipelineSpec, PipelineStatus, StepPhase, StepStatus};

/// A step's owned Job, reduced to the fields the aggregator needs.
///
/// This is the boundary type between `pl-adapters` (which reads the real
/// `batch/v1 Job` and its pod counts off the cluster) and this crate, which
/// never touches `k8s_openapi::api::batch::v1::Job` directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedJob {
    pub job_name: String,
    pub suspend: bool,
    pub complete: bool,
    pub failed: bool,
    pub deadline_exceeded: bool,
    pub active: u32,
    pub succeeded: u32,
    pub failed_count: u32,
}

/// Derive a single step's phase from its observed Job (if any) and its
/// gating decision (used only when no Job exists yet).
fn step_phase(observed: Option<&ObservedJob>, decision: Decision) -> StepPhase {
    match observed {
        Some(job) => {
            if job.complete {
                StepPhase::Succeeded
            } else if job.failed || job.deadline_exceeded {
                StepPhase::Failed
            } else if job.suspend && job.active == 0 && job.succeeded == 0 && job.failed_count == 0 {
                StepPhase::Suspended
            } else if job.active > 0 {
                StepPhase::Running
            } else {
                StepPhase::Pending
            }
        }
        None => match decision {
            Decision::Skip => StepPhase::Skipped,
            Decision::Wait | Decision::Eligible(_) => StepPhase::Pending,
        },
    }
}

/// Whether some step that hasn't settled yet could still reach Running or
/// Succeeded, simulated by assuming every currently-Pending step eventually
/// succeeds and re-running the gating evaluator under that best case.
///
/// Resolves the open question in §9: distinguishing a pipeline that is truly
/// stuck (Failed) from one where a `runIf={condition: fail}` branch could yet
/// rescue it.
fn can_still_progress(spec: &PipelineSpec, phases: &[StepPhase]) -> bool {
    let non_terminal: Vec<usize> = (0..phases.len()).filter(|&i| !phases[i].is_terminal()).collect();

    if non_terminal
        .iter()
        .any(|&i| matches!(phases[i], StepPhase::Running | StepPhase::Suspended))
    {
        return true;
    }

    let best_case: Vec<StepPhase> = phases
        .iter()
        .map(|&p| if p == StepPhase::Pending { StepPhase::Succeeded } else { p })
        .collect();
    let best_case_decisions = gate(spec, &best_case);

    non_terminal.iter().any(|&i| best_case_decisions[i].is_eligible())
}

fn pipeline_phase(spec: &PipelineSpec, phases: &[StepPhase]) -> PipelinePhase {
    let all_succeeded_or_skipped = phases
        .iter()
        .all(|p| matches!(p, StepPhase::Succeeded | StepPhase::Skipped));
    let any_succeeded = phases.iter().any(|&p| p == StepPhase::Succeeded);
    if all_succeeded_or_skipped && any_succeeded {
        return PipelinePhase::Succeeded;
    }

    let any_failed = phases.iter().any(|&p| p == StepPhase::Failed);
    if any_failed && !can_still_progress(spec, phases) {
        return PipelinePhase::Failed;
    }

    let any_suspended = phases.iter().any(|&p| p == StepPhase::Suspended);
    let any_running = phases.iter().any(|&p| p == StepPhase::Running);
    if any_suspended && !any_running {
        return PipelinePhase::Suspended;
    }

    if phases.iter().any(|&p| p != StepPhase::Pending) {
        PipelinePhase::Running
    } else {
        PipelinePhase::Pending
    }
}

const READY_CONDITION: &str = "Ready";

fn ready_condition(phase: PipelinePhase, phases: &[StepPhase], spec: &PipelineSpec, now: &str) -> Condition {
    let suspended_names: Vec<&str> = spec
        .steps
        .iter()
        .zip(phases)
        .filter(|(_, &p)| p == StepPhase::Suspended)
        .map(|(s, _)| s.name.as_str())
        .collect();
    let failed_names: Vec<&str> = spec
        .steps
        .iter()
        .zip(phases)
        .filter(|(_, &p)| p == StepPhase::Failed)
        .map(|(s, _)| s.name.as_str())
        .collect();

    let (status, reason, message) = match phase {
        PipelinePhase::Succeeded => (ConditionStatus::True, "PipelineSucceeded", "Pipeline succeeded".to_string()),
        PipelinePhase::Failed => (
            ConditionStatus::False,
            "PipelineFailed",
            format!("Pipeline failed: {}", failed_names.join(", ")),
        ),
        PipelinePhase::Suspended => (
            ConditionStatus::Unknown,
            "PipelineSuspended",
            format!("Pipeline suspended: {}", suspended_names.join(", ")),
        ),
        PipelinePhase::Running => (ConditionStatus::Unknown, "PipelineRunning", "Pipeline is running".to_string()),
        PipelinePhase::Pending => (ConditionStatus::Unknown, "PipelinePending", "Pipeline is pending".to_string()),
    };

    Condition {
        type_: READY_CONDITION.to_string(),
        status,
        reason: reason.to_string(),
        message,
        last_transition_time: now.to_string(),
    }
}

/// Gate every step against the phases implied by `observed`, without
/// building a full `PipelineStatus`. The reconciler (§4.4 step 5) uses this
/// to decide which jobless steps are eligible to materialize; [`aggregate`]
/// needs the same per-step decisions internally but folds them straight
/// into `StepPhase`s instead of returning them.
pub fn decide(spec: &PipelineSpec, observed: &[Option<ObservedJob>]) -> Vec<Decision> {
    debug_assert_eq!(spec.steps.len(), observed.len());

    let mut phases: Vec<StepPhase> = Vec::with_capacity(spec.steps.len());
    let mut decisions: Vec<Decision> = Vec::with_capacity(spec.steps.len());
    for i in 0..spec.steps.len() {
        let decision = gate_one(spec, i, &phases);
        phases.push(step_phase(observed[i].as_ref(), decision));
        decisions.push(decision);
    }
    decisions
}

/// Build the next `PipelineStatus` from the pipeline's spec, its owned
/// Jobs (keyed 1:1 by step index, `None` where no Job exists for that
/// step yet), and the previous status (`None` for a pipeline seen for the
/// first time). `now` is an RFC 3339 timestamp supplied by the caller —
/// this function never reads the clock itself.
pub fn aggregate(
    spec: &PipelineSpec,
    observed: &[Option<ObservedJob>],
    previous: Option<&PipelineStatus>,
    generation: Option<i64>,
    now: &str,
) -> PipelineStatus {
    debug_assert_eq!(spec.steps.len(), observed.len());

    // Built up left to right: `gate_one` for step `i` only ever reads
    // `phases[0..i]` (its sequential predecessor or earlier `runIf` refs),
    // which by this point already hold their settled values for this pass.
    let mut phases: Vec<StepPhase> = Vec::with_capacity(spec.steps.len());
    for i in 0..spec.steps.len() {
        let decision = gate_one(spec, i, &phases);
        phases.push(step_phase(observed[i].as_ref(), decision));
    }

    let steps: Vec<StepStatus> = spec
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| StepStatus {
            name: step.name.clone(),
            phase: phases[i],
            job_name: observed[i].as_ref().map(|o| o.job_name.clone()),
        })
        .collect();

    let new_phase = pipeline_phase(spec, &phases);

    let start_time = match previous.and_then(|p| p.start_time.clone()) {
        Some(t) => Some(t),
        None if new_phase != PipelinePhase::Pending => Some(now.to_string()),
        None => None,
    };

    let completion_time = match previous.and_then(|p| p.completion_time.clone()) {
        Some(t) => Some(t),
        None if new_phase.is_terminal() => Some(now.to_string()),
        None => None,
    };

    let new_ready = ready_condition(new_phase, &phases, spec, now);
    let condition = match previous.and_then(|p| p.condition(READY_CONDITION)) {
        Some(prev) if prev.status == new_ready.status && prev.reason == new_ready.reason => Condition {
            last_transition_time: prev.last_transition_time.clone(),
            ..new_ready
        },
        _ => new_ready,
    };

    PipelineStatus {
        phase: Some(new_phase),
        start_time,
        completion_time,
        steps,
        conditions: vec![condition],
        observed_generation: generation,
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
