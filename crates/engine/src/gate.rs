// SPDX-License-Identifier: MIT

//! The gating evaluator: pure mapping from `(spec, current step statuses)` to
//! a per-step decision. No cluster I/O, no clock.

use pl_core::{PipelineSpec, RunIfOperator, RunIfOutcome, StepPhase};

/// Outcome of gating one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// An upstream dependency hasn't settled yet; try again next reconcile.
    Wait,
    /// The step may run now, possibly paused if its own `jobSpec.suspend` is set.
    Eligible(Eligibility),
    /// An upstream dependency settled in a way that rules this step out.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Run,
    Suspend,
}

impl Decision {
    pub fn is_eligible(self) -> bool {
        matches!(self, Decision::Eligible(_))
    }

    pub fn is_wait(self) -> bool {
        matches!(self, Decision::Wait)
    }

    pub fn eligibility(self) -> Option<Eligibility> {
        match self {
            Decision::Eligible(e) => Some(e),
            _ => None,
        }
    }
}

impl Eligibility {
    pub fn is_suspend(self) -> bool {
        matches!(self, Eligibility::Suspend)
    }
}

/// Gate every step in `spec` against `phases`, a slice aligned 1:1 with
/// `spec.steps` (same length and order).
///
/// Every step's rule only ever looks at indices that precede it (its
/// sequential predecessor, or `runIf` refs — both guaranteed earlier by
/// [`pl_core::validate`]'s invariant 2), so `phases` must already hold each
/// step's settled value by the time this is called. Used directly by the
/// reachability simulation in [`crate::aggregate`]; the main aggregation
/// loop instead calls [`gate_one`] incrementally, since it's deriving
/// `phases` itself from observed Jobs one step at a time.
pub fn gate(spec: &PipelineSpec, phases: &[StepPhase]) -> Vec<Decision> {
    debug_assert_eq!(spec.steps.len(), phases.len());
    (0..spec.steps.len()).map(|index| gate_one(spec, index, phases)).collect()
}

/// Gate a single step at `index`. Only reads `phases[0..index]`; the
/// contents of `phases[index..]` are ignored.
pub fn gate_one(spec: &PipelineSpec, index: usize, phases: &[StepPhase]) -> Decision {
    let step = &spec.steps[index];
    let decision = match &step.run_if {
        None => gate_sequential(index, phases),
        Some(run_if) => gate_conditional(run_if, phases, spec),
    };
    match decision {
        Decision::Eligible(_) if step.job_spec.suspend == Some(true) => Decision::Eligible(Eligibility::Suspend),
        Decision::Eligible(_) => Decision::Eligible(Eligibility::Run),
        other => other,
    }
}

fn gate_sequential(index: usize, phases: &[StepPhase]) -> Decision {
    if index == 0 {
        return Decision::Eligible(Eligibility::Run);
    }
    match phases[index - 1] {
        StepPhase::Succeeded => Decision::Eligible(Eligibility::Run),
        StepPhase::Failed | StepPhase::Skipped => Decision::Skip,
        StepPhase::Pending | StepPhase::Running | StepPhase::Suspended => Decision::Wait,
    }
}

fn gate_conditional(
    run_if: &pl_core::RunIfCondition,
    phases: &[StepPhase],
    spec: &PipelineSpec,
) -> Decision {
    let ref_phases: Vec<StepPhase> = run_if
        .steps
        .iter()
        .map(|name| {
            // pl_core::validate rejects a runIf referencing an undeclared step name.
            #[allow(clippy::expect_used)]
            let index = spec.step_index(name).expect("runIf ref must exist, see pl_core::validate");
            phases[index]
        })
        .collect();

    if ref_phases
        .iter()
        .any(|p| matches!(p, StepPhase::Pending | StepPhase::Running | StepPhase::Suspended))
    {
        return Decision::Wait;
    }

    let passes = |phase: StepPhase| match run_if.condition {
        RunIfOutcome::Success => phase == StepPhase::Succeeded,
        RunIfOutcome::Fail => phase == StepPhase::Failed,
    };

    let satisfied = match run_if.operator {
        RunIfOperator::And => ref_phases.iter().all(|&p| passes(p)),
        RunIfOperator::Or => ref_phases.iter().any(|&p| passes(p)),
    };

    if satisfied {
        Decision::Eligible(Eligibility::Run)
    } else {
        Decision::Skip
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
