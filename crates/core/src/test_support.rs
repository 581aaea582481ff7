// SPDX-License-Identifier: MIT

//! Shared test builders for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::run_if::{RunIfCondition, RunIfOperator, RunIfOutcome};
use crate::spec::{Pipeline, PipelineSpec};
use crate::step::PipelineStep;
use crate::step_name::StepName;
use k8s_openapi::api::batch::v1::JobSpec;
use kube::api::ObjectMeta;

/// Build a step with a bare `jobSpec` and no gating clause.
pub fn step(name: &str) -> PipelineStep {
    PipelineStep {
        name: StepName::parse(name).expect("test step name must be valid"),
        run_if: None,
        job_spec: JobSpec::default(),
    }
}

/// Build a step whose `jobSpec.suspend` is set, for manual-gate scenarios.
pub fn suspended_step(name: &str) -> PipelineStep {
    PipelineStep {
        job_spec: JobSpec {
            suspend: Some(true),
            ..JobSpec::default()
        },
        ..step(name)
    }
}

/// Build a `runIf` clause referencing `steps` with `condition`/`operator`.
pub fn run_if(condition: RunIfOutcome, operator: RunIfOperator, steps: &[&str]) -> RunIfCondition {
    RunIfCondition {
        condition,
        operator,
        steps: steps
            .iter()
            .map(|s| StepName::parse(*s).expect("test ref name must be valid"))
            .collect(),
    }
}

/// Build a bare, unvalidated `PipelineSpec` from a step list.
pub fn spec(steps: Vec<PipelineStep>) -> PipelineSpec {
    PipelineSpec {
        steps,
        ..PipelineSpec::default()
    }
}

/// Build a namespaced `Pipeline` resource with the given name and spec.
pub fn pipeline(namespace: &str, name: &str, spec: PipelineSpec) -> Pipeline {
    Pipeline {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("{namespace}-{name}-uid")),
            generation: Some(1),
            ..ObjectMeta::default()
        },
        spec,
        status: None,
    }
}
