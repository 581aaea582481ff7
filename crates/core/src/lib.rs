// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pl-core: domain model for the Pipeline custom resource.
//!
//! Everything in this crate is pure data and pure functions: the `Pipeline`
//! type and its nested spec/status shapes, the step-name and runIf newtypes,
//! and static validation. No cluster I/O, no clock, no cluster adapter —
//! those live in `pl-adapters` and `pl-controller`.

mod pod_defaults;
mod run_if;
mod shared_volume;
mod spec;
mod status;
mod step;
mod step_name;
mod validate;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use pod_defaults::PodTemplateDefaults;
pub use run_if::{RunIfCondition, RunIfOperator, RunIfOutcome};
pub use shared_volume::SharedVolume;
pub use spec::{Pipeline, PipelineSpec};
pub use status::{Condition, ConditionStatus, PipelinePhase, PipelineStatus, StepPhase, StepStatus};
pub use step::PipelineStep;
pub use step_name::{InvalidStepName, StepName};
pub use validate::{validate, ValidationError};
