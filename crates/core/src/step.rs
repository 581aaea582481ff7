// SPDX-License-Identifier: MIT

//! A single pipeline step: a name, an optional gate, and a full Job spec.

use crate::run_if::RunIfCondition;
use crate::step_name::StepName;
use k8s_openapi::api::batch::v1::JobSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One element of `spec.steps`. Immutable for a given `metadata.generation`
/// (the controller never mutates step definitions; only `status` changes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PipelineStep {
    pub name: StepName,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "runIf")]
    pub run_if: Option<RunIfCondition>,
    #[serde(rename = "jobSpec")]
    pub job_spec: JobSpec,
}
