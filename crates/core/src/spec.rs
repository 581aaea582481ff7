// SPDX-License-Identifier: MIT

//! `PipelineSpec`: the user-authored half of the `Pipeline` resource.

use crate::pod_defaults::PodTemplateDefaults;
use crate::shared_volume::SharedVolume;
use crate::status::PipelineStatus;
use crate::step::PipelineStep;
use crate::step_name::StepName;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The desired state of a Pipeline, as written by the user.
///
/// Exclusively owned by the user; the reconciler never writes to it
/// (invariant from §3's ownership rule). `#[derive(CustomResource)]` turns
/// this into the `pipeline.yaacov.io/v1 Pipeline` kind: `kube` generates the
/// wrapping `Pipeline { metadata, spec: PipelineSpec, status: Option<PipelineStatus> }`
/// struct and the `Api<Pipeline>` machinery the adapter in `pl-adapters` uses.
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "pipeline.yaacov.io",
    version = "v1",
    kind = "Pipeline",
    namespaced,
    status = "PipelineStatus",
    shortname = "pl",
    shortname = "pipe",
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSpec {
    pub steps: Vec<PipelineStep>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "sharedVolume")]
    pub shared_volume: Option<SharedVolume>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "podTemplate")]
    pub pod_template: Option<PodTemplateDefaults>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "serviceAccountName")]
    pub service_account_name: Option<String>,
}

impl PipelineSpec {
    /// Index of a step by name, if declared.
    pub fn step_index(&self, name: &StepName) -> Option<usize> {
        self.steps.iter().position(|s| &s.name == name)
    }

    /// The step at `index`, if in range.
    pub fn step_at(&self, index: usize) -> Option<&PipelineStep> {
        self.steps.get(index)
    }
}
