// SPDX-License-Identifier: MIT

//! `PipelineStatus`: the controller-authored half of the `Pipeline` resource.

use crate::step_name::StepName;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a single step, derived by the status aggregator (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum StepPhase {
    Pending,
    Running,
    Suspended,
    Succeeded,
    Failed,
    Skipped,
}

impl StepPhase {
    /// Terminal phases no longer change for a generation (invariant 5).
    pub fn is_terminal(self) -> bool {
        matches!(self, StepPhase::Succeeded | StepPhase::Failed | StepPhase::Skipped)
    }
}

impl fmt::Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepPhase::Pending => "Pending",
            StepPhase::Running => "Running",
            StepPhase::Suspended => "Suspended",
            StepPhase::Succeeded => "Succeeded",
            StepPhase::Failed => "Failed",
            StepPhase::Skipped => "Skipped",
        };
        write!(f, "{s}")
    }
}

/// Observed status of one step, projected 1:1 from `spec.steps` (invariant 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepStatus {
    pub name: StepName,
    pub phase: StepPhase,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "jobName")]
    pub job_name: Option<String>,
}

impl StepStatus {
    pub fn pending(name: StepName) -> Self {
        Self {
            name,
            phase: StepPhase::Pending,
            job_name: None,
        }
    }
}

/// Overall pipeline phase, derived from step phases per §4.3's precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum PipelinePhase {
    Pending,
    Running,
    Suspended,
    Succeeded,
    Failed,
}

impl PipelinePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelinePhase::Succeeded | PipelinePhase::Failed)
    }
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelinePhase::Pending => "Pending",
            PipelinePhase::Running => "Running",
            PipelinePhase::Suspended => "Suspended",
            PipelinePhase::Succeeded => "Succeeded",
            PipelinePhase::Failed => "Failed",
        };
        write!(f, "{s}")
    }
}

/// A Kubernetes-style condition, merge-keyed by `type_`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    pub reason: String,
    pub message: String,
    #[serde(rename = "lastTransitionTime")]
    pub last_transition_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

/// The controller-owned half of a Pipeline resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PipelineStatus {
    #[serde(default)]
    pub phase: Option<PipelinePhase>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "completionTime")]
    pub completion_time: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepStatus>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "observedGeneration")]
    pub observed_generation: Option<i64>,
}

impl PipelineStatus {
    pub fn step(&self, name: &StepName) -> Option<&StepStatus> {
        self.steps.iter().find(|s| &s.name == name)
    }

    pub fn condition(&self, type_: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }
}
