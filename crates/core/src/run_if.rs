// SPDX-License-Identifier: MIT

//! `runIf` gating clause: the conditional edge attaching a step to specific
//! upstream steps with success/failure and and/or semantics.

use crate::step_name::StepName;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which upstream outcome a [`RunIfCondition`] is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunIfOutcome {
    Success,
    Fail,
}

impl Default for RunIfOutcome {
    fn default() -> Self {
        Self::Success
    }
}

/// How multiple referenced steps combine in a [`RunIfCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunIfOperator {
    And,
    Or,
}

impl Default for RunIfOperator {
    fn default() -> Self {
        Self::And
    }
}

/// A conditional clause gating a step on the outcome of earlier steps.
///
/// `steps` must be non-empty and every referenced name must name a step that
/// precedes this one in `spec.steps` order; both are enforced at validation
/// time (see [`crate::validate`]), not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunIfCondition {
    #[serde(default)]
    pub condition: RunIfOutcome,
    #[serde(default)]
    pub operator: RunIfOperator,
    pub steps: Vec<StepName>,
}
