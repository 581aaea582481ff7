// SPDX-License-Identifier: MIT

//! Static validation of a [`PipelineSpec`], independent of cluster state.
//!
//! Every check here is pure and total: no I/O, no clock, no cluster lookups.
//! The reconciler runs this before doing anything else (§4.4 step 1) and, on
//! failure, patches `status.conditions` with a `Ready=False` condition instead
//! of materializing any Jobs.

use crate::spec::PipelineSpec;
use crate::step_name::StepName;
use std::collections::HashMap;
use thiserror::Error;

/// A single defect in a [`PipelineSpec`]. A spec can carry more than one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("step name {0:?} is declared more than once")]
    DuplicateStepName(String),

    #[error("step {step:?} runIf references unknown step {reference:?}")]
    UnknownRunIfRef { step: String, reference: String },

    #[error("step {step:?} runIf references {reference:?}, which does not precede it")]
    ForwardRunIfRef { step: String, reference: String },

    #[error("step {0:?} runIf.steps is empty")]
    EmptyRunIfSteps(String),

    #[error("step {0:?} has an invalid name: {1}")]
    InvalidStepName(String, String),

    #[error("sharedVolume must set exactly one of persistentVolumeClaim, emptyDir, configMap, secret; step {0} set")]
    SharedVolumeSourceCount(usize),

    #[error("job name for step {step:?} would be {name:?}, which is {len} characters (limit 63)")]
    JobNameTooLong { step: String, name: String, len: usize },
}

/// Validate a [`PipelineSpec`] in isolation, collecting every defect found
/// rather than stopping at the first one (mirrors `validate_runbook_dir`'s
/// accumulate-then-report shape).
pub fn validate(spec: &PipelineSpec, owner_name: &str) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_shared_volume(spec, &mut errors);
    let seen = validate_step_names(spec, &mut errors);
    validate_run_if_refs(spec, &seen, &mut errors);
    validate_job_names(spec, owner_name, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_shared_volume(spec: &PipelineSpec, errors: &mut Vec<ValidationError>) {
    if let Some(volume) = &spec.shared_volume {
        let count = volume.source_count();
        if count != 1 {
            errors.push(ValidationError::SharedVolumeSourceCount(count));
        }
    }
}

/// Returns the position of every step name that parses cleanly, keyed by name.
/// Steps with an unparseable or duplicate name are still recorded so later
/// checks (runIf refs) can reason about position, but are excluded from
/// being a valid runIf target.
fn validate_step_names(
    spec: &PipelineSpec,
    errors: &mut Vec<ValidationError>,
) -> HashMap<String, usize> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (index, step) in spec.steps.iter().enumerate() {
        let raw = step.name.as_str();
        if let Err(err) = StepName::parse(raw) {
            errors.push(ValidationError::InvalidStepName(raw.to_string(), err.to_string()));
        }
        if seen.contains_key(raw) {
            errors.push(ValidationError::DuplicateStepName(raw.to_string()));
        } else {
            seen.insert(raw.to_string(), index);
        }
    }
    seen
}

fn validate_run_if_refs(
    spec: &PipelineSpec,
    seen: &HashMap<String, usize>,
    errors: &mut Vec<ValidationError>,
) {
    for (index, step) in spec.steps.iter().enumerate() {
        let Some(run_if) = &step.run_if else {
            continue;
        };
        if run_if.steps.is_empty() {
            errors.push(ValidationError::EmptyRunIfSteps(step.name.as_str().to_string()));
        }
        for reference in &run_if.steps {
            match seen.get(reference.as_str()) {
                None => errors.push(ValidationError::UnknownRunIfRef {
                    step: step.name.as_str().to_string(),
                    reference: reference.as_str().to_string(),
                }),
                Some(&ref_index) if ref_index >= index => {
                    errors.push(ValidationError::ForwardRunIfRef {
                        step: step.name.as_str().to_string(),
                        reference: reference.as_str().to_string(),
                    })
                }
                Some(_) => {}
            }
        }
    }
}

/// A Job's name is `{pipeline}-{step}`; Kubernetes caps object names at 63
/// characters (DNS label limit), so this has to be checked ahead of time
/// rather than surfaced as an opaque apiserver rejection mid-reconcile.
fn validate_job_names(spec: &PipelineSpec, owner_name: &str, errors: &mut Vec<ValidationError>) {
    for step in &spec.steps {
        let name = format!("{owner_name}-{}", step.name.as_str());
        if name.len() > 63 {
            errors.push(ValidationError::JobNameTooLong {
                step: step.name.as_str().to_string(),
                len: name.len(),
                name,
            });
        }
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
