// SPDX-License-Identifier: MIT

//! Reduce a cluster `batch/v1 Job` down to the [`pl_engine::ObservedJob`]
//! shape the status aggregator consumes.

use k8s_openapi::api::batch::v1::{Job, JobStatus};
use pl_engine::ObservedJob;

fn condition_true(status: &JobStatus, type_: &str) -> bool {
    status
        .conditions
        .as_ref()
        .is_some_and(|conds| conds.iter().any(|c| c.type_ == type_ && c.status == "True"))
}

fn failed_reason(status: &JobStatus) -> Option<&str> {
    status
        .conditions
        .as_ref()
        .into_iter()
        .flatten()
        .find(|c| c.type_ == "Failed" && c.status == "True")
        .and_then(|c| c.reason.as_deref())
}

/// Build an [`ObservedJob`] from a live Job. `job_name` is passed separately
/// rather than read off `job.metadata.name` so callers that already know
/// the deterministic name (and may be observing a Job that predates a
/// metadata round-trip) don't have to `unwrap` it here.
pub fn observe(job_name: String, job: &Job) -> ObservedJob {
    let status = job.status.clone().unwrap_or_default();
    let suspend = job.spec.as_ref().and_then(|s| s.suspend).unwrap_or(false);
    let reason = failed_reason(&status);

    ObservedJob {
        job_name,
        suspend,
        complete: condition_true(&status, "Complete"),
        failed: reason.is_some(),
        deadline_exceeded: reason == Some("DeadlineExceeded"),
        active: status.active.unwrap_or(0).max(0) as u32,
        succeeded: status.succeeded.unwrap_or(0).max(0) as u32,
        failed_count: status.failed.unwrap_or(0).max(0) as u32,
    }
}

#[cfg(test)]
#[path = "observed_tests.rs"]
mod tests;
