// SPDX-License-Identifier: MIT

//! The narrow interface the reconciler uses to talk to the cluster resource
//! store (§4.5). Kept independent of any particular client library so the
//! reconciler in `pl-controller` can run against either the real `kube`
//! binding or [`crate::FakeClusterAdapter`] in tests.

use crate::error::AdapterError;
use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use pl_core::{Pipeline, PipelineStatus};

/// `WatchPipelinesAndJobs` from §4.5 is deliberately not a method here:
/// `kube::runtime::Controller::owns` already delivers add/update/delete
/// events for both `Pipeline` and its owned `Job`s as reconcile keys, so
/// `pl-controller`'s binary wires that up directly rather than funneling it
/// through this trait.
#[async_trait]
pub trait ClusterAdapter: Clone + Send + Sync + 'static {
    /// Fetch a Pipeline by namespace/name. `Ok(None)` means not found —
    /// the reconciler's step 1 ("if not found, return") relies on this
    /// rather than on a `NotFound` error variant.
    async fn get_pipeline(&self, namespace: &str, name: &str) -> Result<Option<Pipeline>, AdapterError>;

    /// List Jobs owned by the named Pipeline, selected by the
    /// `pipeline.yaacov.io/pipeline=<name>` label (§4.4 step 3).
    async fn list_owned_jobs(&self, namespace: &str, pipeline_name: &str) -> Result<Vec<Job>, AdapterError>;

    /// Create a Job. An `AlreadyExists` response from the cluster is treated
    /// as success by the implementation, per §4.5's behavioral requirement —
    /// callers never see it as an error.
    async fn create_job(&self, namespace: &str, job: Job) -> Result<(), AdapterError>;

    /// Patch `status` on the named Pipeline. Implementations retry once on
    /// `Conflict` from a fresh read before giving up (§7's `ConflictError`
    /// policy); that retry lives in `pl-controller`, not here — this method
    /// surfaces the conflict so the caller can decide.
    async fn patch_pipeline_status(
        &self,
        namespace: &str,
        name: &str,
        status: PipelineStatus,
    ) -> Result<(), AdapterError>;
}
