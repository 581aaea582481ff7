// SPDX-License-Identifier: MIT

//! Fake cluster adapter for testing, mirroring [`crate::KubeClusterAdapter`]'s
//! semantics (idempotent create, not-found vs. error) without a real cluster.
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::adapter::ClusterAdapter;
use crate::error::AdapterError;
use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use parking_lot::Mutex;
use pl_core::{Pipeline, PipelineStatus};
use pl_engine::PIPELINE_LABEL;
use std::collections::HashMap;
use std::sync::Arc;

/// One recorded call against [`FakeClusterAdapter`], for assertions about
/// what the reconciler actually did (not just the resulting state).
#[derive(Debug, Clone)]
pub enum AdapterCall {
    GetPipeline { namespace: String, name: String },
    ListOwnedJobs { namespace: String, pipeline_name: String },
    CreateJob { namespace: String, job_name: String },
    PatchPipelineStatus { namespace: String, name: String, status: PipelineStatus },
}

#[derive(Default)]
struct FakeState {
    pipelines: HashMap<(String, String), Pipeline>,
    jobs: HashMap<(String, String), Job>,
    calls: Vec<AdapterCall>,
    /// Names that should return `AdapterError::Conflict` on the *next*
    /// status patch only, then clear — used to exercise the controller's
    /// single-retry-on-conflict policy (§7).
    conflict_once: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct FakeClusterAdapter {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeClusterAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_pipeline(&self, pipeline: Pipeline) {
        let namespace = pipeline.metadata.namespace.clone().expect("seeded pipeline needs a namespace");
        let name = pipeline.metadata.name.clone().expect("seeded pipeline needs a name");
        self.inner.lock().pipelines.insert((namespace, name), pipeline);
    }

    /// Directly mutate a seeded Job's status, simulating the Job/Pod
    /// controller progressing a step outside this reconciler's control.
    pub fn set_job(&self, namespace: &str, job: Job) {
        let name = job.metadata.name.clone().expect("job needs a name");
        self.inner.lock().jobs.insert((namespace.to_string(), name), job);
    }

    pub fn get_job(&self, namespace: &str, name: &str) -> Option<Job> {
        self.inner.lock().jobs.get(&(namespace.to_string(), name.to_string())).cloned()
    }

    pub fn latest_status(&self, namespace: &str, name: &str) -> Option<PipelineStatus> {
        self.inner
            .lock()
            .pipelines
            .get(&(namespace.to_string(), name.to_string()))
            .and_then(|p| p.status.clone())
    }

    pub fn calls(&self) -> Vec<AdapterCall> {
        self.inner.lock().calls.clone()
    }

    pub fn fail_next_patch_with_conflict(&self, namespace: &str, name: &str) {
        self.inner.lock().conflict_once.push((namespace.to_string(), name.to_string()));
    }
}

#[async_trait]
impl ClusterAdapter for FakeClusterAdapter {
    async fn get_pipeline(&self, namespace: &str, name: &str) -> Result<Option<Pipeline>, AdapterError> {
        let mut state = self.inner.lock();
        state.calls.push(AdapterCall::GetPipeline {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        Ok(state.pipelines.get(&(namespace.to_string(), name.to_string())).cloned())
    }

    async fn list_owned_jobs(&self, namespace: &str, pipeline_name: &str) -> Result<Vec<Job>, AdapterError> {
        let mut state = self.inner.lock();
        state.calls.push(AdapterCall::ListOwnedJobs {
            namespace: namespace.to_string(),
            pipeline_name: pipeline_name.to_string(),
        });
        let jobs = state
            .jobs
            .values()
            .filter(|job| {
                job.metadata.namespace.as_deref() == Some(namespace)
                    && job
                        .metadata
                        .labels
                        .as_ref()
                        .and_then(|labels| labels.get(PIPELINE_LABEL))
                        .map(|v| v == pipeline_name)
                        .unwrap_or(false)
            })
            .cloned()
            .collect();
        Ok(jobs)
    }

    async fn create_job(&self, namespace: &str, job: Job) -> Result<(), AdapterError> {
        let name = job.metadata.name.clone().expect("materialized job must be named");
        let mut state = self.inner.lock();
        state.calls.push(AdapterCall::CreateJob {
            namespace: namespace.to_string(),
            job_name: name.clone(),
        });
        // Idempotent: recreating an existing Job is a no-op success, matching
        // the real adapter's AlreadyExists handling.
        state.jobs.entry((namespace.to_string(), name)).or_insert(job);
        Ok(())
    }

    async fn patch_pipeline_status(
        &self,
        namespace: &str,
        name: &str,
        status: PipelineStatus,
    ) -> Result<(), AdapterError> {
        let mut state = self.inner.lock();
        let key = (namespace.to_string(), name.to_string());
        if let Some(pos) = state.conflict_once.iter().position(|k| k == &key) {
            state.conflict_once.remove(pos);
            return Err(AdapterError::Conflict(name.to_string()));
        }
        state.calls.push(AdapterCall::PatchPipelineStatus {
            namespace: namespace.to_string(),
            name: name.to_string(),
            status: status.clone(),
        });
        match state.pipelines.get_mut(&key) {
            Some(pipeline) => {
                pipeline.status = Some(status);
                Ok(())
            }
            None => Err(AdapterError::NotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
