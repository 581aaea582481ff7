// SPDX-License-Identifier: MIT

//! Production [`ClusterAdapter`] backed by a real `kube::Client`.

use crate::adapter::ClusterAdapter;
use crate::error::AdapterError;
use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::{Client, Error as KubeError, ResourceExt};
use pl_core::{Pipeline, PipelineStatus};
use pl_engine::PIPELINE_LABEL;

/// Field manager name used on every server-side-apply status patch.
const FIELD_MANAGER: &str = "pl-controller";

#[derive(Clone)]
pub struct KubeClusterAdapter {
    client: Client,
}

impl KubeClusterAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pipelines(&self, namespace: &str) -> Api<Pipeline> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn jobs(&self, namespace: &str) -> Api<Job> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn classify(err: KubeError) -> AdapterError {
    match &err {
        KubeError::Api(resp) if resp.code == 404 => AdapterError::NotFound(resp.reason.clone()),
        KubeError::Api(resp) if resp.code == 409 => AdapterError::Conflict(resp.reason.clone()),
        other => AdapterError::Transient(other.to_string()),
    }
}

#[async_trait]
impl ClusterAdapter for KubeClusterAdapter {
    async fn get_pipeline(&self, namespace: &str, name: &str) -> Result<Option<Pipeline>, AdapterError> {
        match self.pipelines(namespace).get(name).await {
            Ok(pipeline) => Ok(Some(pipeline)),
            Err(KubeError::Api(resp)) if resp.code == 404 => Ok(None),
            Err(err) => Err(classify(err)),
        }
    }

    async fn list_owned_jobs(&self, namespace: &str, pipeline_name: &str) -> Result<Vec<Job>, AdapterError> {
        let selector = format!("{PIPELINE_LABEL}={pipeline_name}");
        let params = kube::api::ListParams::default().labels(&selector);
        self.jobs(namespace)
            .list(&params)
            .await
            .map(|list| list.items)
            .map_err(classify)
    }

    async fn create_job(&self, namespace: &str, job: Job) -> Result<(), AdapterError> {
        match self.jobs(namespace).create(&PostParams::default(), &job).await {
            Ok(_) => Ok(()),
            // Idempotent creates: a Job we already materialized last pass is not an error.
            Err(KubeError::Api(resp)) if resp.code == 409 && resp.reason == "AlreadyExists" => Ok(()),
            Err(err) => Err(classify(err)),
        }
    }

    async fn patch_pipeline_status(
        &self,
        namespace: &str,
        name: &str,
        status: PipelineStatus,
    ) -> Result<(), AdapterError> {
        let patch = serde_json::json!({
            "apiVersion": "pipeline.yaacov.io/v1",
            "kind": "Pipeline",
            "status": status,
        });
        self.pipelines(namespace)
            .patch_status(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Apply(&patch))
            .await
            .map(|_| ())
            .map_err(classify)
    }
}

/// Convenience for building the owner-scoped label selector used in places
/// outside this crate (e.g. the controller's `.owns()` wiring) that still
/// need to agree with [`list_owned_jobs`](ClusterAdapter::list_owned_jobs).
pub fn pipeline_owner_name(job: &Job) -> Option<String> {
    job.labels().get(PIPELINE_LABEL).cloned()
}
