// SPDX-License-Identifier: MIT

//! The Job materializer: pure mapping from `(pipeline, step)` to a
//! fully-formed `batch/v1 Job`, merging pipeline-wide defaults into the
//! step's own `jobSpec` (§4.2). Deterministic and idempotent: identical
//! inputs always produce byte-identical output.

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec, Volume, VolumeMount};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{OwnerReference, ObjectMeta};
use pl_core::{Pipeline, PipelineStep, PodTemplateDefaults, SharedVolume};
use std::collections::BTreeMap;

pub const PIPELINE_LABEL: &str = "pipeline.yaacov.io/pipeline";
pub const STEP_LABEL: &str = "pipeline.yaacov.io/step";

/// Deterministic Job name for a step: `"<pipeline.name>-<step.name>"`.
///
/// Callers must check this against the 63-character DNS-subdomain-label
/// limit via [`pl_core::validate`] before relying on it; this function does
/// not itself reject long names.
pub fn job_name(pipeline_name: &str, step: &PipelineStep) -> String {
    format!("{pipeline_name}-{}", step.name.as_str())
}

/// Build the desired Job for `step` of `pipeline`.
///
/// Panics if `pipeline.metadata.name` or `.uid` is unset — both are always
/// present on any Pipeline read back from the cluster, which is the only
/// place this function is called from.
pub fn materialize(pipeline: &Pipeline, step: &PipelineStep) -> Job {
    // Every Pipeline read back through the adapter carries both fields; only
    // a hand-built Pipeline missing them would trip this.
    #[allow(clippy::expect_used)]
    let pipeline_name = pipeline
        .metadata
        .name
        .as_deref()
        .expect("materialize requires a named Pipeline");
    #[allow(clippy::expect_used)]
    let pipeline_uid = pipeline
        .metadata
        .uid
        .as_deref()
        .expect("materialize requires a Pipeline with a uid");

    let mut labels = BTreeMap::new();
    labels.insert(PIPELINE_LABEL.to_string(), pipeline_name.to_string());
    labels.insert(STEP_LABEL.to_string(), step.name.as_str().to_string());

    let pod_template = pipeline.spec.pod_template.as_ref();
    let shared_volume = pipeline.spec.shared_volume.as_ref();
    let service_account_name = pipeline.spec.service_account_name.clone();

    let mut job_spec = step.job_spec.clone();
    if job_spec.backoff_limit.is_none() {
        job_spec.backoff_limit = Some(0);
    }
    job_spec.template = merge_pod_template(
        job_spec.template,
        pod_template,
        shared_volume,
        service_account_name,
    );

    Job {
        metadata: ObjectMeta {
            name: Some(job_name(pipeline_name, step)),
            namespace: pipeline.metadata.namespace.clone(),
            labels: Some(labels),
            owner_references: Some(vec![OwnerReference {
                api_version: "pipeline.yaacov.io/v1".to_string(),
                kind: "Pipeline".to_string(),
                name: pipeline_name.to_string(),
                uid: pipeline_uid.to_string(),
                controller: Some(true),
                block_owner_deletion: Some(true),
            }]),
            ..ObjectMeta::default()
        },
        spec: Some(job_spec),
        status: None,
    }
}

fn merge_pod_template(
    mut template: PodTemplateSpec,
    defaults: Option<&PodTemplateDefaults>,
    shared_volume: Option<&SharedVolume>,
    pipeline_service_account: Option<String>,
) -> PodTemplateSpec {
    let mut pod_spec = template.spec.take().unwrap_or_default();

    if let Some(defaults) = defaults {
        apply_pod_defaults(&mut pod_spec, defaults);
        template.metadata = Some(merge_meta(template.metadata.take(), defaults));
    }
    if pod_spec.service_account_name.is_none() {
        pod_spec.service_account_name = pipeline_service_account;
    }

    for container in &mut pod_spec.containers {
        if let Some(defaults) = defaults {
            apply_container_defaults(container, defaults);
        }
    }

    if let Some(shared) = shared_volume {
        inject_shared_volume(&mut pod_spec, shared);
    }

    template.spec = Some(pod_spec);
    template
}

fn merge_meta(
    meta: Option<ObjectMeta>,
    defaults: &PodTemplateDefaults,
) -> ObjectMeta {
    let mut meta = meta.unwrap_or_default();
    if !defaults.labels.is_empty() {
        let mut merged = defaults.labels.clone();
        if let Some(existing) = meta.labels.take() {
            for (k, v) in existing {
                merged.insert(k, v);
            }
        }
        meta.labels = Some(merged);
    }
    if !defaults.annotations.is_empty() {
        let mut merged = defaults.annotations.clone();
        if let Some(existing) = meta.annotations.take() {
            for (k, v) in existing {
                merged.insert(k, v);
            }
        }
        meta.annotations = Some(merged);
    }
    meta
}

/// Apply pipeline-wide pod-level defaults; the step's own fields always win
/// (only unset fields are filled in here).
fn apply_pod_defaults(pod: &mut PodSpec, defaults: &PodTemplateDefaults) {
    if pod.node_selector.is_none() && !defaults.node_selector.is_empty() {
        pod.node_selector = Some(defaults.node_selector.clone());
    }
    if pod.affinity.is_none() {
        pod.affinity = defaults.affinity.clone();
    }
    if pod.tolerations.is_none() && !defaults.tolerations.is_empty() {
        pod.tolerations = Some(defaults.tolerations.clone());
    }
    if pod.security_context.is_none() {
        pod.security_context = defaults.security_context.clone();
    }
    if pod.image_pull_secrets.is_none() && !defaults.image_pull_secrets.is_empty() {
        pod.image_pull_secrets = Some(defaults.image_pull_secrets.clone());
    }
    if pod.priority_class_name.is_none() {
        pod.priority_class_name = defaults.priority_class_name.clone();
    }
    if pod.runtime_class_name.is_none() {
        pod.runtime_class_name = defaults.runtime_class_name.clone();
    }
    if pod.scheduler_name.is_none() {
        pod.scheduler_name = defaults.scheduler_name.clone();
    }
}

/// Apply pipeline-wide container defaults to one container of the step's pod
/// template: image fallback, prepended env/envFrom, default resources.
fn apply_container_defaults(container: &mut Container, defaults: &PodTemplateDefaults) {
    if container.image.as_deref().unwrap_or("").is_empty() {
        if let Some(image) = &defaults.image {
            container.image = Some(image.clone());
        }
    }

    if !defaults.env.is_empty() {
        let own = container.env.get_or_insert_with(Vec::new);
        let own_names: std::collections::HashSet<&str> =
            own.iter().map(|e| e.name.as_str()).collect();
        let mut merged: Vec<_> = defaults
            .env
            .iter()
            .filter(|e| !own_names.contains(e.name.as_str()))
            .cloned()
            .collect();
        merged.extend(own.drain(..));
        *own = merged;
    }

    if !defaults.env_from.is_empty() {
        let own = container.env_from.get_or_insert_with(Vec::new);
        let mut merged = defaults.env_from.clone();
        merged.extend(own.drain(..));
        *own = merged;
    }

    if container.resources.is_none() {
        container.resources = defaults.default_resources.clone();
    }
}

/// Inject the pipeline's shared volume into the pod spec's `volumes` and add
/// a matching `volumeMount` to every container and initContainer that
/// doesn't already mount a volume by that name.
fn inject_shared_volume(pod: &mut PodSpec, shared: &SharedVolume) {
    let volume = Volume {
        name: shared.name.clone(),
        persistent_volume_claim: shared.persistent_volume_claim.clone(),
        empty_dir: shared.empty_dir.clone(),
        config_map: shared.config_map.clone(),
        secret: shared.secret.clone(),
        ..Volume::default()
    };

    let volumes = pod.volumes.get_or_insert_with(Vec::new);
    if !volumes.iter().any(|v| v.name == shared.name) {
        volumes.push(volume);
    }

    let mount = VolumeMount {
        name: shared.name.clone(),
        mount_path: shared.mount_path.clone(),
        ..VolumeMount::default()
    };

    for container in pod
        .containers
        .iter_mut()
        .chain(pod.init_containers.as_mut().into_iter().flatten())
    {
        let mounts = container.volume_mounts.get_or_insert_with(Vec::new);
        if !mounts.iter().any(|m| m.name == shared.name) {
            mounts.push(mount.clone());
        }
    }
}

/// JobSpec's `suspend` field as materialize should set it, given the
/// gating decision's eligibility. Kept here (rather than in `gate`) since
/// it's solely about shaping the desired Job, not about deciding whether
/// to create one.
pub fn with_suspend(mut job: Job, suspend: bool) -> Job {
    if let Some(spec) = job.spec.as_mut() {
        spec.suspend = Some(suspend);
    }
    job
}

#[cfg(test)]
#[path = "materialize_tests.rs"]
mod tests;
