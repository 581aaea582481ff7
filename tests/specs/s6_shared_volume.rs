//! S6. Shared volume: a pipeline-wide `sharedVolume` is injected into every
//! step's pod, with a matching volumeMount on every container.

use crate::prelude::*;
use k8s_openapi::api::batch::v1::JobSpec;
use k8s_openapi::api::core::v1::{
    Container, PersistentVolumeClaimVolumeSource, PodSpec, PodTemplateSpec,
};
use pl_core::SharedVolume;

fn step_with_container(name: &str) -> PipelineStep {
    PipelineStep {
        job_spec: JobSpec {
            template: PodTemplateSpec {
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: "main".to_string(),
                        ..Container::default()
                    }],
                    ..PodSpec::default()
                }),
                ..PodTemplateSpec::default()
            },
            ..JobSpec::default()
        },
        ..step(name)
    }
}

#[tokio::test]
async fn every_step_job_gets_the_shared_volume_and_a_matching_mount() {
    let adapter = FakeClusterAdapter::new();

    let mut p = pipeline("ns", "shared", spec(vec![step_with_container("fetch"), step_with_container("build")]));
    p.spec.shared_volume = Some(SharedVolume {
        name: "workspace".to_string(),
        mount_path: "/workspace".to_string(),
        persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
            claim_name: "ws".to_string(),
            read_only: None,
        }),
        ..SharedVolume::default()
    });
    adapter.seed_pipeline(p);

    reconcile_once(&adapter, "shared").await;
    succeed_job(&adapter, "shared", "fetch");
    reconcile_once(&adapter, "shared").await;

    for step_name in ["fetch", "build"] {
        let job = adapter
            .get_job("ns", &format!("shared-{step_name}"))
            .unwrap_or_else(|| panic!("job for {step_name} must be materialized"));
        let pod = job.spec.expect("job must have a spec").template.spec.expect("pod must have a spec");

        let volume = pod
            .volumes
            .as_ref()
            .expect("pod must have volumes")
            .iter()
            .find(|v| v.name == "workspace")
            .unwrap_or_else(|| panic!("{step_name}'s pod must carry the shared volume"));
        assert_eq!(
            volume
                .persistent_volume_claim
                .as_ref()
                .expect("volume must be backed by the claim")
                .claim_name,
            "ws"
        );

        for container in &pod.containers {
            let mounts = container.volume_mounts.as_ref().expect("container must have volume mounts");
            assert!(
                mounts.iter().any(|m| m.name == "workspace" && m.mount_path == "/workspace"),
                "{step_name}'s container {} must mount the shared volume at /workspace",
                container.name
            );
        }
    }
}
