//! S5. Merging pod defaults: pipeline-wide `podTemplate.image`/`env` fill in
//! whatever a step's own container leaves unset; a container's own `env`
//! entry of the same name still wins over the pipeline default.

use crate::prelude::*;
use k8s_openapi::api::batch::v1::JobSpec;
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, PodTemplateSpec};
use pl_core::PodTemplateDefaults;

#[tokio::test]
async fn step_container_inherits_unset_fields_but_keeps_its_own_overrides() {
    let adapter = FakeClusterAdapter::new();

    let main_step = PipelineStep {
        job_spec: JobSpec {
            template: PodTemplateSpec {
                spec: Some(PodSpec {
                    containers: vec![
                        Container {
                            name: "main".to_string(),
                            env: Some(vec![EnvVar {
                                name: "ENV".to_string(),
                                value: Some("staging".to_string()),
                                ..EnvVar::default()
                            }]),
                            ..Container::default()
                        },
                    ],
                    ..PodSpec::default()
                }),
                ..PodTemplateSpec::default()
            },
            ..JobSpec::default()
        },
        ..step("main")
    };

    let mut p = pipeline("ns", "defaults", spec(vec![main_step]));
    p.spec.pod_template = Some(PodTemplateDefaults {
        image: Some("fedora:latest".to_string()),
        env: vec![EnvVar {
            name: "ENV".to_string(),
            value: Some("prod".to_string()),
            ..EnvVar::default()
        }],
        ..PodTemplateDefaults::default()
    });
    adapter.seed_pipeline(p);

    reconcile_once(&adapter, "defaults").await;

    let job = adapter.get_job("ns", "defaults-main").expect("job must be materialized");
    let container = &job
        .spec
        .expect("job must have a spec")
        .template
        .spec
        .expect("pod must have a spec")
        .containers[0];

    assert_eq!(container.image.as_deref(), Some("fedora:latest"), "default image must fill in the unset container image");

    let env = container.env.as_ref().expect("container must have env");
    assert_eq!(env.len(), 1, "the step's own ENV entry must win, not be duplicated alongside the default");
    assert_eq!(env[0].value.as_deref(), Some("staging"), "the step's own env value must override the pipeline default");
}
