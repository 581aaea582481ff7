// SPDX-License-Identifier: MIT

//! Pipeline-wide shared volume, mounted into every step's pod.

use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, EmptyDirVolumeSource, PersistentVolumeClaimVolumeSource,
    SecretVolumeSource,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_volume_name() -> String {
    "workspace".to_string()
}

fn default_mount_path() -> String {
    "/workspace".to_string()
}

/// A volume shared across every step's pod, injected by the materializer
/// (§4.2) rather than by the user writing volumes/volumeMounts by hand.
///
/// Mirrors the shape of `k8s_openapi`'s own `VolumeSource` (a flat struct of
/// optional sources) rather than a tagged enum, so the CRD schema reads the
/// same way the upstream Kubernetes API does. Exactly one source field must
/// be set; [`crate::validate`] enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SharedVolume {
    #[serde(default = "default_volume_name")]
    pub name: String,
    #[serde(default = "default_mount_path", rename = "mountPath")]
    pub mount_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "persistentVolumeClaim")]
    pub persistent_volume_claim: Option<PersistentVolumeClaimVolumeSource>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "emptyDir")]
    pub empty_dir: Option<EmptyDirVolumeSource>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "configMap")]
    pub config_map: Option<ConfigMapVolumeSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretVolumeSource>,
}

impl Default for SharedVolume {
    fn default() -> Self {
        Self {
            name: default_volume_name(),
            mount_path: default_mount_path(),
            persistent_volume_claim: None,
            empty_dir: None,
            config_map: None,
            secret: None,
        }
    }
}

impl SharedVolume {
    /// Number of volume source variants that are set. Validation requires
    /// this to equal exactly 1.
    pub fn source_count(&self) -> usize {
        [
            self.persistent_volume_claim.is_some(),
            self.empty_dir.is_some(),
            self.config_map.is_some(),
            self.secret.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}
