// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pl-adapters: the impure boundary between the pure `pl-engine` components
//! and a real Kubernetes cluster. [`ClusterAdapter`] is the narrow interface
//! `pl-controller` reconciles against; [`KubeClusterAdapter`] is the only
//! production implementation, and [`FakeClusterAdapter`] (behind
//! `test-support`) is an in-memory double for tests that don't want a
//! cluster.

mod adapter;
mod error;
mod kube_adapter;
mod observed;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use adapter::ClusterAdapter;
pub use error::AdapterError;
pub use kube_adapter::{pipeline_owner_name, KubeClusterAdapter};
pub use observed::observe;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{AdapterCall, FakeClusterAdapter};
