// SPDX-License-Identifier: MIT

//! Errors surfaced by a [`crate::ClusterAdapter`].

use thiserror::Error;

/// Failure modes of a cluster operation, collapsed down to the cases the
/// reconciler actually branches on (§4.5, §7). `AlreadyExists` on job
/// creation is deliberately absent: the adapter treats it as success.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("optimistic concurrency conflict patching {0}")]
    Conflict(String),
    #[error("transient cluster error: {0}")]
    Transient(String),
}
