// SPDX-License-Identifier: MIT

//! The reconciler's own error type, composing the lower crates' errors
//! plus the `ProgrammerError` case for panics inside the pure components
//! (§7).
//!
//! A failed `pl_core::validate` is not one of these variants: per §7 it is
//! "absorbed" inline by `reconcile` as a `Failed` status write, not
//! propagated as an error (validation failures are not retried until the
//! spec itself changes).

use pl_adapters::AdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error("pure component panicked: {0}")]
    PanicInPureComponent(String),
}
