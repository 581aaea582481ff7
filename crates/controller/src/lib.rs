// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pl-controller: the `kube::runtime::Controller` work loop around
//! `pl-engine`'s pure components and `pl-adapters`' cluster boundary.

mod config;
mod error;
mod reconcile;

pub use config::{Config, ConfigError};
pub use error::ReconcileError;
pub use reconcile::{error_policy, reconcile, ReconcileContext};
