// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pl-engine: the three pure components of the reconciler — gating,
//! materialization, and status aggregation. No cluster I/O; `pl-adapters`
//! and `pl-controller` are the impure layers built on top of this one.

mod aggregate;
mod gate;
mod materialize;

pub use aggregate::{aggregate, decide, ObservedJob};
pub use gate::{gate, gate_one, Decision, Eligibility};
pub use materialize::{job_name, materialize, with_suspend, PIPELINE_LABEL, STEP_LABEL};
