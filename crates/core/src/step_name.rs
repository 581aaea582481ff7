// SPDX-License-Identifier: MIT

//! Step name newtype and its DNS-subdomain-label validation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of a [`crate::PipelineStep`].
///
/// Must be 1-63 characters matching `^[a-z0-9]([-a-z0-9]*[a-z0-9])?$`.
/// Construction from spec data always goes through [`StepName::parse`];
/// the plain `From` impls are for tests and call sites that already hold
/// a name known to be valid (e.g. round-tripping through status).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct StepName(String);

impl StepName {
    /// Validate and wrap a step name.
    pub fn parse(name: impl Into<String>) -> Result<Self, InvalidStepName> {
        let name = name.into();
        if is_valid_dns_label(&name) {
            Ok(Self(name))
        } else {
            Err(InvalidStepName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<StepName> for String {
    fn from(name: StepName) -> Self {
        name.0
    }
}

impl PartialEq<str> for StepName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StepName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for StepName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A step name that failed [`StepName::parse`].
#[derive(Debug, thiserror::Error)]
#[error("invalid step name {0:?}: must be 1-63 chars matching ^[a-z0-9]([-a-z0-9]*[a-z0-9])?$")]
pub struct InvalidStepName(pub String);

fn is_valid_dns_label(s: &str) -> bool {
    if s.is_empty() || s.len() > 63 {
        return false;
    }
    let bytes = s.as_bytes();
    let is_alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !is_alnum(bytes[0]) || !is_alnum(bytes[bytes.len() - 1]) {
        return false;
    }
    bytes
        .iter()
        .all(|&b| is_alnum(b) || b == b'-')
}

#[cfg(test)]
#[path = "step_name_tests.rs"]
mod tests;
