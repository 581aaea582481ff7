// SPDX-License-Identifier: MIT

//! Startup configuration, loaded once from environment variables (§6.1).

use std::time::Duration;
use thiserror::Error;

const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_WORKER_CONCURRENCY: usize = 4;
const DEFAULT_REQUEUE_RUNNING_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Controller-wide configuration. Loaded once at startup; malformed env vars
/// fail startup rather than silently falling back (§6.1).
#[derive(Debug, Clone)]
pub struct Config {
    pub leader_election: bool,
    pub metrics_addr: String,
    pub worker_concurrency: usize,
    pub requeue_running_after: Duration,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            leader_election: parse_env("PL_LEADER_ELECTION", true, parse_bool)?,
            metrics_addr: std::env::var("PL_METRICS_ADDR").unwrap_or_else(|_| DEFAULT_METRICS_ADDR.to_string()),
            worker_concurrency: parse_env("PL_WORKER_CONCURRENCY", DEFAULT_WORKER_CONCURRENCY, |s| s.parse().ok())?,
            requeue_running_after: Duration::from_secs(parse_env(
                "PL_REQUEUE_RUNNING_SECS",
                DEFAULT_REQUEUE_RUNNING_SECS,
                |s| s.parse().ok(),
            )?),
        })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_env<T: Clone>(var: &'static str, default: T, parse: impl Fn(&str) -> Option<T>) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Err(_) => Ok(default),
        Ok(value) => parse(&value).ok_or_else(|| ConfigError::Invalid {
            var,
            value,
            expected: std::any::type_name::<T>(),
        }),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
