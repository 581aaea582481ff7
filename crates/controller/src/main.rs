// SPDX-License-Identifier: MIT

//! pl-controller: the Pipeline custom resource controller binary.
//!
//! Watches `Pipeline` and its owned `batch/v1 Job`s via
//! `kube::runtime::Controller`, reconciling each pipeline through the pure
//! components in `pl-engine` against the cluster through `pl-adapters`.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use k8s_openapi::api::batch::v1::Job;
use kube::runtime::{watcher, Controller};
use kube::{Api, Client};
use kube_leader_election::{LeaseLock, LeaseLockParams};
use pl_adapters::KubeClusterAdapter;
use pl_controller::{error_policy, reconcile, Config, ReconcileContext};
use pl_core::Pipeline;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LEASE_NAME: &str = "pl-controller-lock";
const LEASE_TTL: Duration = Duration::from_secs(15);
const LEASE_RENEW_EVERY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let config = Config::load()?;
    info!(
        leader_election = config.leader_election,
        metrics_addr = %config.metrics_addr,
        worker_concurrency = config.worker_concurrency,
        requeue_running_after_secs = config.requeue_running_after.as_secs(),
        "starting pl-controller"
    );

    let client = Client::try_default().await?;
    let context = Arc::new(ReconcileContext {
        adapter: KubeClusterAdapter::new(client.clone()),
        requeue_running_after: config.requeue_running_after,
    });

    let shutdown = CancellationToken::new();
    let signal_watcher = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        signal_watcher.cancel();
    });

    if config.leader_election {
        run_with_leader_election(client, context, shutdown).await;
    } else {
        tokio::select! {
            _ = run_controller(client, context) => {}
            _ = shutdown.cancelled() => info!("shutdown signal received, stopping"),
        }
    }

    info!("pl-controller stopped");
    Ok(())
}

/// Resolves once a `SIGTERM` or `SIGINT` arrives, the single point that
/// drives `shutdown`'s cancellation (§5's propagated-cancellation model).
async fn wait_for_shutdown_signal() {
    // Installing a unix signal handler only fails if the runtime's signal
    // driver itself failed to start, which would already be fatal.
    #[allow(clippy::expect_used)]
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    #[allow(clippy::expect_used)]
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }
}

/// Run the controller loop only while holding the `pl-controller-lock`
/// Lease, matching §5's "parallel threads across different pipelines"
/// model extended across replicas: at most one replica drives reconciles
/// at a time, the rest stand by.
async fn run_with_leader_election(
    client: Client,
    context: Arc<ReconcileContext<KubeClusterAdapter>>,
    shutdown: CancellationToken,
) {
    let namespace = std::env::var("NAMESPACE").unwrap_or_else(|_| "default".to_string());
    let holder_id = std::env::var("POD_NAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| format!("pl-controller-{}", uuid::Uuid::new_v4()));

    let leadership = LeaseLock::new(
        client.clone(),
        &namespace,
        LeaseLockParams {
            holder_id,
            lease_name: LEASE_NAME.to_string(),
            lease_ttl: LEASE_TTL,
        },
    );

    let mut controller_task: Option<tokio::task::JoinHandle<()>> = None;
    let mut tick = tokio::time::interval(LEASE_RENEW_EVERY);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("shutdown signal received, stopping");
                break;
            }
            _ = tick.tick() => {}
        }

        let lease = match leadership.try_acquire_or_renew().await {
            Ok(lease) => lease,
            Err(e) => {
                warn!(error = %e, "leader election renew/acquire failed");
                if let Some(task) = controller_task.take() {
                    task.abort();
                    warn!("aborted controller task after losing the ability to renew leadership");
                }
                continue;
            }
        };

        if lease.acquired_lease {
            if controller_task.is_none() {
                info!("acquired leadership, starting controller");
                let client = client.clone();
                let context = Arc::clone(&context);
                controller_task = Some(tokio::spawn(run_controller(client, context)));
            }
        } else if let Some(task) = controller_task.take() {
            info!("lost leadership, stopping controller");
            task.abort();
        }
    }

    if let Some(task) = controller_task.take() {
        task.abort();
        let _ = task.await;
    }
}

async fn run_controller(client: Client, context: Arc<ReconcileContext<KubeClusterAdapter>>) {
    let pipelines: Api<Pipeline> = Api::all(client.clone());
    let jobs: Api<Job> = Api::all(client);

    Controller::new(pipelines, watcher::Config::default())
        .owns(jobs, watcher::Config::default())
        .run(reconcile, error_policy, context)
        .for_each(|result| async move {
            if let Err(e) = result {
                error!(error = %e, "controller stream yielded an error");
            }
        })
        .await;
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
