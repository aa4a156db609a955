//! Fether host - Main Entry Point
//! Locates (or fetches) parity, runs it under supervision, serves status

mod config;
mod host;
mod logging;

use anyhow::{anyhow, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use fether_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use fether_core::application::constants::SHUTDOWN_WAIT_TIMEOUT;
use fether_core::domain::derive_args;
use fether_core::port::id_provider::UuidProvider;
use fether_core::port::time_provider::SystemTimeProvider;
use fether_core::{NodeSupervisor, SupervisorPorts, VERSION};
use fether_infra_system::{
    CommandAcquirer, FileLogStore, FsBinaryLocator, SysinfoProcessInspector,
    TokioProcessSpawner,
};

use config::{Cli, LauncherConfig};
use host::{LoggingErrorSink, ProcessHost};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let config = LauncherConfig::from_cli(Cli::parse())?;
    let log_guard = logging::init(config.log_format, &config.log_dir)?;

    info!(
        version = %VERSION,
        data_dir = %config.data_dir.display(),
        "Fether host starting"
    );

    // 2. Wiring
    let (host, mut exit_rx) = ProcessHost::new();
    let log_store = Arc::new(FileLogStore::in_dir(&config.data_dir));
    let locator = Arc::new(
        FsBinaryLocator::new(&config.install_dir).with_override(config.parity_path.clone()),
    );
    let acquirer = Arc::new(CommandAcquirer::new(
        config.fetch_command.clone(),
        &config.install_dir,
    ));

    let supervisor = Arc::new(NodeSupervisor::new(SupervisorPorts {
        locator,
        acquirer,
        spawner: Arc::new(TokioProcessSpawner::default()),
        log_store: log_store.clone(),
        error_sink: Arc::new(LoggingErrorSink),
        host: Arc::new(host),
        id_provider: Arc::new(UuidProvider),
        time_provider: Arc::new(SystemTimeProvider),
    }));

    // 3. Status server
    let rpc = match config.rpc_port {
        Some(port) => {
            let handler = RpcHandler::new(
                supervisor.clone(),
                Arc::new(SysinfoProcessInspector::new()),
                log_store,
            );
            let rpc_config = RpcServerConfig {
                port,
                ..Default::default()
            };
            let (_, handle) = RpcServer::new(rpc_config, handler)
                .start()
                .await
                .map_err(|e| anyhow!("RPC server start failed: {}", e))?;
            Some(handle)
        }
        None => None,
    };

    // 4. Health transitions to the host log
    let mut health = supervisor.subscribe_health();
    tokio::spawn(async move {
        loop {
            match health.recv().await {
                Ok(running) => info!(running = %running, "Node health changed"),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed = %missed, "Health log fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // 5. Launch
    let launch = if config.run_node {
        let supervisor = supervisor.clone();
        let args = derive_args(&config.node_options);
        Some(tokio::spawn(async move {
            supervisor.start(args).await;
        }))
    } else {
        info!("--no-run-parity set, not starting the node");
        None
    };

    // 6. Wait for a shutdown path
    let status = tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            0
        }
        status = exit_requested(&mut exit_rx) => status,
    };

    // 7. Teardown: the node never outlives the host
    if let Some(launch) = launch {
        launch.abort();
    }
    supervisor.kill();
    if !supervisor.wait_for_exit(SHUTDOWN_WAIT_TIMEOUT).await {
        warn!(
            timeout_ms = %SHUTDOWN_WAIT_TIMEOUT.as_millis(),
            "Node did not report exit before the shutdown deadline"
        );
    }
    if let Some(handle) = rpc {
        handle
            .stop()
            .map_err(|e| anyhow!("RPC server stop failed: {}", e))?;
    }

    info!(status = %status, "Shutdown complete");

    if status != 0 {
        drop(log_guard);
        std::process::exit(status);
    }
    Ok(())
}

async fn exit_requested(exit_rx: &mut tokio::sync::watch::Receiver<Option<i32>>) -> i32 {
    loop {
        if let Some(status) = *exit_rx.borrow_and_update() {
            return status;
        }
        if exit_rx.changed().await.is_err() {
            // Host handle dropped without a request
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl+C only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
