// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use keycloak_operator::{
    config::{Args, OperatorConfig},
    constants::TOKIO_WORKER_THREADS,
    context::Context,
    controller::{run_descriptor_controller, run_realm_controller, run_resource_controller},
    crd::{
        ClusterKeycloakInstance, ClusterKeycloakRealm, KeycloakClient, KeycloakClientScope,
        KeycloakComponent, KeycloakGroup, KeycloakIdentityProvider, KeycloakInstance,
        KeycloakOrganization, KeycloakProtocolMapper, KeycloakRealm, KeycloakRole,
        KeycloakRoleMapping, KeycloakUser, KeycloakUserCredential,
    },
    server::run_metrics_server,
    store::KubeStore,
};
use kube::Client;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, info};

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("keycloak-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(OperatorConfig::from(args)))
}

fn init_tracing() {
    // Respects RUST_LOG (default: info) and RUST_LOG_FORMAT (text|json)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn shutdown_signal() -> Result<()> {
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

async fn async_main(config: OperatorConfig) -> Result<()> {
    init_tracing();

    info!("Starting Keycloak Operator");
    debug!(?config, "Operator configuration loaded");

    // reqwest is built without a default provider
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the rustls crypto provider"))?;

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let metrics_addr = config.metrics_addr.clone();
    let ctx = Arc::new(Context::new(KubeStore::new(client), config));

    info!("Starting all controllers");

    // Controllers should never exit - if one does, we log it and exit the main process
    tokio::select! {
        result = shutdown_signal() => {
            info!("Shutdown signal received, stopping controllers");
            result
        }
        result = run_metrics_server(&metrics_addr) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
        result = run_descriptor_controller::<KeycloakInstance>(ctx.clone()) => {
            error!("CRITICAL: KeycloakInstance controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakInstance controller exited unexpectedly without error")
        }
        result = run_descriptor_controller::<ClusterKeycloakInstance>(ctx.clone()) => {
            error!("CRITICAL: ClusterKeycloakInstance controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("ClusterKeycloakInstance controller exited unexpectedly without error")
        }
        result = run_realm_controller::<KeycloakRealm>(ctx.clone()) => {
            error!("CRITICAL: KeycloakRealm controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakRealm controller exited unexpectedly without error")
        }
        result = run_realm_controller::<ClusterKeycloakRealm>(ctx.clone()) => {
            error!("CRITICAL: ClusterKeycloakRealm controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("ClusterKeycloakRealm controller exited unexpectedly without error")
        }
        result = run_resource_controller::<KeycloakClient>(ctx.clone()) => {
            error!("CRITICAL: KeycloakClient controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakClient controller exited unexpectedly without error")
        }
        result = run_resource_controller::<KeycloakUser>(ctx.clone()) => {
            error!("CRITICAL: KeycloakUser controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakUser controller exited unexpectedly without error")
        }
        result = run_resource_controller::<KeycloakGroup>(ctx.clone()) => {
            error!("CRITICAL: KeycloakGroup controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakGroup controller exited unexpectedly without error")
        }
        result = run_resource_controller::<KeycloakRole>(ctx.clone()) => {
            error!("CRITICAL: KeycloakRole controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakRole controller exited unexpectedly without error")
        }
        result = run_resource_controller::<KeycloakClientScope>(ctx.clone()) => {
            error!("CRITICAL: KeycloakClientScope controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakClientScope controller exited unexpectedly without error")
        }
        result = run_resource_controller::<KeycloakIdentityProvider>(ctx.clone()) => {
            error!("CRITICAL: KeycloakIdentityProvider controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakIdentityProvider controller exited unexpectedly without error")
        }
        result = run_resource_controller::<KeycloakOrganization>(ctx.clone()) => {
            error!("CRITICAL: KeycloakOrganization controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakOrganization controller exited unexpectedly without error")
        }
        result = run_resource_controller::<KeycloakComponent>(ctx.clone()) => {
            error!("CRITICAL: KeycloakComponent controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakComponent controller exited unexpectedly without error")
        }
        result = run_resource_controller::<KeycloakProtocolMapper>(ctx.clone()) => {
            error!("CRITICAL: KeycloakProtocolMapper controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakProtocolMapper controller exited unexpectedly without error")
        }
        result = run_resource_controller::<KeycloakRoleMapping>(ctx.clone()) => {
            error!("CRITICAL: KeycloakRoleMapping controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakRoleMapping controller exited unexpectedly without error")
        }
        result = run_resource_controller::<KeycloakUserCredential>(ctx.clone()) => {
            error!("CRITICAL: KeycloakUserCredential controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("KeycloakUserCredential controller exited unexpectedly without error")
        }
    }
}
