// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration.
//!
//! Command-line flags with `KEYCLOAK_OPERATOR_*` environment fallbacks, parsed
//! once in `main` and carried by [`crate::context::Context`].

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_MIN_KEYCLOAK_VERSION,
    DEFAULT_OPERATOR_NAMESPACE, DEFAULT_WORKERS_PER_KIND, ERROR_REQUEUE_DURATION_SECS,
    METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PORT, SYNC_PERIOD_SECS,
};
use clap::Parser;
use std::time::Duration;

/// Keycloak operator for Kubernetes.
#[derive(Parser, Clone, Debug)]
#[command(name = "keycloak-operator", version, about, long_about = None)]
pub struct Args {
    /// Requeue interval after a successful reconcile, in seconds
    #[arg(long, env = "KEYCLOAK_OPERATOR_SYNC_PERIOD_SECS", default_value_t = SYNC_PERIOD_SECS)]
    pub sync_period_secs: u64,

    /// Requeue interval after a failed reconcile, in seconds
    #[arg(long, env = "KEYCLOAK_OPERATOR_ERROR_REQUEUE_SECS", default_value_t = ERROR_REQUEUE_DURATION_SECS)]
    pub error_requeue_secs: u64,

    /// Maximum in-flight Keycloak requests across all instances (0 disables the cap)
    #[arg(long, env = "KEYCLOAK_OPERATOR_MAX_CONCURRENT_REQUESTS", default_value_t = DEFAULT_MAX_CONCURRENT_REQUESTS)]
    pub max_concurrent_requests: usize,

    /// Concurrent reconciles per resource kind
    #[arg(long, env = "KEYCLOAK_OPERATOR_WORKERS", default_value_t = DEFAULT_WORKERS_PER_KIND)]
    pub workers: u16,

    /// Timeout of every Keycloak HTTP call, in seconds
    #[arg(long, env = "KEYCLOAK_OPERATOR_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,

    /// Oldest Keycloak server version accepted by instance reconciles
    #[arg(long, env = "KEYCLOAK_OPERATOR_MIN_KEYCLOAK_VERSION", default_value = DEFAULT_MIN_KEYCLOAK_VERSION)]
    pub min_keycloak_version: String,

    /// Namespace holding credentials of cluster-scoped instances without an explicit namespace
    #[arg(long, env = "KEYCLOAK_OPERATOR_NAMESPACE", default_value = DEFAULT_OPERATOR_NAMESPACE)]
    pub operator_namespace: String,

    /// Bind address of the metrics server
    #[arg(long, env = "KEYCLOAK_OPERATOR_METRICS_BIND_ADDRESS", default_value = METRICS_SERVER_BIND_ADDRESS)]
    pub metrics_bind_address: String,

    /// Port of the metrics server
    #[arg(long, env = "KEYCLOAK_OPERATOR_METRICS_PORT", default_value_t = METRICS_SERVER_PORT)]
    pub metrics_port: u16,
}

/// Runtime settings shared by every reconciler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorConfig {
    pub sync_period: Duration,
    pub error_requeue: Duration,
    pub max_concurrent_requests: usize,
    pub workers: u16,
    pub http_timeout: Duration,
    pub min_keycloak_version: String,
    pub operator_namespace: String,
    pub metrics_addr: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            sync_period: Duration::from_secs(SYNC_PERIOD_SECS),
            error_requeue: Duration::from_secs(ERROR_REQUEUE_DURATION_SECS),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            workers: DEFAULT_WORKERS_PER_KIND,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            min_keycloak_version: DEFAULT_MIN_KEYCLOAK_VERSION.to_string(),
            operator_namespace: DEFAULT_OPERATOR_NAMESPACE.to_string(),
            metrics_addr: format!("{METRICS_SERVER_BIND_ADDRESS}:{METRICS_SERVER_PORT}"),
        }
    }
}

impl From<Args> for OperatorConfig {
    fn from(args: Args) -> Self {
        Self {
            sync_period: Duration::from_secs(args.sync_period_secs),
            error_requeue: Duration::from_secs(args.error_requeue_secs),
            max_concurrent_requests: args.max_concurrent_requests,
            // A controller with zero workers never reconciles anything.
            workers: args.workers.max(1),
            http_timeout: Duration::from_secs(args.http_timeout_secs),
            min_keycloak_version: args.min_keycloak_version,
            operator_namespace: args.operator_namespace,
            metrics_addr: format!("{}:{}", args.metrics_bind_address, args.metrics_port),
        }
    }
}
