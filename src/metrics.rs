// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the Keycloak operator.
//!
//! This module provides metrics collection with the namespace prefix
//! `keycloak_firestoned_io_` (prometheus-safe version of "keycloak.firestoned.io").
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Track reconciliation operations and their outcomes
//! - **Resource Lifecycle Metrics** - Track remote creates, updates and deletions
//! - **Error Metrics** - Track failures by status reason
//! - **Keycloak API Metrics** - Track outbound admin API and token requests
//!
//! # Example
//!
//! ```rust,no_run
//! use keycloak_operator::metrics::record_reconciliation_success;
//!
//! // Record a successful reconciliation
//! record_reconciliation_success("KeycloakClient", std::time::Duration::from_secs(1));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all operator metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "keycloak_firestoned_io";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

fn register_counter(name: &str, help: &str, labels: &[&str]) -> CounterVec {
    let opts = Opts::new(format!("{METRICS_NAMESPACE}_{name}"), help);
    let counter = CounterVec::new(opts, labels).expect("counter options are valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("counter is registered once");
    counter
}

fn register_histogram(name: &str, help: &str, labels: &[&str], buckets: Vec<f64>) -> HistogramVec {
    let opts = HistogramOpts::new(format!("{METRICS_NAMESPACE}_{name}"), help).buckets(buckets);
    let histogram = HistogramVec::new(opts, labels).expect("histogram options are valid");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("histogram is registered once");
    histogram
}

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by resource type and status
///
/// Labels:
/// - `resource_type`: Kind of resource (e.g., `KeycloakRealm`, `KeycloakClient`)
/// - `status`: Outcome (`success`, `error`, `requeue`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "reconciliations_total",
        "Total number of reconciliations by resource type and status",
        &["resource_type", "status"],
    )
});

/// Duration of reconciliations in seconds
///
/// Labels:
/// - `resource_type`: Kind of resource
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram(
        "reconciliation_duration_seconds",
        "Duration of reconciliations in seconds by resource type",
        &["resource_type"],
        vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0],
    )
});

/// Total number of requeue operations
///
/// Labels:
/// - `resource_type`: Kind of resource
/// - `reason`: Status reason that caused the requeue (e.g., `RealmNotReady`)
pub static REQUEUE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "requeues_total",
        "Total number of requeue operations by resource type and reason",
        &["resource_type", "reason"],
    )
});

// ============================================================================
// Resource Lifecycle Metrics
// ============================================================================

/// Remote objects created, updated, deleted or skipped
///
/// Labels:
/// - `resource_type`: Kind of resource
/// - `operation`: `created`, `updated`, `deleted`, `skipped`
pub static REMOTE_OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "remote_operations_total",
        "Total number of remote object operations by resource type",
        &["resource_type", "operation"],
    )
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors by resource type and status reason
///
/// Labels:
/// - `resource_type`: Kind of resource
/// - `reason`: Status reason (e.g., `KeycloakConflict`, `SecretError`)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "errors_total",
        "Total number of errors by resource type and reason",
        &["resource_type", "reason"],
    )
});

// ============================================================================
// Keycloak API Metrics
// ============================================================================

/// Outbound Keycloak requests
///
/// Labels:
/// - `method`: HTTP method (`token` for token requests)
/// - `outcome`: HTTP status code, or `transport` when no response arrived
pub static KEYCLOAK_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "keycloak_requests_total",
        "Total number of Keycloak admin API requests by method and outcome",
        &["method", "outcome"],
    )
});

/// Latency of outbound Keycloak requests, admission wait excluded
pub static KEYCLOAK_REQUEST_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram(
        "keycloak_request_duration_seconds",
        "Duration of Keycloak admin API requests in seconds",
        &["method"],
        vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
    )
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful reconciliation
///
/// # Arguments
/// * `resource_type` - The kind of resource reconciled (e.g., `KeycloakClient`)
/// * `duration` - Duration of the reconciliation
pub fn record_reconciliation_success(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
///
/// # Arguments
/// * `resource_type` - The kind of resource reconciled
/// * `duration` - Duration of the reconciliation before failure
pub fn record_reconciliation_error(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a reconciliation requeue
///
/// # Arguments
/// * `resource_type` - The kind of resource reconciled
/// * `reason` - Status reason that caused the requeue
pub fn record_reconciliation_requeue(resource_type: &str, reason: &str) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "requeue"])
        .inc();
    REQUEUE_TOTAL
        .with_label_values(&[resource_type, reason])
        .inc();
}

/// Record a remote object operation (`created`, `updated`, `deleted`, `skipped`)
pub fn record_remote_operation(resource_type: &str, operation: &str) {
    REMOTE_OPERATIONS_TOTAL
        .with_label_values(&[resource_type, operation])
        .inc();
}

/// Record an error
///
/// # Arguments
/// * `resource_type` - The kind of resource where error occurred
/// * `reason` - Status reason of the error
pub fn record_error(resource_type: &str, reason: &str) {
    ERRORS_TOTAL.with_label_values(&[resource_type, reason]).inc();
}

/// Record one outbound Keycloak request
pub fn record_keycloak_request(method: &str, outcome: &str, duration: Duration) {
    KEYCLOAK_REQUESTS_TOTAL
        .with_label_values(&[method, outcome])
        .inc();
    KEYCLOAK_REQUEST_DURATION_SECONDS
        .with_label_values(&[method])
        .observe(duration.as_secs_f64());
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
