// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Keycloak operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all Keycloak operator CRDs
pub const API_GROUP: &str = "keycloak.firestoned.io";

/// API version for all Keycloak operator CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "keycloak.firestoned.io/v1alpha1";

/// Kind name for `KeycloakInstance` resource
pub const KIND_KEYCLOAK_INSTANCE: &str = "KeycloakInstance";

/// Kind name for `ClusterKeycloakInstance` resource
pub const KIND_CLUSTER_KEYCLOAK_INSTANCE: &str = "ClusterKeycloakInstance";

/// Kind name for `KeycloakRealm` resource
pub const KIND_KEYCLOAK_REALM: &str = "KeycloakRealm";

/// Kind name for `ClusterKeycloakRealm` resource
pub const KIND_CLUSTER_KEYCLOAK_REALM: &str = "ClusterKeycloakRealm";

/// Kind name for `KeycloakClient` resource
pub const KIND_KEYCLOAK_CLIENT: &str = "KeycloakClient";

/// Kind name for `KeycloakUser` resource
pub const KIND_KEYCLOAK_USER: &str = "KeycloakUser";

/// Kind name for `KeycloakGroup` resource
pub const KIND_KEYCLOAK_GROUP: &str = "KeycloakGroup";

/// Kind name for `KeycloakRole` resource
pub const KIND_KEYCLOAK_ROLE: &str = "KeycloakRole";

/// Kind name for `KeycloakClientScope` resource
pub const KIND_KEYCLOAK_CLIENT_SCOPE: &str = "KeycloakClientScope";

/// Kind name for `KeycloakIdentityProvider` resource
pub const KIND_KEYCLOAK_IDENTITY_PROVIDER: &str = "KeycloakIdentityProvider";

/// Kind name for `KeycloakOrganization` resource
pub const KIND_KEYCLOAK_ORGANIZATION: &str = "KeycloakOrganization";

/// Kind name for `KeycloakComponent` resource
pub const KIND_KEYCLOAK_COMPONENT: &str = "KeycloakComponent";

/// Kind name for `KeycloakProtocolMapper` resource
pub const KIND_KEYCLOAK_PROTOCOL_MAPPER: &str = "KeycloakProtocolMapper";

/// Kind name for `KeycloakRoleMapping` resource
pub const KIND_KEYCLOAK_ROLE_MAPPING: &str = "KeycloakRoleMapping";

/// Kind name for `KeycloakUserCredential` resource
pub const KIND_KEYCLOAK_USER_CREDENTIAL: &str = "KeycloakUserCredential";

// ============================================================================
// Keycloak Protocol Constants
// ============================================================================

/// Realm used to obtain admin tokens when the connection does not name one
pub const DEFAULT_ADMIN_REALM: &str = "master";

/// Public client used for the resource-owner password grant
pub const ADMIN_CLI_CLIENT_ID: &str = "admin-cli";

/// Safety margin subtracted from a token's expiry before it is considered stale
pub const TOKEN_EXPIRY_MARGIN_SECS: u64 = 30;

/// Timeout applied to every outbound Keycloak HTTP call
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Oldest Keycloak release the operator talks to
pub const DEFAULT_MIN_KEYCLOAK_VERSION: &str = "22.0.0";

/// Default cap on concurrently in-flight Keycloak requests (0 disables the cap)
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;

// ============================================================================
// Secret Key Constants
// ============================================================================

/// Secret key holding the admin username (password grant)
pub const SECRET_KEY_USERNAME: &str = "username";

/// Secret key holding the admin password (password grant)
pub const SECRET_KEY_PASSWORD: &str = "password";

/// Secret key holding the client id (client-credentials grant)
pub const SECRET_KEY_CLIENT_ID: &str = "clientId";

/// Secret key holding the client secret (client-credentials grant, client secret sync)
pub const SECRET_KEY_CLIENT_SECRET: &str = "clientSecret";

/// Default length of generated user passwords
pub const DEFAULT_GENERATED_SECRET_LENGTH: usize = 32;

// ============================================================================
// Controller Scheduling Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration after a successful sync (5 minutes)
pub const SYNC_PERIOD_SECS: u64 = 300;

/// Default number of concurrent reconciles per resource kind
pub const DEFAULT_WORKERS_PER_KIND: u16 = 1;

/// Namespace used for cluster-scoped instance secrets that do not name one
pub const DEFAULT_OPERATOR_NAMESPACE: &str = "keycloak-operator";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Liveness probe path
pub const HEALTH_SERVER_PATH: &str = "/healthz";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
