// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition reasons for Keycloak operator resources.
//!
//! This module defines constants for condition reasons following Kubernetes conventions.
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status. They are stable and suitable for alerting.
//!
//! # Condition Types
//!
//! Every resource carries a single `type: Ready` condition. The same reason is
//! mirrored into `status.status` so that `kubectl get` columns stay readable.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   ready: false
//!   status: RealmNotReady
//!   message: "KeycloakRealm team-a/demo is not ready"
//!   conditions:
//!     - type: Ready
//!       status: "False"
//!       reason: RealmNotReady
//!       message: "KeycloakRealm team-a/demo is not ready"
//! ```

// ============================================================================
// Condition Types and Values
// ============================================================================

/// Condition type for the encompassing readiness condition
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Condition status for a satisfied condition
pub const CONDITION_STATUS_TRUE: &str = "True";

/// Condition status for an unsatisfied condition
pub const CONDITION_STATUS_FALSE: &str = "False";

// ============================================================================
// Success Reasons
// ============================================================================

/// The remote object matches the declared definition.
pub const REASON_SYNCED: &str = "Synced";

/// The connection descriptor authenticated and reported a supported version.
pub const REASON_CONNECTED: &str = "Connected";

// ============================================================================
// Dependency Reasons
// ============================================================================

/// The referenced realm is missing or not ready.
pub const REASON_REALM_NOT_READY: &str = "RealmNotReady";

/// The referenced connection descriptor is missing or not ready.
pub const REASON_INSTANCE_NOT_READY: &str = "InstanceNotReady";

/// A secondary reference (client, user, group, role, client scope) is missing or not ready.
pub const REASON_DEPENDENCY_NOT_READY: &str = "DependencyNotReady";

// ============================================================================
// Failure Reasons
// ============================================================================

/// A control-plane read or write failed.
pub const REASON_FETCH_FAILED: &str = "FetchFailed";

/// The definition blob is unparsable or misses a required field.
pub const REASON_INVALID_DEFINITION: &str = "InvalidDefinition";

/// A mutually exclusive reference pair is violated (none or both set).
pub const REASON_INVALID_REFERENCE: &str = "InvalidReference";

/// A referenced Secret is missing or misses a required key.
pub const REASON_SECRET_ERROR: &str = "SecretError";

/// The Keycloak server reports a version below the supported minimum.
pub const REASON_VERSION_UNSUPPORTED: &str = "VersionUnsupported";

// ============================================================================
// Remote API Reasons
// ============================================================================

/// Keycloak returned a non-2xx response that has no more specific mapping.
pub const REASON_REMOTE_API_ERROR: &str = "RemoteAPIError";

/// Keycloak rejected the request as malformed (400).
pub const REASON_KEYCLOAK_BAD_REQUEST: &str = "KeycloakBadRequest";

/// Authentication or authorization against Keycloak failed (401/403, token endpoint).
pub const REASON_KEYCLOAK_AUTH_FAILED: &str = "KeycloakAuthFailed";

/// The remote object does not exist (404).
pub const REASON_KEYCLOAK_NOT_FOUND: &str = "KeycloakNotFound";

/// The remote object conflicts with an existing one (409).
pub const REASON_KEYCLOAK_CONFLICT: &str = "KeycloakConflict";

/// Keycloak failed internally (500).
pub const REASON_KEYCLOAK_INTERNAL_ERROR: &str = "KeycloakInternalError";

/// A gateway in front of Keycloak failed or timed out (502/503/504).
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

/// Keycloak could not be reached at all (connection refused, DNS, timeout).
pub const REASON_KEYCLOAK_UNREACHABLE: &str = "KeycloakUnreachable";
