// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP error code mapping to Kubernetes status condition reasons.
//!
//! This module maps HTTP status codes returned by the Keycloak admin REST API
//! to standardized Kubernetes condition reasons. This gives every resource kind
//! the same reason codes for the same remote failure.
//!
//! # Usage
//!
//! ```rust
//! use keycloak_operator::http_errors::map_http_error_to_reason;
//!
//! let (reason, _message) = map_http_error_to_reason(409);
//! assert_eq!(reason, "KeycloakConflict");
//!
//! let (reason, _message) = map_http_error_to_reason(503);
//! assert_eq!(reason, "GatewayError");
//! ```

use crate::status_reasons::{
    REASON_GATEWAY_ERROR, REASON_KEYCLOAK_AUTH_FAILED, REASON_KEYCLOAK_BAD_REQUEST,
    REASON_KEYCLOAK_CONFLICT, REASON_KEYCLOAK_INTERNAL_ERROR, REASON_KEYCLOAK_NOT_FOUND,
    REASON_KEYCLOAK_UNREACHABLE, REASON_REMOTE_API_ERROR,
};

/// Map HTTP status code to condition reason and message.
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400 | `KeycloakBadRequest` | Definition rejected by Keycloak |
/// | 401 | `KeycloakAuthFailed` | Token missing or expired |
/// | 403 | `KeycloakAuthFailed` | Admin account lacks a role |
/// | 404 | `KeycloakNotFound` | Remote object missing |
/// | 409 | `KeycloakConflict` | Remote object already exists |
/// | 500 | `KeycloakInternalError` | Keycloak failed |
/// | 502-504 | `GatewayError` | Proxy or ingress failed |
/// | Other | `RemoteAPIError` | Unexpected response |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_KEYCLOAK_BAD_REQUEST,
            "Keycloak rejected the request as invalid (400)".into(),
        ),
        401 => (
            REASON_KEYCLOAK_AUTH_FAILED,
            "Keycloak authentication required (401)".into(),
        ),
        403 => (
            REASON_KEYCLOAK_AUTH_FAILED,
            "Keycloak authorization failed (403)".into(),
        ),
        404 => (
            REASON_KEYCLOAK_NOT_FOUND,
            "Resource not found in Keycloak (404)".into(),
        ),
        409 => (
            REASON_KEYCLOAK_CONFLICT,
            "Resource already exists in Keycloak (409)".into(),
        ),
        500 => (
            REASON_KEYCLOAK_INTERNAL_ERROR,
            "Keycloak internal error (500)".into(),
        ),
        502 => (
            REASON_GATEWAY_ERROR,
            "Bad gateway reaching Keycloak (502)".into(),
        ),
        503 => (
            REASON_GATEWAY_ERROR,
            "Keycloak service unavailable (503)".into(),
        ),
        504 => (
            REASON_GATEWAY_ERROR,
            "Gateway timeout reaching Keycloak (504)".into(),
        ),
        _ => (
            REASON_REMOTE_API_ERROR,
            format!("Unexpected HTTP error from Keycloak ({status_code})"),
        ),
    }
}

/// Map connection error to condition reason and message.
///
/// Use this when the HTTP client cannot reach Keycloak at all, before
/// receiving any HTTP status code (refused connection, DNS failure, timeout).
#[must_use]
pub fn map_connection_error() -> (&'static str, String) {
    (
        REASON_KEYCLOAK_UNREACHABLE,
        "Cannot connect to Keycloak. Check the instance URL and network policies.".into(),
    )
}
